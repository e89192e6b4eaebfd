use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::events::{ConversationRole, Topic};
use crate::llm::{ChatBackend, LlmMessage, LlmRequest};
use crate::prompts::{tag_with_topic, EMPTY_INPUT_NOTICE};
use crate::storage::StorageManager;
use crate::transcript::{Message, Transcript};

/// Result of submitting one question
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    /// Nothing was sent; carries the prompt-for-input notice
    EmptyInput(&'static str),
    /// The model answered; carries the reply
    Answered(String),
    /// The call failed; the error text was recorded as the bot reply
    Failed(String),
}

impl ExchangeOutcome {
    /// Text to show in a status line, if any
    pub fn notice(&self) -> Option<&str> {
        match self {
            ExchangeOutcome::EmptyInput(notice) => Some(*notice),
            _ => None,
        }
    }
}

/// One conversation: the transcript plus everything needed to extend it
pub struct ChatSession {
    session_id: String,
    backend: Arc<dyn ChatBackend>,
    system_prompt: String,
    temperature: f32,
    transcript: Transcript,
    storage: StorageManager,
}

impl ChatSession {
    pub fn new(config: &Config, backend: Arc<dyn ChatBackend>) -> Self {
        let session_id = Uuid::new_v4().to_string();
        tracing::info!(session = %session_id, model = backend.model(), "chat session started");

        Self {
            session_id,
            backend,
            system_prompt: config.effective_system_prompt().to_string(),
            temperature: config.temperature,
            transcript: Transcript::new(),
            storage: StorageManager::new(config.export_dir()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Ask one question. Both turns are recorded whether or not the call succeeds.
    pub async fn exchange(&mut self, input: &str, topic: Topic) -> ExchangeOutcome {
        // Whitespace-only counts as empty; the stored and sent question is the trimmed text
        let input = input.trim();
        if input.is_empty() {
            return ExchangeOutcome::EmptyInput(EMPTY_INPUT_NOTICE);
        }

        let user_message = Message::user(tag_with_topic(topic, input), topic);
        let request = self.build_request(&user_message);

        tracing::info!(
            session = %self.session_id,
            topic = topic.label(),
            history = self.transcript.len(),
            "sending question"
        );

        let (outcome, reply) = match self.backend.complete(request).await {
            Ok(reply) => (ExchangeOutcome::Answered(reply.clone()), reply),
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "completion failed");
                let reply = format!("Error: {}", e);
                (ExchangeOutcome::Failed(reply.clone()), reply)
            }
        };

        self.transcript.push(user_message);
        self.transcript.push(Message::assistant(reply));
        outcome
    }

    /// System prompt, then the stored transcript, then the new question
    fn build_request(&self, user_message: &Message) -> LlmRequest {
        let mut messages = Vec::with_capacity(self.transcript.len() + 2);
        messages.push(LlmMessage::new(ConversationRole::System, self.system_prompt.clone()));

        for entry in &self.transcript {
            messages.push(LlmMessage::new(entry.role, entry.content.clone()));
        }

        messages.push(LlmMessage::new(ConversationRole::User, user_message.content.clone()));

        LlmRequest::new(messages).with_temperature(self.temperature)
    }

    pub fn clear(&mut self) {
        tracing::info!(session = %self.session_id, dropped = self.transcript.len(), "transcript cleared");
        self.transcript.clear();
    }

    /// Write the transcript to a `chat_<epoch>.txt` file and return its path
    pub fn export(&self) -> Result<PathBuf> {
        let path = self.storage.export_transcript(&self.transcript)?;
        tracing::info!(session = %self.session_id, path = %path.display(), "transcript exported");
        Ok(path)
    }
}
