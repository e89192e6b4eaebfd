//! Ordered, append-only record of the messages exchanged in a session.

use crate::events::{ConversationRole, Topic};
use chrono::{DateTime, Utc};

/// A single message in the transcript. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: ConversationRole,
    pub content: String,
    /// Topic the user tagged the question with; `None` for bot replies
    pub topic: Option<Topic>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>, topic: Topic) -> Self {
        Self {
            role: ConversationRole::User,
            content: content.into(),
            topic: Some(topic),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::Assistant,
            content: content.into(),
            topic: None,
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ConversationRole::System,
            content: content.into(),
            topic: None,
            timestamp: Utc::now(),
        }
    }

    /// Line used by the plain-text export
    pub fn export_line(&self) -> String {
        match self.role {
            ConversationRole::User => format!("User: {}", self.content),
            _ => format!("Bot: {}", self.content),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Flatten to `User: ...` / `Bot: ...` lines joined by newlines
    pub fn to_export_text(&self) -> String {
        self.messages
            .iter()
            .map(Message::export_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_insertion_order() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("[Topic: UML] What is a sequence diagram?", Topic::Uml));
        transcript.push(Message::assistant("It shows interactions over time."));

        let roles: Vec<_> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ConversationRole::User, ConversationRole::Assistant]);
        assert_eq!(transcript.last().unwrap().content, "It shows interactions over time.");
    }

    #[test]
    fn export_text_prefixes_each_role() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("hi", Topic::General));
        transcript.push(Message::assistant("hello"));
        transcript.push(Message::system("note"));

        assert_eq!(transcript.to_export_text(), "User: hi\nBot: hello\nBot: note");
    }

    #[test]
    fn empty_transcript_exports_empty_text() {
        assert_eq!(Transcript::new().to_export_text(), "");
    }

    #[test]
    fn clear_empties_transcript() {
        let mut transcript = Transcript::new();
        transcript.push(Message::user("a", Topic::Agile));
        transcript.push(Message::assistant("b"));
        transcript.clear();
        assert!(transcript.is_empty());
        assert_eq!(transcript.len(), 0);
    }
}
