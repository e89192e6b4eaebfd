use crate::config::Config;
use crate::events::ConversationRole;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Duration;

/// Failures talking to the completion service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key configured. Set OPENAI_API_KEY or add openai_api_key to the config file.")]
    MissingApiKey,
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("empty response from model")]
    EmptyResponse,
}

/// Message in a completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: ConversationRole,
    pub content: String,
}

impl LlmMessage {
    pub fn new(role: ConversationRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Request to send to LLM
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(messages: Vec<LlmMessage>) -> Self {
        Self {
            messages,
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Latest user entry, i.e. the question being asked
    pub fn last_user_message(&self) -> Option<&LlmMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ConversationRole::User)
    }
}

/// Anything that can answer a chat-completion request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;

    /// Model identifier, for display
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct CompletionPayload<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// LLM client for OpenAI-compatible chat completions
#[derive(Clone)]
pub struct LlmClient {
    config: Config,
    /// Resolved once from the config file or the environment
    api_key: Option<String>,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: Config) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            api_key: config.api_key(),
            config,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatBackend for LlmClient {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let payload = CompletionPayload {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.temperature.unwrap_or(self.config.temperature),
        };

        tracing::debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            question_chars = request.last_user_message().map_or(0, |m| m.content.chars().count()),
            "sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response.json().await?;
        extract_content(completion)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn extract_content(completion: CompletionResponse) -> Result<String, LlmError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(LlmError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn payload_uses_wire_role_names() {
        let messages = vec![
            LlmMessage::new(ConversationRole::System, "be helpful"),
            LlmMessage::new(ConversationRole::User, "[Topic: Git] rebase?"),
        ];
        let payload = CompletionPayload {
            model: "gpt-4",
            messages: &messages,
            temperature: 0.7,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "[Topic: Git] rebase?");
    }

    #[test]
    fn content_comes_from_first_choice() {
        let completion: CompletionResponse = serde_json::from_str(
            r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"Branches are pointers."}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(completion).unwrap(), "Branches are pointers.");
    }

    #[test]
    fn missing_choices_is_empty_response() {
        let completion: CompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_content(completion), Err(LlmError::EmptyResponse)));

        let completion: CompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(extract_content(completion), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn last_user_message_skips_trailing_roles() {
        let request = LlmRequest::new(vec![
            LlmMessage::new(ConversationRole::System, "sys"),
            LlmMessage::new(ConversationRole::User, "first"),
            LlmMessage::new(ConversationRole::Assistant, "answer"),
            LlmMessage::new(ConversationRole::User, "second"),
        ]);
        assert_eq!(request.last_user_message().unwrap().content, "second");
    }

    fn client_for(base_url: String) -> LlmClient {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            base_url,
            model: "gpt-4o-mini".to_string(),
            ..Config::default()
        };
        LlmClient::new(config).unwrap()
    }

    fn question(text: &str) -> LlmRequest {
        LlmRequest::new(vec![
            LlmMessage::new(ConversationRole::System, "be helpful"),
            LlmMessage::new(ConversationRole::User, text),
        ])
        .with_temperature(0.5)
    }

    #[tokio::test]
    async fn successful_completion_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "temperature": 0.5,
                "messages": [
                    {"role": "system", "content": "be helpful"},
                    {"role": "user", "content": "[Topic: Git] What is a rebase?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"It replays commits."}}]}"#)
            .create_async()
            .await;

        // Trailing slash on the base URL must not double up in the path
        let client = client_for(format!("{}/", server.url()));
        let reply = client.complete(question("[Topic: Git] What is a rebase?")).await.unwrap();

        assert_eq!(reply, "It replays commits.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_status_becomes_api_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .with_status(401)
            .with_body(r#"{"error":{"code":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.complete(question("hello")).await.unwrap_err();

        match &err {
            LlmError::Api { status, body } => {
                assert_eq!(*status, 401);
                assert!(body.contains("invalid_api_key"));
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert!(err.to_string().starts_with("API error (401)"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_body_is_an_http_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("<html>gateway hiccup</html>")
            .create_async()
            .await;

        let client = client_for(server.url());
        let err = client.complete(question("hello")).await.unwrap_err();

        assert!(matches!(err, LlmError::Http(_)), "got {:?}", err);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let mut client = client_for(server.url());
        client.api_key = None;
        let err = client.complete(question("hello")).await.unwrap_err();

        assert!(matches!(err, LlmError::MissingApiKey));
        mock.assert_async().await;
    }
}
