use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::{Config, API_KEY_ENV};
use crate::events::Topic;
use crate::llm::LlmClient;
use crate::prompts::EXAMPLE_PROMPTS;
use crate::session::{ChatSession, ExchangeOutcome};
use crate::ui::app;
use crate::ui::conversation::ConversationManager;

fn open_session(config: &Config) -> Result<ChatSession> {
    let client = LlmClient::new(config.clone()).context("Failed to create HTTP client")?;
    Ok(ChatSession::new(config, Arc::new(client)))
}

/// Launch the interactive chat UI
pub async fn start_chat(config: Config) -> Result<()> {
    if !config.has_api_key() {
        eprintln!(
            "⚠️  No API key found. Set {} or add openai_api_key to {}; replies will show the error.",
            API_KEY_ENV,
            config.config_path().display()
        );
    }

    let session = open_session(&config)?;
    let manager = ConversationManager::new(session, &config);
    app::run(manager).await
}

/// Ask a single question and print the answer
pub async fn ask_once(config: Config, topic: Topic, question: &str) -> Result<()> {
    let mut session = open_session(&config)?;

    match session.exchange(question, topic).await {
        ExchangeOutcome::EmptyInput(notice) => {
            println!("{}", notice);
        }
        ExchangeOutcome::Answered(reply) => {
            println!("{}", reply);
        }
        ExchangeOutcome::Failed(reply) => {
            // Same text the UI would show, but a non-zero exit for scripts
            anyhow::bail!("{}", reply.trim_start_matches("Error: "));
        }
    }

    Ok(())
}

pub fn list_topics() {
    println!("🏷️  Topics:");
    for topic in Topic::all() {
        println!("  • {}", topic.label());
    }
}

pub fn list_examples() {
    println!("📚 Example prompts:\n");
    for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
        println!("  {}. {}", i + 1, prompt);
    }
}
