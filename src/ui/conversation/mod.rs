//! Conversation UI components for chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod manager;
pub mod topics;

pub use commands::{SlashCommand, ParsedCommand, get_help_text};
pub use composer::ConversationComposer;
pub use history::ConversationHistory;
pub use manager::{ConversationAction, ConversationManager};
pub use topics::{ExamplesPanel, TopicSelector};
