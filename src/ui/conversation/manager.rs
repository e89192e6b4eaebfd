use crate::config::Config;
use crate::events::{Topic, TuiEvent};
use crate::prompts::{example_prompt, EXAMPLE_PROMPTS};
use crate::session::{ChatSession, ExchangeOutcome};
use crate::ui::conversation::composer::ConversationResult;
use crate::ui::conversation::{
    get_help_text, ConversationComposer, ConversationHistory, ExamplesPanel, ParsedCommand, SlashCommand,
    TopicSelector,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const PLACEHOLDER: &str = "Ask about SDLC, OOP, Git, etc.";

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationAction {
    None,
    /// Send this question to the model
    Ask(String),
    Exit,
}

/// Manages the conversation flow and UI components
pub struct ConversationManager {
    session: ChatSession,
    history: ConversationHistory,
    composer: ConversationComposer,
    topics: TopicSelector,
    show_examples: bool,
}

impl ConversationManager {
    pub fn new(session: ChatSession, config: &Config) -> Self {
        let topic = config.ui.default_topic;
        let mut composer = ConversationComposer::new(PLACEHOLDER.to_string(), topic);
        composer.set_focus(true);

        Self {
            topics: TopicSelector::new(topic, session.model()),
            session,
            history: ConversationHistory::new(),
            composer,
            show_examples: config.ui.show_examples,
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn topic(&self) -> Topic {
        self.topics.selected()
    }

    #[cfg(test)]
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    #[cfg(test)]
    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    /// Route a terminal event to the right component
    pub fn handle_event(&mut self, event: TuiEvent) -> ConversationAction {
        match event {
            TuiEvent::Key(key) => self.handle_key(key),
            TuiEvent::Paste(text) => {
                self.composer.insert_str(&text);
                ConversationAction::None
            }
            TuiEvent::Resize | TuiEvent::Draw => ConversationAction::None,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        let palette_open = self.composer.is_palette_open();

        match key.code {
            KeyCode::Char('c') if ctrl => return ConversationAction::Exit,
            KeyCode::Esc if !palette_open => return ConversationAction::Exit,
            KeyCode::Char('l') if ctrl => {
                self.clear();
                return ConversationAction::None;
            }
            KeyCode::Char('s') if ctrl => {
                self.download();
                return ConversationAction::None;
            }
            KeyCode::Char('e') if ctrl => {
                self.show_examples = !self.show_examples;
                return ConversationAction::None;
            }
            KeyCode::Char(c) if alt && c.is_ascii_digit() => {
                if let Some(number) = c.to_digit(10) {
                    self.load_example(number as usize);
                }
                return ConversationAction::None;
            }
            KeyCode::Tab if !palette_open => {
                let topic = self.topics.select_next();
                self.composer.update_topic(topic);
                return ConversationAction::None;
            }
            KeyCode::BackTab => {
                let topic = self.topics.select_previous();
                self.composer.update_topic(topic);
                return ConversationAction::None;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(10);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(10);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ConversationResult::Submitted(input) => ConversationAction::Ask(input),
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    /// Show the question as pending so the next draw has a thinking indicator
    pub fn begin_exchange(&mut self, question: &str) {
        self.history.clear_notice();
        if !question.trim().is_empty() {
            self.history.set_pending(question.trim().to_string());
        }
    }

    /// Run the exchange to completion and refresh the history
    pub async fn finish_exchange(&mut self, question: &str) -> ExchangeOutcome {
        let outcome = self.session.exchange(question, self.topic()).await;

        self.history.clear_pending();
        self.history.set_messages(self.session.transcript().messages());
        if let Some(notice) = outcome.notice() {
            self.history.set_notice(notice);
        }

        outcome
    }

    pub fn select_topic(&mut self, topic: Topic) {
        self.topics.select(topic);
        self.composer.update_topic(topic);
    }

    /// Clear conversation
    pub fn clear(&mut self) {
        self.session.clear();
        self.history.set_messages(self.session.transcript().messages());
        self.history.clear_notice();
        self.composer.clear();
    }

    /// Export the transcript, reporting the outcome as a notice
    pub fn download(&mut self) {
        match self.session.export() {
            Ok(path) => self.history.set_notice(format!("📥 Chat saved to {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "chat export failed");
                self.history.set_notice(format!("Could not save chat: {:#}", e));
            }
        }
    }

    fn load_example(&mut self, number: usize) {
        match example_prompt(number) {
            Some(prompt) => self.composer.set_content(prompt),
            None => self.history.set_notice(format!(
                "There is no example {}; pick 1-{}.",
                number,
                EXAMPLE_PROMPTS.len()
            )),
        }
    }

    fn examples_listing() -> String {
        let mut listing = String::from("Example prompts:\n");
        for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
            listing.push_str(&format!("{}. {}\n", i + 1, prompt));
        }
        listing
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        match command.command {
            SlashCommand::Topic => {
                if let Some(topic) = command.topic_target() {
                    self.select_topic(topic);
                } else if let Some(name) = command.argument() {
                    let labels: Vec<&str> = Topic::all().iter().map(|t| t.label()).collect();
                    self.history
                        .set_notice(format!("Unknown topic '{}'. Choose one of: {}", name, labels.join(", ")));
                } else {
                    let topic = self.topics.select_next();
                    self.composer.update_topic(topic);
                }
                ConversationAction::None
            }
            SlashCommand::Example => {
                match command.example_number() {
                    Some(number) => self.load_example(number),
                    None => self.history.set_notice(Self::examples_listing()),
                }
                ConversationAction::None
            }
            SlashCommand::Clear => {
                self.clear();
                ConversationAction::None
            }
            SlashCommand::Download => {
                self.download();
                ConversationAction::None
            }
            SlashCommand::Help => {
                self.history.set_notice(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Bye => ConversationAction::Exit,
        }
    }

    /// Render the conversation UI components
    pub fn render_conversation_ui(&self, area: Rect, buf: &mut Buffer) {
        let examples_height = if self.show_examples { ExamplesPanel::height() } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),               // Topic selector
                Constraint::Min(8),                  // History
                Constraint::Length(examples_height), // Examples
                Constraint::Length(4),               // Composer
                Constraint::Length(1),               // Key hints
            ])
            .split(area);

        self.topics.clone().render(chunks[0], buf);
        self.history.clone().render(chunks[1], buf);
        if self.show_examples {
            ExamplesPanel.render(chunks[2], buf);
        }
        self.composer.clone().render(chunks[3], buf);

        let hints = Line::from(vec![Span::styled(
            "Enter send · Tab topic · Ctrl+L clear · Ctrl+S download · Ctrl+E examples · PgUp/PgDn scroll · Esc quit",
            Style::default().fg(Color::DarkGray),
        )]);
        buf.set_line(chunks[4].x, chunks[4].y, &hints, chunks[4].width);
    }
}
