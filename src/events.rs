use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, IntoEnumIterator};

/// TUI-specific events (keyboard, paste, resize)
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Paste event
    Paste(String),

    /// Terminal resize; the next draw picks up the new size
    Resize,

    /// Draw/redraw request
    Draw,
}

impl TuiEvent {
    /// Map a raw crossterm event onto the subset the UI cares about
    pub fn from_crossterm(event: crossterm::event::Event) -> Option<Self> {
        use crossterm::event::Event;

        match event {
            Event::Key(key) => Some(TuiEvent::Key(key)),
            Event::Paste(text) => Some(TuiEvent::Paste(text)),
            Event::Resize(_, _) => Some(TuiEvent::Resize),
            Event::FocusGained => Some(TuiEvent::Draw),
            _ => None,
        }
    }
}

/// Role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    System,
    User,
    Assistant,
}

impl ConversationRole {
    /// Wire name used by chat-completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationRole::System => "system",
            ConversationRole::User => "user",
            ConversationRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ConversationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed vocabulary of topics a question can be tagged with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Topic {
    #[default]
    General,
    #[serde(rename = "SDLC")]
    Sdlc,
    Agile,
    #[serde(rename = "Design Patterns")]
    DesignPatterns,
    #[serde(rename = "UML")]
    Uml,
    Git,
    #[serde(rename = "SOLID Principles")]
    SolidPrinciples,
    #[serde(rename = "Testing & QA")]
    TestingQa,
}

impl Topic {
    /// Label shown in the selector and embedded in the prompt
    pub fn label(&self) -> &'static str {
        match self {
            Topic::General => "General",
            Topic::Sdlc => "SDLC",
            Topic::Agile => "Agile",
            Topic::DesignPatterns => "Design Patterns",
            Topic::Uml => "UML",
            Topic::Git => "Git",
            Topic::SolidPrinciples => "SOLID Principles",
            Topic::TestingQa => "Testing & QA",
        }
    }

    pub fn all() -> Vec<Topic> {
        Topic::iter().collect()
    }

    /// Next topic in selector order, wrapping around
    pub fn next(&self) -> Topic {
        let all = Self::all();
        let index = all.iter().position(|t| t == self).unwrap_or(0);
        all[(index + 1) % all.len()]
    }

    /// Previous topic in selector order, wrapping around
    pub fn previous(&self) -> Topic {
        let all = Self::all();
        let index = all.iter().position(|t| t == self).unwrap_or(0);
        all[(index + all.len() - 1) % all.len()]
    }

    /// Parse a user-typed topic name, accepting labels and a few short aliases
    pub fn parse(input: &str) -> Option<Topic> {
        let normalized: String = input
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();

        if normalized.is_empty() {
            return None;
        }

        let by_label = Topic::iter().find(|topic| {
            let label: String = topic
                .label()
                .to_lowercase()
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect();
            label == normalized
        });

        by_label.or_else(|| match normalized.as_str() {
            "patterns" | "design" => Some(Topic::DesignPatterns),
            "solid" => Some(Topic::SolidPrinciples),
            "testing" | "qa" | "test" => Some(Topic::TestingQa),
            _ => None,
        })
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn crossterm_events_map_to_ui_events() {
        assert!(matches!(TuiEvent::from_crossterm(Event::Resize(120, 40)), Some(TuiEvent::Resize)));
        assert!(matches!(TuiEvent::from_crossterm(Event::FocusGained), Some(TuiEvent::Draw)));
        assert!(TuiEvent::from_crossterm(Event::FocusLost).is_none());

        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert!(matches!(TuiEvent::from_crossterm(Event::Key(key)), Some(TuiEvent::Key(k)) if k == key));
    }

    #[test]
    fn topics_keep_selector_order() {
        let labels: Vec<&str> = Topic::all().iter().map(|t| t.label()).collect();
        assert_eq!(
            labels,
            vec![
                "General",
                "SDLC",
                "Agile",
                "Design Patterns",
                "UML",
                "Git",
                "SOLID Principles",
                "Testing & QA",
            ]
        );
    }

    #[test]
    fn topic_cycling_wraps() {
        assert_eq!(Topic::TestingQa.next(), Topic::General);
        assert_eq!(Topic::General.previous(), Topic::TestingQa);
        assert_eq!(Topic::Git.next(), Topic::SolidPrinciples);
    }

    #[test]
    fn parse_accepts_labels_and_aliases() {
        assert_eq!(Topic::parse("git"), Some(Topic::Git));
        assert_eq!(Topic::parse("Design Patterns"), Some(Topic::DesignPatterns));
        assert_eq!(Topic::parse("design-patterns"), Some(Topic::DesignPatterns));
        assert_eq!(Topic::parse("testing & qa"), Some(Topic::TestingQa));
        assert_eq!(Topic::parse("solid"), Some(Topic::SolidPrinciples));
        assert_eq!(Topic::parse("cobol"), None);
        assert_eq!(Topic::parse("   "), None);
    }

    #[test]
    fn topic_serializes_as_label() {
        let json = serde_json::to_string(&Topic::TestingQa).unwrap();
        assert_eq!(json, "\"Testing & QA\"");
        let back: Topic = serde_json::from_str("\"SOLID Principles\"").unwrap();
        assert_eq!(back, Topic::SolidPrinciples);
    }

    #[test]
    fn role_wire_names() {
        assert_eq!(ConversationRole::Assistant.as_str(), "assistant");
        let json = serde_json::to_string(&ConversationRole::System).unwrap();
        assert_eq!(json, "\"system\"");
    }
}
