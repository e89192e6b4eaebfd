//! Topic selector bar and example prompt list

use crate::events::Topic;
use crate::prompts::EXAMPLE_PROMPTS;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Header showing every topic with the active one highlighted
#[derive(Clone)]
pub struct TopicSelector {
    selected: Topic,
    model: String,
}

impl TopicSelector {
    pub fn new(selected: Topic, model: impl Into<String>) -> Self {
        Self {
            selected,
            model: model.into(),
        }
    }

    pub fn selected(&self) -> Topic {
        self.selected
    }

    pub fn select(&mut self, topic: Topic) {
        self.selected = topic;
    }

    pub fn select_next(&mut self) -> Topic {
        self.selected = self.selected.next();
        self.selected
    }

    pub fn select_previous(&mut self) -> Topic {
        self.selected = self.selected.previous();
        self.selected
    }

    fn topic_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, topic) in Topic::all().into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", Style::default().fg(Color::DarkGray)));
            }
            let style = if topic == self.selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(topic.label().to_string(), style));
        }
        Line::from(spans)
    }
}

impl Widget for TopicSelector {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("🏷️  Select Topic (Tab) · model: {}", self.model));

        let inner = block.inner(area);
        block.render(area, buf);
        buf.set_line(inner.x, inner.y, &self.topic_line(), inner.width);
    }
}

/// Numbered list of the example prompts
#[derive(Clone, Default)]
pub struct ExamplesPanel;

impl ExamplesPanel {
    /// Rows needed to show every example plus borders
    pub fn height() -> u16 {
        EXAMPLE_PROMPTS.len() as u16 + 2
    }
}

impl Widget for ExamplesPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("📚 Examples (Alt+1..5 or /example N, Ctrl+E to hide)");

        let inner = block.inner(area);
        block.render(area, buf);

        for (i, prompt) in EXAMPLE_PROMPTS.iter().enumerate() {
            if i >= inner.height as usize {
                break;
            }
            let line = Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::Cyan)),
                Span::styled(*prompt, Style::default().fg(Color::Gray)),
            ]);
            buf.set_line(inner.x, inner.y + i as u16, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_cycles_both_ways() {
        let mut selector = TopicSelector::new(Topic::General, "gpt-4");
        assert_eq!(selector.select_previous(), Topic::TestingQa);
        assert_eq!(selector.select_next(), Topic::General);
        assert_eq!(selector.select_next(), Topic::Sdlc);
    }

    #[test]
    fn selector_renders_active_topic() {
        let selector = TopicSelector::new(Topic::Git, "gpt-4");
        let area = Rect::new(0, 0, 120, 3);
        let mut buf = Buffer::empty(area);
        selector.render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf.get(x, 1).symbol().to_string())
            .collect();
        assert!(row.contains("Git"));
        assert!(row.contains("Testing & QA"));
    }

    #[test]
    fn examples_panel_lists_every_prompt() {
        let area = Rect::new(0, 0, 100, ExamplesPanel::height());
        let mut buf = Buffer::empty(area);
        ExamplesPanel.render(area, &mut buf);

        let row: String = (0..area.width)
            .map(|x| buf.get(x, 2).symbol().to_string())
            .collect();
        assert!(row.contains("2. What are SOLID principles in OOP?"));
    }
}
