//! Conversation history display component

use crate::events::ConversationRole;
use crate::prompts::tag_with_topic;
use crate::transcript::Message;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};

/// Horizontal placement of a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Conversation history display component
#[derive(Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
    /// Lines scrolled up from the bottom
    scroll_offset: usize,
    notice: Option<String>,
    pending_question: Option<String>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror the session transcript
    pub fn set_messages(&mut self, messages: &[Message]) {
        self.messages = messages.to_vec();
        self.scroll_to_bottom();
    }

    /// Show a question that is waiting on the model
    pub fn set_pending(&mut self, question: String) {
        self.pending_question = Some(question);
        self.scroll_to_bottom();
    }

    pub fn clear_pending(&mut self) {
        self.pending_question = None;
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending_question.is_some()
    }

    /// Set the informational line shown under the messages
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.scroll_to_bottom();
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    #[cfg(test)]
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Every line the history would draw at the given inner width
    fn build_lines(&self, width: u16) -> Vec<(Side, Line<'static>)> {
        let mut all_lines = Vec::new();

        for message in &self.messages {
            all_lines.extend(render_message(message, width));
            all_lines.push((Side::Left, Line::from("")));
        }

        if let Some(question) = &self.pending_question {
            let bubble_width = bubble_width(width);
            all_lines.push((Side::Right, header_line("You", None, Color::Blue)));
            for line in wrap_text(question, bubble_width) {
                all_lines.push((Side::Right, Line::from(Span::styled(line, Style::default().fg(Color::Blue)))));
            }
            all_lines.push((Side::Left, Line::from("")));
            all_lines.push((
                Side::Left,
                Line::from(vec![
                    Span::styled("🤖 ", Style::default().fg(Color::Green)),
                    Span::styled("Bot is thinking...", Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC)),
                ]),
            ));
        }

        if let Some(notice) = &self.notice {
            for line in wrap_text(notice, width.saturating_sub(2) as usize) {
                all_lines.push((
                    Side::Left,
                    Line::from(vec![
                        Span::raw("  "),
                        Span::styled(line, Style::default().fg(Color::Yellow)),
                    ]),
                ));
            }
        }

        all_lines
    }
}

impl Widget for ConversationHistory {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Software Engineering Chatbot");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.messages.is_empty() && self.pending_question.is_none() {
            let mut welcome_lines = vec![
                Line::from(vec![Span::styled(
                    "Welcome to your expert assistant for all things Software Engineering!",
                    Style::default().fg(Color::Green),
                )]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Select a topic with Tab and ask anything.",
                    Style::default().fg(Color::Gray),
                )]),
                Line::from(""),
                Line::from(vec![Span::styled(
                    "Press Enter to send, Shift+Enter or Alt+Enter for new line, /help for commands.",
                    Style::default().fg(Color::DarkGray),
                )]),
            ];

            if let Some(notice) = &self.notice {
                welcome_lines.push(Line::from(""));
                welcome_lines.push(Line::from(Span::styled(notice.clone(), Style::default().fg(Color::Yellow))));
            }

            for (i, line) in welcome_lines.iter().enumerate() {
                if i < inner_area.height as usize {
                    buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
                }
            }
            return;
        }

        let all_lines = self.build_lines(inner_area.width.saturating_sub(1));
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        let offset = self.scroll_offset.min(max_offset);
        let end = total - offset;
        let start = end.saturating_sub(height);

        for (i, (side, line)) in all_lines[start..end].iter().enumerate() {
            let text_width = line.width() as u16;
            let usable = inner_area.width.saturating_sub(1);
            let x = match side {
                Side::Left => inner_area.x,
                Side::Right => inner_area.x + usable.saturating_sub(text_width),
            };
            buf.set_line(x, inner_area.y + i as u16, line, usable);
        }

        if total > height {
            let mut scroll_state = ScrollbarState::new(max_offset).position(max_offset - offset);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(inner_area, buf, &mut scroll_state);
        }
    }
}

/// Width of a bubble: most of the area, leaving a gutter on the far side
fn bubble_width(width: u16) -> usize {
    (width as usize * 4 / 5).max(10)
}

fn header_line(label: &str, detail: Option<String>, color: Color) -> Line<'static> {
    let mut spans = vec![Span::styled(
        label.to_string(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if let Some(detail) = detail {
        spans.push(Span::styled(format!(" · {}", detail), Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Render a single message into a bubble: user on the right, bot on the left
fn render_message(message: &Message, width: u16) -> Vec<(Side, Line<'static>)> {
    let timestamp = message.timestamp.format("%H:%M:%S").to_string();
    let bubble_width = bubble_width(width);

    let (side, header, body, style) = match message.role {
        ConversationRole::User => {
            let topic_prefix = message.topic.map(|topic| tag_with_topic(topic, ""));
            let body = topic_prefix
                .as_deref()
                .and_then(|prefix| message.content.strip_prefix(prefix))
                .unwrap_or(&message.content)
                .to_string();
            let detail = match message.topic {
                Some(topic) => format!("{} · {}", topic.label(), timestamp),
                None => timestamp,
            };
            (Side::Right, header_line("👤 You", Some(detail), Color::Blue), body, Style::default().fg(Color::Blue))
        }
        ConversationRole::Assistant => {
            let style = if message.content.starts_with("Error: ") {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            (Side::Left, header_line("🤖 Bot", Some(timestamp), Color::Green), message.content.clone(), style)
        }
        ConversationRole::System => (
            Side::Left,
            header_line("⚙️ System", Some(timestamp), Color::Yellow),
            message.content.clone(),
            Style::default().fg(Color::Yellow),
        ),
    };

    let mut lines = vec![(side, header)];
    for content_line in wrap_text(&body, bubble_width) {
        lines.push((side, Line::from(Span::styled(content_line, style))));
    }
    lines
}

/// Wrap text to the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let indent: String = raw_line.chars().take_while(|c| c.is_whitespace()).collect();
        let mut current_line = indent.clone();
        let mut current_width = indent.chars().count();

        for word in raw_line.split_whitespace() {
            let word_width = word.chars().count();
            let needs_space = current_width > indent.chars().count();
            let projected = current_width + word_width + usize::from(needs_space);

            if projected > width && needs_space {
                lines.push(std::mem::take(&mut current_line));
                current_line.push_str(&indent);
                current_width = indent.chars().count();
            } else if needs_space {
                current_line.push(' ');
                current_width += 1;
            }

            if word_width > width {
                // Hard-split words longer than a whole line
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width) {
                    if !current_line.trim().is_empty() {
                        lines.push(std::mem::take(&mut current_line));
                    }
                    current_line = chunk.iter().collect();
                    current_width = chunk.len();
                }
            } else {
                current_line.push_str(word);
                current_width += word_width;
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Topic;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    #[test]
    fn wrap_respects_width_and_newlines() {
        let lines = wrap_text("one two three four\n\nfive", 9);
        assert_eq!(lines, vec!["one two", "three", "four", "", "five"]);
    }

    #[test]
    fn wrap_keeps_code_indentation() {
        let lines = wrap_text("fn main() {\n    println!(\"hi\");\n}", 40);
        assert_eq!(lines[1], "    println!(\"hi\");");
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("abcdefghij", 4);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn user_bubble_hides_topic_prefix() {
        let message = Message::user(tag_with_topic(Topic::Git, "What is rebase?"), Topic::Git);
        let lines = render_message(&message, 60);

        assert!(lines.iter().all(|(side, _)| *side == Side::Right));
        let body: Vec<String> = lines[1..].iter().map(|(_, l)| line_text(l)).collect();
        assert_eq!(body, vec!["What is rebase?"]);
        assert!(line_text(&lines[0].1).contains("Git"));
    }

    #[test]
    fn bot_bubble_is_left_aligned() {
        let lines = render_message(&Message::assistant("Short answer."), 60);
        assert!(lines.iter().all(|(side, _)| *side == Side::Left));
        assert!(line_text(&lines[0].1).contains("Bot"));
    }

    #[test]
    fn pending_question_and_notice_are_drawn() {
        let mut history = ConversationHistory::new();
        history.set_pending("How do I squash commits?".to_string());
        history.set_notice("Saved chat_1.txt");

        let text: Vec<String> = history.build_lines(80).iter().map(|(_, l)| line_text(l)).collect();
        assert!(text.iter().any(|l| l.contains("How do I squash commits?")));
        assert!(text.iter().any(|l| l.contains("thinking")));
        assert!(text.last().unwrap().contains("Saved chat_1.txt"));
    }

    #[test]
    fn scrolling_saturates_at_bottom() {
        let mut history = ConversationHistory::new();
        history.scroll_up(5);
        history.scroll_down(10);
        assert_eq!(history.scroll_offset, 0);
    }
}
