use crate::events::Topic;
use crate::ui::conversation::commands::{command_entries, parse_slash_command, CommandEntry, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

const CURSOR_MARK: char = '▌';
const PALETTE_ROWS: usize = 6;

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Byte offset into `content`, always on a char boundary
    pub cursor_position: usize,
}

/// Slash-command suggestions shown above the input while a bare `/name` is typed
#[derive(Debug, Clone, Default)]
struct CommandPalette {
    open: bool,
    matches: Vec<CommandEntry>,
    selected: usize,
}

impl CommandPalette {
    /// Follow the input: open on `/prefix`, close once an argument starts
    fn update(&mut self, input: &str) {
        let Some(query) = input.strip_prefix('/') else {
            self.close();
            return;
        };
        if query.contains(char::is_whitespace) {
            self.close();
            return;
        }

        let query = query.to_lowercase();
        self.matches = command_entries()
            .into_iter()
            .filter(|entry| entry.keyword.starts_with(&query))
            .collect();
        self.open = true;
        self.selected = self.selected.min(self.matches.len().saturating_sub(1));
    }

    fn close(&mut self) {
        *self = Self::default();
    }

    fn step(&mut self, forward: bool) {
        let count = self.matches.len();
        if count == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
    }

    /// Input text that picking the highlighted entry would produce
    fn completion(&self) -> Option<String> {
        if !self.open {
            return None;
        }
        self.matches
            .get(self.selected)
            .map(|entry| format!("/{} ", entry.keyword))
    }

    /// Draw the list directly above the composer box
    fn render(&self, composer: Rect, buf: &mut Buffer) {
        if !self.open || self.matches.is_empty() {
            return;
        }

        let wanted = self.matches.len().min(PALETTE_ROWS) as u16 + 2;
        let height = wanted.min(composer.y);
        if height < 3 {
            return;
        }

        let area = Rect::new(
            composer.x + 1,
            composer.y - height,
            composer.width.saturating_sub(2),
            height,
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Commands")
            .style(Style::default().fg(Color::Blue));
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);

        let visible = inner.height as usize;
        let first = (self.selected + 1).saturating_sub(visible);
        for (row, (index, entry)) in self.matches.iter().enumerate().skip(first).take(visible).enumerate() {
            let keyword_style = if index == self.selected {
                Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let line = Line::from(vec![
                Span::styled(format!("/{:<10}", entry.keyword), keyword_style),
                Span::styled(entry.description, Style::default().fg(Color::Gray)),
            ]);
            buf.set_line(inner.x, inner.y + row as u16, &line, inner.width);
        }
    }
}

/// Conversation composer for user input
#[derive(Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    has_focus: bool,
    topic: Topic,
    palette: CommandPalette,
}

impl ConversationComposer {
    pub fn new(placeholder: String, topic: Topic) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder,
            has_focus: false,
            topic,
            palette: CommandPalette::default(),
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        match key.code {
            // Alt+Enter for terminals that report Shift+Enter as a bare Enter
            KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                self.insert_char('\n');
            }
            KeyCode::Enter => {
                if let Some(completion) = self.palette.completion() {
                    if completion.trim_end() != self.state.content {
                        self.set_content(&completion);
                        return ConversationResult::None;
                    }
                }
                return self.submit();
            }
            KeyCode::Up if self.palette.open => self.palette.step(false),
            KeyCode::Down if self.palette.open => self.palette.step(true),
            KeyCode::Esc => self.palette.close(),
            KeyCode::Tab => {
                if let Some(completion) = self.palette.completion() {
                    self.set_content(&completion);
                }
            }
            KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {}
            KeyCode::Char(c) => {
                self.insert_char(c);
                self.palette.update(&self.state.content);
            }
            KeyCode::Backspace => {
                if self.backspace() {
                    self.palette.update(&self.state.content);
                }
            }
            KeyCode::Delete => {
                if self.delete() {
                    self.palette.update(&self.state.content);
                }
            }
            KeyCode::Left => {
                self.state.cursor_position = previous_boundary(&self.state.content, self.state.cursor_position);
            }
            KeyCode::Right => {
                self.state.cursor_position = next_boundary(&self.state.content, self.state.cursor_position);
            }
            KeyCode::Home => self.state.cursor_position = 0,
            KeyCode::End => self.state.cursor_position = self.state.content.len(),
            _ => {}
        }

        ConversationResult::None
    }

    /// Take the input; empty submits pass through so the session can answer with its notice
    fn submit(&mut self) -> ConversationResult {
        let content = std::mem::take(&mut self.state.content);
        self.state.cursor_position = 0;
        self.palette.close();

        match parse_slash_command(&content) {
            Some(command) => ConversationResult::Command(command),
            None => ConversationResult::Submitted(content),
        }
    }

    /// Insert pasted text at the cursor
    pub fn insert_str(&mut self, text: &str) {
        self.state.content.insert_str(self.state.cursor_position, text);
        self.state.cursor_position += text.len();
        self.palette.update(&self.state.content);
    }

    /// Replace the content, placing the cursor at the end
    pub fn set_content(&mut self, text: &str) {
        self.state.content = text.to_string();
        self.state.cursor_position = self.state.content.len();
        self.palette.close();
    }

    fn insert_char(&mut self, c: char) {
        self.state.content.insert(self.state.cursor_position, c);
        self.state.cursor_position += c.len_utf8();
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        if self.state.cursor_position == 0 {
            return false;
        }
        self.state.cursor_position = previous_boundary(&self.state.content, self.state.cursor_position);
        self.state.content.remove(self.state.cursor_position);
        true
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        if self.state.cursor_position >= self.state.content.len() {
            return false;
        }
        self.state.content.remove(self.state.cursor_position);
        true
    }

    pub fn set_focus(&mut self, has_focus: bool) {
        self.has_focus = has_focus;
    }

    /// Update the topic shown in the title
    pub fn update_topic(&mut self, topic: Topic) {
        self.topic = topic;
    }

    #[cfg(test)]
    pub fn get_content(&self) -> &str {
        &self.state.content
    }

    pub fn is_palette_open(&self) -> bool {
        self.palette.open
    }

    pub fn clear(&mut self) {
        self.state = TextAreaState::default();
        self.palette.close();
    }
}

fn previous_boundary(text: &str, position: usize) -> usize {
    text[..position]
        .char_indices()
        .next_back()
        .map(|(index, _)| index)
        .unwrap_or(0)
}

fn next_boundary(text: &str, position: usize) -> usize {
    text[position..]
        .chars()
        .next()
        .map(|c| position + c.len_utf8())
        .unwrap_or(position)
}

/// Hard-wrap input into rows of at most `width` chars; explicit newlines always start a row
fn wrap_rows(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            rows.push(String::new());
        } else {
            rows.extend(chars.chunks(width).map(|chunk| chunk.iter().collect::<String>()));
        }
    }
    rows
}

impl Widget for ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("✏️  Your question... [Topic: {}]", self.topic.label()))
            .style(if self.has_focus {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Gray)
            });

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder = Line::from(Span::styled(&self.placeholder, Style::default().fg(Color::DarkGray)));
            buf.set_line(inner_area.x, inner_area.y, &placeholder, inner_area.width);
        } else {
            let mut content = self.state.content.clone();
            if self.has_focus {
                content.insert(self.state.cursor_position.min(content.len()), CURSOR_MARK);
            }

            // Scroll so the row holding the cursor stays inside the box
            let rows = wrap_rows(&content, inner_area.width as usize);
            let cursor_row = rows
                .iter()
                .position(|row| row.contains(CURSOR_MARK))
                .unwrap_or(rows.len() - 1);
            let first = (cursor_row + 1).saturating_sub(inner_area.height as usize);

            for (offset, row) in rows.iter().skip(first).take(inner_area.height as usize).enumerate() {
                buf.set_line(
                    inner_area.x,
                    inner_area.y + offset as u16,
                    &Line::raw(row.as_str()),
                    inner_area.width,
                );
            }
        }

        self.palette.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn composer() -> ConversationComposer {
        ConversationComposer::new("Ask about SDLC, OOP, Git, etc.".to_string(), Topic::General)
    }

    #[test]
    fn enter_submits_and_clears() {
        let mut composer = composer();
        type_text(&mut composer, "What is UML?");

        let result = composer.handle_key(key(KeyCode::Enter));
        assert_eq!(result, ConversationResult::Submitted("What is UML?".to_string()));
        assert!(composer.get_content().is_empty());
    }

    #[test]
    fn empty_enter_still_submits() {
        let mut composer = composer();
        assert_eq!(
            composer.handle_key(key(KeyCode::Enter)),
            ConversationResult::Submitted(String::new())
        );
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let mut composer = composer();
        type_text(&mut composer, "line one");
        composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut composer, "line two");
        assert_eq!(composer.get_content(), "line one\nline two");
    }

    #[test]
    fn alt_enter_inserts_newline() {
        let mut composer = composer();
        type_text(&mut composer, "first");
        let result = composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(result, ConversationResult::None);
        type_text(&mut composer, "second");
        assert_eq!(composer.get_content(), "first\nsecond");
    }

    #[test]
    fn slash_input_becomes_command() {
        let mut composer = composer();
        type_text(&mut composer, "/topic git");
        assert!(!composer.is_palette_open());

        match composer.handle_key(key(KeyCode::Enter)) {
            ConversationResult::Command(parsed) => {
                assert_eq!(parsed.command, SlashCommand::Topic);
                assert_eq!(parsed.topic_target(), Some(Topic::Git));
            }
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn palette_completes_selected_command() {
        let mut composer = composer();
        type_text(&mut composer, "/dow");
        assert!(composer.is_palette_open());

        assert_eq!(composer.handle_key(key(KeyCode::Tab)), ConversationResult::None);
        assert_eq!(composer.get_content(), "/download ");
        assert!(!composer.is_palette_open());
    }

    #[test]
    fn palette_selection_wraps_and_full_name_submits() {
        let mut composer = composer();
        type_text(&mut composer, "/");
        assert!(composer.is_palette_open());

        // Up from the first entry lands on the last one, /bye
        composer.handle_key(key(KeyCode::Up));
        composer.handle_key(key(KeyCode::Tab));
        assert_eq!(composer.get_content(), "/bye ");

        composer.clear();
        type_text(&mut composer, "/help");
        match composer.handle_key(key(KeyCode::Enter)) {
            ConversationResult::Command(parsed) => assert_eq!(parsed.command, SlashCommand::Help),
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn backspacing_past_the_slash_closes_palette() {
        let mut composer = composer();
        type_text(&mut composer, "/c");
        assert!(composer.is_palette_open());
        composer.handle_key(key(KeyCode::Backspace));
        composer.handle_key(key(KeyCode::Backspace));
        assert!(!composer.is_palette_open());
    }

    #[test]
    fn long_lines_wrap_to_width() {
        assert_eq!(wrap_rows("abcdefg\n\nxy", 3), vec!["abc", "def", "g", "", "xy"]);
        assert_eq!(wrap_rows("", 3), vec![""]);
        assert_eq!(wrap_rows("héllo", 2), vec!["hé", "ll", "o"]);
    }

    #[test]
    fn cursor_stays_visible_in_overflowing_input() {
        let mut composer = composer();
        composer.set_focus(true);
        type_text(&mut composer, &"a".repeat(40));

        // 12x2 inner area: 41 chars with the cursor wrap to four rows, the last two are drawn
        let area = Rect::new(0, 0, 14, 4);
        let mut buf = Buffer::empty(area);
        composer.render(area, &mut buf);

        let cursor_cells = buf.content.iter().filter(|cell| cell.symbol() == "▌").count();
        assert_eq!(cursor_cells, 1);
        let row = |y: u16| (1..13).map(|x| buf.get(x, y).symbol().to_string()).collect::<String>();
        assert_eq!(row(1), "a".repeat(12));
        assert_eq!(row(2), format!("{}▌{}", "a".repeat(4), " ".repeat(7)));
    }

    #[test]
    fn editing_handles_multibyte_characters() {
        let mut composer = composer();
        type_text(&mut composer, "héllo");
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Backspace));
        assert_eq!(composer.get_content(), "hllo");

        composer.handle_key(key(KeyCode::End));
        composer.insert_str(" wörld");
        assert_eq!(composer.get_content(), "hllo wörld");
    }

    #[test]
    fn control_chords_do_not_insert_text() {
        let mut composer = composer();
        composer.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert!(composer.get_content().is_empty());
    }

    #[test]
    fn set_content_replaces_text() {
        let mut composer = composer();
        type_text(&mut composer, "draft");
        composer.set_content("What are SOLID principles in OOP?");
        assert_eq!(composer.get_content(), "What are SOLID principles in OOP?");
    }
}
