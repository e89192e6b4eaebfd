//! Terminal setup and the main event loop

use crate::events::TuiEvent;
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the chat UI until the user quits
pub async fn run(mut manager: ConversationManager) -> Result<()> {
    let (mut terminal, enhanced_keys) = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut manager).await;
    restore_terminal(&mut terminal, enhanced_keys)?;

    tracing::info!(
        session = manager.session().session_id(),
        messages = manager.session().transcript().len(),
        "chat UI closed"
    );
    result
}

/// Returns the terminal and whether keyboard enhancement flags were pushed
fn setup_terminal() -> Result<(Tui, bool)> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;

    // Without disambiguation most terminals send Shift+Enter as a plain Enter
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .context("Failed to enable keyboard enhancement")?;
    }
    tracing::debug!(enhanced_keys, "terminal ready");

    let terminal = Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;
    Ok((terminal, enhanced_keys))
}

fn restore_terminal(terminal: &mut Tui, enhanced_keys: bool) -> Result<()> {
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("Failed to disable keyboard enhancement")?;
    }
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableBracketedPaste)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

fn draw(terminal: &mut Tui, manager: &ConversationManager) -> Result<()> {
    terminal
        .draw(|frame| {
            let area = frame.size();
            manager.render_conversation_ui(area, frame.buffer_mut());
        })
        .context("Failed to draw frame")?;
    Ok(())
}

async fn next_event() -> Result<crossterm::event::Event> {
    let event = tokio::task::spawn_blocking(crossterm::event::read)
        .await
        .context("Input task failed")?
        .context("Failed to read terminal event")?;
    Ok(event)
}

async fn event_loop(terminal: &mut Tui, manager: &mut ConversationManager) -> Result<()> {
    loop {
        draw(terminal, manager)?;

        let Some(event) = TuiEvent::from_crossterm(next_event().await?) else {
            continue;
        };

        match manager.handle_event(event) {
            ConversationAction::None => {}
            ConversationAction::Exit => return Ok(()),
            ConversationAction::Ask(question) => {
                // The UI blocks on the call; draw once so the pending question shows
                manager.begin_exchange(&question);
                draw(terminal, manager)?;
                manager.finish_exchange(&question).await;
            }
        }
    }
}
