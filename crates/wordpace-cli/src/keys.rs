//! Keyboard input — a dedicated thread turns raw key events into commands.
//!
//! `crossterm::event::read` blocks, so it lives on its own OS thread and
//! forwards mapped commands over a channel the async host loop selects on.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

/// Playback commands bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    TogglePause,
    Stop,
    Quit,
    RateUp,
    RateDown,
    GapUp,
    GapDown,
}

fn map_key(key: &KeyEvent) -> Option<KeyCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyCommand::Quit);
    }
    match key.code {
        KeyCode::Char(' ') => Some(KeyCommand::TogglePause),
        KeyCode::Char('s') => Some(KeyCommand::Stop),
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyCommand::Quit),
        KeyCode::Char('+' | '=') => Some(KeyCommand::RateUp),
        KeyCode::Char('-') => Some(KeyCommand::RateDown),
        KeyCode::Char(']') => Some(KeyCommand::GapUp),
        KeyCode::Char('[') => Some(KeyCommand::GapDown),
        _ => None,
    }
}

/// Spawn the key-reader thread and return the command channel.
///
/// The thread exits when the receiver is dropped or the terminal goes away.
pub fn spawn_key_reader() -> io::Result<mpsc::UnboundedReceiver<KeyCommand>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("wordpace-keys".into())
        .spawn(move || {
            loop {
                match event::read() {
                    Ok(Event::Key(key)) => {
                        if let Some(command) = map_key(&key) {
                            if tx.send(command).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "key reader stopped");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
