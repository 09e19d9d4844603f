use std::time::Duration;

use ratatui::crossterm::event::{self, Event, KeyCode};
use tracing::trace;

use crate::domain::{Message, TableConfig, TablyError};
use crate::model::Model;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TablyError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            // While the search box is active the model consumes keys itself.
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::CursorUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::CursorDown),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::PrevPage),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::NextPage),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstPage),
            KeyCode::Char('G') | KeyCode::End => Some(Message::LastPage),
            KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                Some(Message::GotoPage(c.to_digit(10).unwrap_or(1) as usize))
            }
            KeyCode::Char(' ') => Some(Message::ToggleSelect),
            KeyCode::Char('a') => Some(Message::ToggleSelectAll),
            KeyCode::Char('y') => Some(Message::CopyRow),
            KeyCode::Char('/') => Some(Message::Search),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
