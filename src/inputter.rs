use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// What a key press did to the search box. The model reapplies the filter on
// every `Edited`, so the table updates while the user is still typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Edited,
    Submitted,
    Cancelled,
    Ignored,
}

#[derive(Debug, Default)]
pub struct Inputter {
    buffer: String,
    curser_pos: usize, // in chars, not bytes
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, KeyModifiers::NONE) => InputEvent::Submitted,
            (KeyCode::Esc, KeyModifiers::NONE) => InputEvent::Cancelled,
            (KeyCode::Backspace, KeyModifiers::NONE) => self.backspace(),
            (KeyCode::Delete, KeyModifiers::NONE) => self.delete(),
            (KeyCode::Left, KeyModifiers::NONE) => self.move_curser(-1),
            (KeyCode::Right, KeyModifiers::NONE) => self.move_curser(1),
            (KeyCode::Home, KeyModifiers::NONE) => self.move_to(0),
            (KeyCode::End, KeyModifiers::NONE) => self.move_to(self.char_count()),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                if self.buffer.is_empty() {
                    InputEvent::Ignored
                } else {
                    self.clear();
                    InputEvent::Edited
                }
            }
            (KeyCode::Char(chr), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.buffer.insert(self.byte_pos(self.curser_pos), chr);
                self.curser_pos += 1;
                InputEvent::Edited
            }
            _ => InputEvent::Ignored,
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn curser(&self) -> usize {
        self.curser_pos
    }

    pub fn set(&mut self, s: &str) {
        self.buffer = s.to_string();
        self.curser_pos = self.char_count();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.curser_pos = 0;
    }

    fn backspace(&mut self) -> InputEvent {
        if self.curser_pos == 0 {
            return InputEvent::Ignored;
        }
        self.curser_pos -= 1;
        self.buffer.remove(self.byte_pos(self.curser_pos));
        InputEvent::Edited
    }

    fn delete(&mut self) -> InputEvent {
        if self.curser_pos >= self.char_count() {
            return InputEvent::Ignored;
        }
        self.buffer.remove(self.byte_pos(self.curser_pos));
        InputEvent::Edited
    }

    fn move_curser(&mut self, step: isize) -> InputEvent {
        let pos = self.curser_pos.saturating_add_signed(step);
        self.move_to(pos.min(self.char_count()))
    }

    fn move_to(&mut self, pos: usize) -> InputEvent {
        self.curser_pos = pos.min(self.char_count());
        InputEvent::Ignored
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_pos(&self, char_pos: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.buffer.len())
    }
}
