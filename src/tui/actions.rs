//! The input line used by commands that ask for text.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tabscope_core::Command;

/// Result of applying a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyResult {
    Continue,
    Quit,
}

/// What a key did to an open input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Editing,
    Submitted(String),
    /// Aborted by the named key; nothing else changes.
    Cancelled(String),
}

/// A prompt on the status line, collecting text for `command`.
#[derive(Clone, Debug)]
pub struct InputLine {
    pub command: Command,
    pub label: String,
    pub buffer: String,
    pub cursor: usize,
}

impl InputLine {
    pub fn new(command: Command, label: &str, initial: String) -> Self {
        Self {
            command,
            label: label.to_string(),
            cursor: initial.len(),
            buffer: initial,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Prompt {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match (key.code, ctrl) {
            (KeyCode::Enter, _) => return Prompt::Submitted(self.buffer.clone()),
            (KeyCode::Esc, _) => return Prompt::Cancelled("Esc".to_string()),
            (KeyCode::Char('c'), true) => return Prompt::Cancelled("C-c".to_string()),
            (KeyCode::Char('g'), true) => return Prompt::Cancelled("C-g".to_string()),
            (KeyCode::Left, _) => self.cursor = self.prev_boundary(),
            (KeyCode::Right, _) => self.cursor = self.next_boundary(),
            (KeyCode::Home, _) | (KeyCode::Char('a'), true) => self.cursor = 0,
            (KeyCode::End, _) | (KeyCode::Char('e'), true) => self.cursor = self.buffer.len(),
            (KeyCode::Backspace, _) | (KeyCode::Char('h'), true) => {
                let start = self.prev_boundary();
                self.buffer.drain(start..self.cursor);
                self.cursor = start;
            }
            (KeyCode::Delete, _) => {
                let end = self.next_boundary();
                self.buffer.drain(self.cursor..end);
            }
            (KeyCode::Char('u'), true) => {
                self.buffer.drain(..self.cursor);
                self.cursor = 0;
            }
            (KeyCode::Char('k'), true) => self.buffer.truncate(self.cursor),
            (KeyCode::Char(c), false) if !key.modifiers.contains(KeyModifiers::ALT) => {
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            _ => {}
        }
        Prompt::Editing
    }

    /// Byte offset of the character before the cursor.
    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    /// Byte offset just past the character under the cursor.
    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map_or(self.cursor, |c| self.cursor + c.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn typed(line: &mut InputLine, text: &str) {
        for c in text.chars() {
            assert_eq!(line.handle_key(key(KeyCode::Char(c))), Prompt::Editing);
        }
    }

    #[test]
    fn typing_and_submitting() {
        let mut line = InputLine::new(Command::GotoRow, "goto row number: ", String::new());
        typed(&mut line, "42");
        line.handle_key(key(KeyCode::Left));
        typed(&mut line, "0");
        assert_eq!(line.handle_key(key(KeyCode::Enter)), Prompt::Submitted("402".into()));
    }

    #[test]
    fn editing_starts_at_end_of_initial_text() {
        let mut line = InputLine::new(Command::EditCell, "edit: ", "héllo".into());
        line.handle_key(key(KeyCode::Backspace));
        line.handle_key(key(KeyCode::Home));
        line.handle_key(key(KeyCode::Delete));
        assert_eq!(line.buffer, "éll");
        line.handle_key(key(KeyCode::Right));
        line.handle_key(key(KeyCode::Backspace));
        assert_eq!(line.buffer, "ll");
    }

    #[test]
    fn escape_and_ctrl_c_cancel() {
        let mut line = InputLine::new(Command::Open, "open: ", String::new());
        typed(&mut line, "x");
        assert_eq!(line.handle_key(key(KeyCode::Esc)), Prompt::Cancelled("Esc".into()));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(line.handle_key(ctrl_c), Prompt::Cancelled("C-c".into()));
    }

    #[test]
    fn ctrl_keys_kill_around_cursor() {
        let ctrl = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        let mut line = InputLine::new(Command::Open, "open: ", "data/ünï.csv".into());
        line.handle_key(key(KeyCode::Left));
        line.handle_key(key(KeyCode::Left));
        line.handle_key(key(KeyCode::Left));
        line.handle_key(key(KeyCode::Left));
        line.handle_key(ctrl('k'));
        assert_eq!(line.buffer, "data/ünï");
        line.handle_key(ctrl('h'));
        line.handle_key(ctrl('a'));
        line.handle_key(key(KeyCode::Right));
        line.handle_key(ctrl('u'));
        assert_eq!(line.buffer, "ata/ün");
        line.handle_key(ctrl('e'));
        typed(&mut line, "X");
        assert_eq!(line.buffer, "ata/ünX");
    }
}
