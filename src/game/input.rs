//! The active input line: editing, history recall and tab completion

use super::command::Command;
use crate::data::file_names;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    buffer: String,
    /// Cursor position in chars
    cursor: usize,
    /// What was typed before history recall started
    stash: String,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(self.buffer.len())
    }

    /// Replace the contents, cursor at the end
    pub fn set(&mut self, value: &str) {
        self.buffer = value.to_string();
        self.cursor = self.buffer.chars().count();
    }

    /// Empty the line and forget the recall stash
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.stash.clear();
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.buffer.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_offset(self.cursor);
        self.buffer.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.buffer.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Step back through history. `index == history.len()` means "not recalling".
    pub fn recall_previous(&mut self, history: &[String], index: &mut usize) {
        if *index >= history.len() {
            *index = history.len();
            self.stash = self.buffer.clone();
        }
        if *index > 0 {
            *index -= 1;
            let entry = history[*index].clone();
            self.set(&entry);
        }
    }

    /// Step forward; past the newest entry restores the stashed line
    pub fn recall_next(&mut self, history: &[String], index: &mut usize) {
        if *index < history.len() {
            *index += 1;
            let entry = match history.get(*index) {
                Some(entry) => entry.clone(),
                None => self.stash.clone(),
            };
            self.set(&entry);
        }
    }

    /// Complete the last word against commands or the visible files.
    /// Returns true if the line changed.
    pub fn complete(&mut self, rebellion_mode: bool) -> bool {
        let trimmed = self.buffer.trim();
        let parts: Vec<&str> = trimmed.split(' ').collect();
        let Some(last) = parts.last() else {
            return false;
        };
        let partial = last.to_lowercase();
        if partial.is_empty() {
            return false;
        }

        let found = if parts.len() == 1 {
            Command::NAMES.iter().copied().find(|c| c.starts_with(&partial))
        } else {
            file_names(rebellion_mode)
                .into_iter()
                .find(|f| f.starts_with(&partial))
        };
        let Some(found) = found else {
            return false;
        };

        let before = parts[..parts.len() - 1].join(" ");
        let completed = if before.is_empty() {
            format!("{} ", found)
        } else {
            format!("{} {} ", before, found)
        };
        let changed = completed != self.buffer;
        self.set(&completed);
        changed
    }
}
