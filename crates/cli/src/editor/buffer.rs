use crate::input::Key;

/// What the editor should do after a key has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Commit(String),
    Cancel,
}

/// The text being edited, with its cursor and history position.
///
/// The cursor is a character offset and always lies within `0..=len`. The
/// history index is `None` while not browsing, or an offset from the newest
/// entry (`Some(0)` is the most recent).
#[derive(Debug, Clone)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
    insert_mode: bool,
    original: String,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl EditBuffer {
    /// Starts editing `initial` with the cursor at its end.
    ///
    /// `history` is ordered oldest first.
    pub fn new(initial: &str, history: Vec<String>) -> Self {
        let chars: Vec<char> = initial.chars().collect();
        Self {
            cursor: chars.len(),
            chars,
            insert_mode: true,
            original: initial.to_string(),
            history,
            history_index: None,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn history_index(&self) -> Option<usize> {
        self.history_index
    }

    /// Text before the cursor, the character under it, and the text after it.
    pub fn split_at_cursor(&self) -> (String, Option<char>, String) {
        let before = self.chars[..self.cursor].iter().collect();
        let at = self.chars.get(self.cursor).copied();
        let after = self
            .chars
            .get(self.cursor + 1..)
            .map(|rest| rest.iter().collect())
            .unwrap_or_default();
        (before, at, after)
    }

    /// Applies one key to the buffer.
    pub fn apply(&mut self, key: &Key) -> EditOutcome {
        match key {
            Key::Enter => return EditOutcome::Commit(self.text()),
            Key::Line(line) if line.is_empty() => return EditOutcome::Commit(self.text()),
            Key::Line(line) => {
                // A whole line replaces the text
                return EditOutcome::Commit(line.clone());
            }
            Key::Escape | Key::Ctrl('c') => return EditOutcome::Cancel,
            Key::Ctrl('d') if self.chars.is_empty() => return EditOutcome::Cancel,
            Key::Char(c) if !c.is_control() => self.insert(*c),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            Key::CtrlLeft => self.cursor = self.word_start_before(self.cursor),
            Key::CtrlRight => self.cursor = self.word_end_after(self.cursor),
            Key::Home | Key::Ctrl('a') => self.cursor = 0,
            Key::End | Key::Ctrl('e') => self.cursor = self.chars.len(),
            Key::Ctrl('u') => {
                self.chars.drain(..self.cursor);
                self.cursor = 0;
            }
            Key::Ctrl('k') => self.chars.truncate(self.cursor),
            Key::Ctrl('w') => self.delete_word_before(),
            Key::CtrlDelete => self.delete_word_after(),
            Key::Up => self.history_back(),
            Key::Down => self.history_forward(),
            Key::Insert => self.insert_mode = !self.insert_mode,
            _ => {}
        }
        EditOutcome::Continue
    }

    fn insert(&mut self, c: char) {
        if self.insert_mode || self.cursor == self.chars.len() {
            self.chars.insert(self.cursor, c);
        } else {
            self.chars[self.cursor] = c;
        }
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    fn is_space(&self, index: usize) -> bool {
        self.chars[index].is_whitespace()
    }

    /// Start of the word before `from`, skipping any whitespace in between.
    fn word_start_before(&self, from: usize) -> usize {
        let mut pos = from;
        while pos > 0 && self.is_space(pos - 1) {
            pos -= 1;
        }
        while pos > 0 && !self.is_space(pos - 1) {
            pos -= 1;
        }
        pos
    }

    /// Start of the next word after `from`.
    fn word_end_after(&self, from: usize) -> usize {
        let len = self.chars.len();
        let mut pos = from;
        while pos < len && !self.is_space(pos) {
            pos += 1;
        }
        while pos < len && self.is_space(pos) {
            pos += 1;
        }
        pos
    }

    fn delete_word_before(&mut self) {
        let start = self.word_start_before(self.cursor);
        self.chars.drain(start..self.cursor);
        self.cursor = start;
    }

    fn delete_word_after(&mut self) {
        let len = self.chars.len();
        let mut end = self.cursor;
        while end < len && self.is_space(end) {
            end += 1;
        }
        while end < len && !self.is_space(end) {
            end += 1;
        }
        self.chars.drain(self.cursor..end);
    }

    fn set_text(&mut self, text: &str) {
        self.chars = text.chars().collect();
        self.cursor = self.chars.len();
    }

    fn history_entry(&self, index: usize) -> Option<&str> {
        self.history
            .len()
            .checked_sub(index + 1)
            .and_then(|i| self.history.get(i))
            .map(String::as_str)
    }

    fn history_back(&mut self) {
        let next = self.history_index.map_or(0, |index| index + 1);
        if let Some(entry) = self.history_entry(next).map(str::to_string) {
            self.history_index = Some(next);
            self.set_text(&entry);
        }
    }

    fn history_forward(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.history_index = None;
                let original = self.original.clone();
                self.set_text(&original);
            }
            Some(index) => {
                if let Some(entry) = self.history_entry(index - 1).map(str::to_string) {
                    self.history_index = Some(index - 1);
                    self.set_text(&entry);
                }
            }
        }
    }
}
