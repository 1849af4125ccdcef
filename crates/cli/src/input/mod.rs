//! Keyboard input.
//!
//! # Key Features
//!
//! - Escape-sequence decoding through a lookup table with bounded lookahead
//! - Raw mode held by a guard for the lifetime of a [`KeyReader`]
//! - Whole-line fallback when standard input is not a terminal
//! - [`KeyScript`] for replaying a fixed sequence of keys

pub mod keys;
#[cfg(unix)]
mod posix;
pub mod reader;

use std::collections::VecDeque;
use std::time::Duration;

pub use keys::Key;
pub use reader::KeyReader;

/// Consecutive empty reads after which an interactive loop gives up waiting.
pub const MAX_IDLE_READS: usize = 50;

/// Anything the review interface and editor can read keys from.
pub trait KeySource {
    /// Waits at most `timeout` (forever if `None`) for the next key.
    ///
    /// `None` means no key is available; it is never an error.
    fn read_key(&mut self, timeout: Option<Duration>) -> Option<Key>;

    /// Whether keys arrive as whole lines rather than single keystrokes.
    fn is_line_mode(&self) -> bool {
        false
    }
}

/// Replays a fixed sequence of keys, then reports `None` forever.
#[derive(Debug, Clone, Default)]
pub struct KeyScript {
    keys: VecDeque<Key>,
}

impl KeyScript {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Keys for each character of `text`.
    pub fn typing(text: &str) -> impl Iterator<Item = Key> + '_ {
        text.chars().map(Key::Char)
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for KeyScript {
    fn read_key(&mut self, _timeout: Option<Duration>) -> Option<Key> {
        self.keys.pop_front()
    }
}

impl<S: KeySource + ?Sized> KeySource for &mut S {
    fn read_key(&mut self, timeout: Option<Duration>) -> Option<Key> {
        (**self).read_key(timeout)
    }

    fn is_line_mode(&self) -> bool {
        (**self).is_line_mode()
    }
}
