//! Logical keys and the byte-level decoder that produces them.
//!
//! Escape sequences are resolved through [`ESCAPE_SEQUENCES`], a table from
//! the bytes following `ESC` to a named key. After an `ESC` byte the decoder
//! waits at most [`ESCAPE_LOOKAHEAD`] for each further byte; a sequence that
//! is not recognized within that window decodes as a bare [`Key::Escape`].

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use log::debug;

/// How long to wait for each byte of an escape sequence.
pub const ESCAPE_LOOKAHEAD: Duration = Duration::from_millis(50);

const ESC: u8 = 0x1b;
const MAX_SEQUENCE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    CtrlLeft,
    CtrlRight,
    CtrlDelete,
    /// Control chord with a lowercase letter or punctuation, e.g. `Ctrl('c')`.
    Ctrl(char),
    /// A whole line read in line mode, without its terminator.
    Line(String),
}

/// Bytes following `ESC`, and the key they encode.
pub static ESCAPE_SEQUENCES: &[(&[u8], Key)] = &[
    (b"[A", Key::Up),
    (b"[B", Key::Down),
    (b"[C", Key::Right),
    (b"[D", Key::Left),
    (b"OA", Key::Up),
    (b"OB", Key::Down),
    (b"OC", Key::Right),
    (b"OD", Key::Left),
    (b"[H", Key::Home),
    (b"[F", Key::End),
    (b"OH", Key::Home),
    (b"OF", Key::End),
    (b"[1~", Key::Home),
    (b"[4~", Key::End),
    (b"[7~", Key::Home),
    (b"[8~", Key::End),
    (b"[2~", Key::Insert),
    (b"[3~", Key::Delete),
    (b"[5~", Key::PageUp),
    (b"[6~", Key::PageDown),
    (b"[Z", Key::BackTab),
    (b"[1;5D", Key::CtrlLeft),
    (b"[1;5C", Key::CtrlRight),
    (b"[5D", Key::CtrlLeft),
    (b"[5C", Key::CtrlRight),
    (b"Od", Key::CtrlLeft),
    (b"Oc", Key::CtrlRight),
    (b"[3;5~", Key::CtrlDelete),
];

fn lookup(sequence: &[u8]) -> Option<Key> {
    ESCAPE_SEQUENCES
        .iter()
        .find(|(bytes, _)| *bytes == sequence)
        .map(|(_, key)| key.clone())
}

fn is_prefix(sequence: &[u8]) -> bool {
    ESCAPE_SEQUENCES
        .iter()
        .any(|(bytes, _)| bytes.len() > sequence.len() && bytes.starts_with(sequence))
}

impl Key {
    /// The bytes a terminal sends for this key.
    pub fn encode(&self) -> Vec<u8> {
        let escape = |key: &Key| {
            ESCAPE_SEQUENCES
                .iter()
                .find(|(_, k)| k == key)
                .map(|(bytes, _)| {
                    let mut encoded = vec![ESC];
                    encoded.extend_from_slice(bytes);
                    encoded
                })
                .unwrap_or_default()
        };

        match self {
            Key::Char(c) => c.to_string().into_bytes(),
            Key::Enter => vec![b'\r'],
            Key::Escape => vec![ESC],
            Key::Tab => vec![b'\t'],
            Key::Backspace => vec![0x7f],
            Key::Ctrl('/') => vec![0x1f],
            Key::Ctrl(c) => vec![(*c as u8) & 0x1f],
            Key::Line(line) => format!("{line}\n").into_bytes(),
            other => escape(other),
        }
    }
}

/// A source of raw input bytes.
pub trait ByteSource {
    /// Reads one byte, waiting at most `timeout` (forever if `None`).
    ///
    /// Returns `Ok(None)` when the timeout elapses with nothing to read.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    fn read_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>>;
}

/// Turns a stream of bytes into [`Key`]s.
pub struct KeyDecoder<S: ByteSource> {
    source: S,
    pending: VecDeque<u8>,
}

impl<S: ByteSource> KeyDecoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
        }
    }

    fn next_byte(&mut self, timeout: Option<Duration>) -> io::Result<Option<u8>> {
        match self.pending.pop_front() {
            Some(byte) => Ok(Some(byte)),
            None => self.source.read_byte(timeout),
        }
    }

    /// Decodes the next key, waiting at most `timeout` for its first byte.
    ///
    /// # Errors
    ///
    /// Returns the underlying OS error.
    pub fn read_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<Key>> {
        let Some(byte) = self.next_byte(timeout)? else {
            return Ok(None);
        };

        let key = match byte {
            ESC => self.decode_escape()?,
            b'\r' | b'\n' => Key::Enter,
            b'\t' => Key::Tab,
            0x7f | 0x08 => Key::Backspace,
            0x00 => Key::Ctrl(' '),
            0x01..=0x1a => Key::Ctrl(char::from(b'a' + byte - 1)),
            0x1c => Key::Ctrl('\\'),
            0x1d => Key::Ctrl(']'),
            0x1e => Key::Ctrl('^'),
            0x1f => Key::Ctrl('/'),
            0x80.. => self.decode_utf8(byte)?,
            _ => Key::Char(char::from(byte)),
        };

        Ok(Some(key))
    }

    fn decode_escape(&mut self) -> io::Result<Key> {
        let mut sequence: Vec<u8> = Vec::new();

        while sequence.len() < MAX_SEQUENCE_LEN {
            let Some(byte) = self.next_byte(Some(ESCAPE_LOOKAHEAD))? else {
                break;
            };
            sequence.push(byte);

            if let Some(key) = lookup(&sequence) {
                return Ok(key);
            }
            if !is_prefix(&sequence) {
                break;
            }
        }

        match sequence.first() {
            None => {}
            Some(b'[' | b'O') => {
                // Unknown control sequence: drop the rest of it
                if !ends_sequence(&sequence) {
                    self.discard_until_final_byte()?;
                }
                debug!("Unrecognized escape sequence {sequence:?}");
            }
            Some(_) => {
                // Not a sequence at all: the bytes are separate keys
                self.pending.extend(sequence);
            }
        }

        Ok(Key::Escape)
    }

    fn discard_until_final_byte(&mut self) -> io::Result<()> {
        for _ in 0..MAX_SEQUENCE_LEN {
            match self.next_byte(Some(ESCAPE_LOOKAHEAD))? {
                Some(byte) if (0x40..=0x7e).contains(&byte) => break,
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    fn decode_utf8(&mut self, first: u8) -> io::Result<Key> {
        let width = match first {
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Ok(Key::Char(char::REPLACEMENT_CHARACTER)),
        };

        let mut bytes = vec![first];
        while bytes.len() < width {
            match self.next_byte(Some(ESCAPE_LOOKAHEAD))? {
                Some(byte) if is_continuation(byte) => bytes.push(byte),
                Some(byte) => {
                    // Starts the next key
                    self.pending.push_front(byte);
                    break;
                }
                None => break,
            }
        }

        let decoded = std::str::from_utf8(&bytes)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        Ok(Key::Char(decoded))
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xc0 == 0x80
}

fn ends_sequence(sequence: &[u8]) -> bool {
    sequence.len() > 1
        && sequence
            .last()
            .is_some_and(|byte| (0x40..=0x7e).contains(byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bytes already waiting in the input, nothing more ever arrives.
    struct Buffered(VecDeque<u8>);

    impl Buffered {
        fn new(bytes: &[u8]) -> Self {
            Self(bytes.iter().copied().collect())
        }
    }

    impl ByteSource for Buffered {
        fn read_byte(&mut self, _timeout: Option<Duration>) -> io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }
    }

    fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut decoder = KeyDecoder::new(Buffered::new(bytes));
        let mut keys = Vec::new();
        while let Some(key) = decoder.read_key(Some(Duration::ZERO)).unwrap() {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn test_round_trip_zero_timeout_and_blocking() {
        for key in [
            Key::Up,
            Key::Down,
            Key::Left,
            Key::Right,
            Key::Home,
            Key::End,
            Key::PageUp,
            Key::PageDown,
            Key::Delete,
            Key::Insert,
            Key::CtrlLeft,
            Key::CtrlRight,
            Key::CtrlDelete,
            Key::BackTab,
        ] {
            let encoded = key.encode();
            assert_eq!(encoded[0], ESC, "{key:?}");

            let mut decoder = KeyDecoder::new(Buffered::new(&encoded));
            assert_eq!(decoder.read_key(Some(Duration::ZERO)).unwrap(), Some(key.clone()));

            let mut decoder = KeyDecoder::new(Buffered::new(&encoded));
            assert_eq!(decoder.read_key(None).unwrap(), Some(key.clone()));
        }
    }

    #[test]
    fn test_up_arrow_bytes() {
        assert_eq!(Key::Up.encode(), vec![0x1b, b'[', b'A']);
        assert_eq!(decode_all(b"\x1b[A"), vec![Key::Up]);
        assert_eq!(decode_all(b"\x1bOA"), vec![Key::Up]);
    }

    #[test]
    fn test_bare_escape() {
        assert_eq!(decode_all(b"\x1b"), vec![Key::Escape]);
    }

    #[test]
    fn test_escape_followed_by_plain_key_keeps_the_key() {
        assert_eq!(decode_all(b"\x1bx"), vec![Key::Escape, Key::Char('x')]);
        assert_eq!(decode_all(b"\x1b\x1b"), vec![Key::Escape, Key::Escape]);
    }

    #[test]
    fn test_unknown_sequence_is_escape_and_swallowed() {
        // F5 is not in the table
        assert_eq!(
            decode_all(b"\x1b[15~a"),
            vec![Key::Escape, Key::Char('a')]
        );
        assert_eq!(decode_all(b"\x1bOPb"), vec![Key::Escape, Key::Char('b')]);
    }

    #[test]
    fn test_truncated_sequence_is_escape() {
        assert_eq!(decode_all(b"\x1b[1;5"), vec![Key::Escape]);
    }

    #[test]
    fn test_control_bytes() {
        assert_eq!(
            decode_all(b"\r\n\t\x7f\x08\x01\x03\x05\x15\x0b\x17\x1f"),
            vec![
                Key::Enter,
                Key::Enter,
                Key::Tab,
                Key::Backspace,
                Key::Backspace,
                Key::Ctrl('a'),
                Key::Ctrl('c'),
                Key::Ctrl('e'),
                Key::Ctrl('u'),
                Key::Ctrl('k'),
                Key::Ctrl('w'),
                Key::Ctrl('/'),
            ]
        );
    }

    #[test]
    fn test_ctrl_encode_round_trip() {
        for c in ['a', 'c', 'u', 'w', '/'] {
            assert_eq!(decode_all(&Key::Ctrl(c).encode()), vec![Key::Ctrl(c)]);
        }
    }

    #[test]
    fn test_utf8_characters() {
        assert_eq!(
            decode_all("é€🦀".as_bytes()),
            vec![Key::Char('é'), Key::Char('€'), Key::Char('🦀')]
        );
    }

    #[test]
    fn test_broken_utf8_is_replacement() {
        assert_eq!(
            decode_all(&[0xe2, 0x82]),
            vec![Key::Char(char::REPLACEMENT_CHARACTER)]
        );
    }

    #[test]
    fn test_broken_utf8_keeps_the_next_key() {
        assert_eq!(
            decode_all(&[0xe2, b'a', 0xc3, 0xa9]),
            vec![
                Key::Char(char::REPLACEMENT_CHARACTER),
                Key::Char('a'),
                Key::Char('é')
            ]
        );
        assert_eq!(
            decode_all(&[0xe2, 0x82, 0x1b, b'[', b'A']),
            vec![Key::Char(char::REPLACEMENT_CHARACTER), Key::Up]
        );
        assert_eq!(
            decode_all(&[0xf0, b'\r']),
            vec![Key::Char(char::REPLACEMENT_CHARACTER), Key::Enter]
        );
    }

    #[test]
    fn test_empty_input() {
        let mut decoder = KeyDecoder::new(Buffered::new(b""));
        assert_eq!(decoder.read_key(Some(Duration::ZERO)).unwrap(), None);
    }
}
