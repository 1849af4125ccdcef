use std::io::{self, BufRead, IsTerminal};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, warn};

use super::keys::Key;
#[cfg(unix)]
use super::keys::KeyDecoder;
#[cfg(unix)]
use super::posix::StdinBytes;
use super::KeySource;
use crate::terminal::RawModeGuard;

enum Backend {
    /// Raw bytes from stdin through the escape-sequence decoder.
    #[cfg(unix)]
    Raw(KeyDecoder<StdinBytes>),
    /// Console key events, for platforms without termios.
    #[cfg_attr(unix, allow(dead_code))]
    Console,
    /// Whole lines, when stdin is not a terminal or raw mode is unavailable.
    Line,
}

/// Reads one logical key at a time from the controlling terminal.
///
/// Opening a reader switches the terminal to raw mode; dropping it restores
/// the previous mode on every exit path. Read failures are reported as `None`.
pub struct KeyReader {
    backend: Backend,
    _guard: Option<RawModeGuard>,
}

impl KeyReader {
    pub fn open() -> Self {
        if !io::stdin().is_terminal() {
            debug!("Standard input is not a terminal, reading whole lines");
            return Self::line_mode();
        }

        match RawModeGuard::acquire() {
            Ok(guard) => Self {
                backend: Self::raw_backend(),
                _guard: Some(guard),
            },
            Err(e) => {
                warn!("Could not enable raw mode, falling back to line input: {e}");
                Self::line_mode()
            }
        }
    }

    /// A reader that always reads whole lines and never touches terminal modes.
    pub fn line_mode() -> Self {
        Self {
            backend: Backend::Line,
            _guard: None,
        }
    }

    #[cfg(unix)]
    fn raw_backend() -> Backend {
        Backend::Raw(KeyDecoder::new(StdinBytes))
    }

    #[cfg(not(unix))]
    fn raw_backend() -> Backend {
        Backend::Console
    }

    pub fn is_line_mode(&self) -> bool {
        matches!(self.backend, Backend::Line)
    }

    fn read_line() -> io::Result<Key> {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            // End of input cancels whatever is waiting for a key
            return Ok(Key::Escape);
        }
        Ok(Key::Line(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn read_console(timeout: Option<Duration>) -> io::Result<Option<Key>> {
        loop {
            if let Some(timeout) = timeout {
                if !event::poll(timeout)? {
                    return Ok(None);
                }
            }
            if let Event::Key(key_event) = event::read()? {
                if let Some(key) = key_from_event(key_event) {
                    return Ok(Some(key));
                }
            }
            if timeout.is_some() {
                return Ok(None);
            }
        }
    }
}

impl KeySource for KeyReader {
    fn read_key(&mut self, timeout: Option<Duration>) -> Option<Key> {
        let result = match &mut self.backend {
            #[cfg(unix)]
            Backend::Raw(decoder) => decoder.read_key(timeout),
            Backend::Console => Self::read_console(timeout),
            // Line reads cannot time out
            Backend::Line => Self::read_line().map(Some),
        };

        match result {
            Ok(key) => key,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Some(Key::Escape),
            Err(e) => {
                warn!("Key read failed: {e}");
                None
            }
        }
    }

    fn is_line_mode(&self) -> bool {
        KeyReader::is_line_mode(self)
    }
}

/// Maps a console key event to a [`Key`]; releases and unknown keys map to `None`.
pub fn key_from_event(event: KeyEvent) -> Option<Key> {
    if event.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    Some(match event.code {
        KeyCode::Char(c) if ctrl => match c {
            '7' | '_' => Key::Ctrl('/'),
            c => Key::Ctrl(c.to_ascii_lowercase()),
        },
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::BackTab => Key::BackTab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete if ctrl => Key::CtrlDelete,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left if ctrl => Key::CtrlLeft,
        KeyCode::Left => Key::Left,
        KeyCode::Right if ctrl => Key::CtrlRight,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        _ => return None,
    })
}
