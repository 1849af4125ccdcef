//! Single-line command editor.
//!
//! # Key Features
//!
//! - Insert and overwrite modes, toggled with Insert
//! - Word-wise movement and deletion (Ctrl+Left/Right, Ctrl+W, Ctrl+Delete)
//! - Line kills with Ctrl+U and Ctrl+K
//! - History browsing with Up/Down
//! - Token-wise syntax highlighting of the buffer

pub mod buffer;
pub mod highlight;

use std::io::Write;

use cli_ai_core::error::Result;
use crossterm::cursor::MoveLeft;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use log::debug;
use unicode_width::UnicodeWidthStr;

use crate::input::{KeySource, MAX_IDLE_READS};
use crate::render::{visible_width, ColorScheme};
use crate::terminal::TerminalCapabilities;
use buffer::{EditBuffer, EditOutcome};
pub use highlight::Highlighter;

/// Edits a command in place on the current terminal line.
#[derive(Debug, Clone)]
pub struct LineEditor {
    unicode: bool,
    colors: ColorScheme,
    highlighter: Highlighter,
}

impl LineEditor {
    pub fn new(
        capabilities: &TerminalCapabilities,
        colors: ColorScheme,
        highlighting: bool,
    ) -> Self {
        Self {
            unicode: capabilities.unicode,
            colors,
            highlighter: Highlighter::new(colors, highlighting),
        }
    }

    fn prompt(&self) -> String {
        self.colors.primary(if self.unicode { "❯ " } else { "> " })
    }

    fn end_cursor(&self, insert_mode: bool) -> String {
        match (insert_mode, self.unicode) {
            (true, true) => self.colors.muted("█"),
            (true, false) => self.colors.muted("|"),
            (false, true) => self.colors.warning("▄"),
            (false, false) => self.colors.warning("_"),
        }
    }

    /// The prompt and highlighted buffer, and how many columns the terminal
    /// cursor must move left from the end of that text to sit on the edit cursor.
    fn render_line(&self, buffer: &EditBuffer) -> (String, u16) {
        let (head, _, _) = buffer.split_at_cursor();
        let (before, under, after) = self.highlighter.highlight_around(&buffer.text(), head.len());
        match under {
            Some(under) => {
                let under = under.to_string();
                let cursor = if buffer.is_insert_mode() {
                    self.colors.highlight(&under)
                } else {
                    self.colors.overwrite(&under)
                };
                let back = under.width() + visible_width(&after);
                let line = format!("{}{before}{cursor}{after}", self.prompt());
                (line, u16::try_from(back).unwrap_or(u16::MAX))
            }
            None => {
                let line = format!(
                    "{}{before}{}",
                    self.prompt(),
                    self.end_cursor(buffer.is_insert_mode())
                );
                (line, 1)
            }
        }
    }

    fn draw(&self, buffer: &EditBuffer, out: &mut dyn Write) -> Result<()> {
        let (line, back) = self.render_line(buffer);
        write!(out, "\r")?;
        out.queue(Clear(ClearType::CurrentLine))?;
        write!(out, "{line}")?;
        if back > 0 {
            out.queue(MoveLeft(back))?;
        }
        out.flush()?;
        Ok(())
    }

    /// Runs an editing session starting from `initial`.
    ///
    /// Returns the committed text, or `None` when the user cancelled.
    /// `history` is ordered oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn edit(
        &self,
        initial: &str,
        history: Vec<String>,
        keys: &mut dyn KeySource,
        out: &mut dyn Write,
    ) -> Result<Option<String>> {
        let mut buffer = EditBuffer::new(initial, history);
        let line_mode = keys.is_line_mode();
        let mut idle_reads = 0;

        if line_mode {
            write!(
                out,
                "{}\r\n{}",
                self.colors
                    .muted("Type the new command, or press Enter to keep the current one:"),
                self.render_line(&buffer).0
            )?;
            write!(out, "\r\n")?;
            out.flush()?;
        }

        loop {
            if !line_mode {
                self.draw(&buffer, out)?;
            }

            let Some(key) = keys.read_key(None) else {
                idle_reads += 1;
                if idle_reads >= MAX_IDLE_READS {
                    debug!("No input arrived, leaving the editor");
                    write!(out, "\r\n")?;
                    return Ok(None);
                }
                continue;
            };
            idle_reads = 0;

            match buffer.apply(&key) {
                EditOutcome::Continue => {}
                EditOutcome::Commit(text) => {
                    write!(out, "\r\n")?;
                    out.flush()?;
                    return Ok(Some(text));
                }
                EditOutcome::Cancel => {
                    write!(out, "\r\n")?;
                    out.flush()?;
                    return Ok(None);
                }
            }
        }
    }
}
