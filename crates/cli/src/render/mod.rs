//! Colors and bordered panels.

pub mod colors;
pub mod panel;

use std::io::{self, Write};

pub use colors::ColorScheme;
pub use panel::{visible_width, BorderStyle, PanelRenderer};

/// Writes each line followed by `\r\n`, which moves to column zero in raw mode too.
pub fn write_lines(out: &mut dyn Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        write!(out, "{line}\r\n")?;
    }
    out.flush()
}
