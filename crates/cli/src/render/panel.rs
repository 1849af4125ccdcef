use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::colors::ColorScheme;
use crate::terminal::TerminalCapabilities;

/// Panels never grow beyond this many columns.
pub const MAX_PANEL_WIDTH: usize = 80;
const MIN_PANEL_WIDTH: usize = 12;

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])")
        .unwrap_or_else(|e| panic!("bad ANSI pattern: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    Normal,
    Rounded,
    Double,
}

struct Glyphs {
    top_left: &'static str,
    top_right: &'static str,
    bottom_left: &'static str,
    bottom_right: &'static str,
    horizontal: &'static str,
    vertical: &'static str,
    ellipsis: &'static str,
}

const ASCII: Glyphs = Glyphs {
    top_left: "+",
    top_right: "+",
    bottom_left: "+",
    bottom_right: "+",
    horizontal: "-",
    vertical: "|",
    ellipsis: "...",
};

impl BorderStyle {
    fn glyphs(self, unicode: bool) -> Glyphs {
        if !unicode {
            return ASCII;
        }
        match self {
            BorderStyle::Normal => Glyphs {
                top_left: "┌",
                top_right: "┐",
                bottom_left: "└",
                bottom_right: "┘",
                horizontal: "─",
                vertical: "│",
                ellipsis: "…",
            },
            BorderStyle::Rounded => Glyphs {
                top_left: "╭",
                top_right: "╮",
                bottom_left: "╰",
                bottom_right: "╯",
                horizontal: "─",
                vertical: "│",
                ellipsis: "…",
            },
            BorderStyle::Double => Glyphs {
                top_left: "╔",
                top_right: "╗",
                bottom_left: "╚",
                bottom_right: "╝",
                horizontal: "═",
                vertical: "║",
                ellipsis: "…",
            },
        }
    }
}

/// Removes ANSI escape sequences from `text`.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Columns `text` occupies on screen, ignoring ANSI escape sequences.
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text).width()
}

/// Cuts plain `text` so that it, followed by `ellipsis`, fits in `max` columns.
fn truncate(text: &str, max: usize, ellipsis: &str) -> String {
    let budget = max.saturating_sub(ellipsis.width());
    let mut used = 0;
    let mut truncated = String::new();
    for c in text.chars() {
        let width = c.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        truncated.push(c);
    }
    truncated.push_str(ellipsis);
    truncated
}

/// Draws bordered, titled blocks of text sized to the terminal.
#[derive(Debug, Clone)]
pub struct PanelRenderer {
    unicode: bool,
    colors: ColorScheme,
    default_width: usize,
}

impl PanelRenderer {
    pub fn new(capabilities: &TerminalCapabilities, colors: ColorScheme) -> Self {
        let default_width = usize::from(capabilities.width)
            .saturating_sub(4)
            .clamp(MIN_PANEL_WIDTH, MAX_PANEL_WIDTH);
        Self {
            unicode: capabilities.unicode,
            colors,
            default_width,
        }
    }

    pub fn default_width(&self) -> usize {
        self.default_width
    }

    /// Renders `content` inside a border of `style`, with `title` embedded in
    /// the top edge.
    ///
    /// Every returned line is exactly `width` columns wide once ANSI sequences
    /// are stripped. Lines too long for the interior are cut and end in an
    /// ellipsis; a cut line loses its colors.
    pub fn draw(
        &self,
        content: &[String],
        title: &str,
        width: Option<usize>,
        style: BorderStyle,
    ) -> Vec<String> {
        let glyphs = style.glyphs(self.unicode);
        let width = width.unwrap_or(self.default_width).max(MIN_PANEL_WIDTH);
        let interior = width - 4;
        let border = |text: &str| self.colors.primary(text);

        let mut lines = Vec::with_capacity(content.len() + 2);

        let top = if title.is_empty() {
            format!(
                "{}{}{}",
                glyphs.top_left,
                glyphs.horizontal.repeat(width - 2),
                glyphs.top_right
            )
        } else {
            let title_room = width - 6;
            let title = if title.width() > title_room {
                truncate(title, title_room, glyphs.ellipsis)
            } else {
                title.to_string()
            };
            let used = title.width() + 4;
            format!(
                "{}{} {} {}{}{}",
                glyphs.top_left,
                glyphs.horizontal,
                title,
                glyphs.horizontal,
                glyphs.horizontal.repeat(width - 2 - used),
                glyphs.top_right
            )
        };
        lines.push(border(&top));

        for line in content {
            let display = if visible_width(line) > interior {
                truncate(&strip_ansi(line), interior, glyphs.ellipsis)
            } else {
                line.clone()
            };
            let padding = interior.saturating_sub(visible_width(&display));
            lines.push(format!(
                "{} {}{} {}",
                border(glyphs.vertical),
                display,
                " ".repeat(padding),
                border(glyphs.vertical)
            ));
        }

        let bottom = format!(
            "{}{}{}",
            glyphs.bottom_left,
            glyphs.horizontal.repeat(width - 2),
            glyphs.bottom_right
        );
        lines.push(border(&bottom));

        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(unicode: bool, color: bool) -> PanelRenderer {
        let mut caps = TerminalCapabilities::conservative();
        caps.width = 100;
        caps.unicode = unicode;
        caps.color = color;
        PanelRenderer::new(&caps, ColorScheme::new(color))
    }

    #[test]
    fn test_default_width_is_capped() {
        assert_eq!(renderer(true, false).default_width(), 80);

        let mut caps = TerminalCapabilities::conservative();
        caps.width = 50;
        assert_eq!(
            PanelRenderer::new(&caps, ColorScheme::new(false)).default_width(),
            46
        );
    }

    #[test]
    fn test_every_line_has_requested_width() {
        for (unicode, color) in [(true, true), (true, false), (false, true), (false, false)] {
            let colors = ColorScheme::new(color);
            let content = vec![
                colors.danger("rm -rf /var/log/old"),
                String::new(),
                "plain text".to_string(),
                "🦀 wide".to_string(),
            ];
            for style in [BorderStyle::Normal, BorderStyle::Rounded, BorderStyle::Double] {
                for line in renderer(unicode, color).draw(&content, "Title", Some(40), style) {
                    assert_eq!(visible_width(&line), 40, "{line:?}");
                }
            }
        }
    }

    #[test]
    fn test_title_in_top_border() {
        let lines = renderer(true, false).draw(&["x".to_string()], "Help", Some(20), BorderStyle::Normal);
        assert_eq!(lines[0], "┌─ Help ───────────┐");
        assert_eq!(lines[1], "│ x                │");
        assert_eq!(lines[2], "└──────────────────┘");
    }

    #[test]
    fn test_ascii_fallback() {
        let lines = renderer(false, false).draw(&["x".to_string()], "Help", Some(20), BorderStyle::Double);
        assert_eq!(lines[0], "+- Help -----------+");
        assert_eq!(lines[1], "| x                |");
        assert_eq!(lines[2], "+------------------+");
    }

    #[test]
    fn test_long_line_is_truncated_with_ellipsis() {
        let colors = ColorScheme::new(true);
        let long = colors.command(&"a".repeat(50));
        let lines = renderer(true, true).draw(&[long], "", Some(20), BorderStyle::Rounded);
        let plain = strip_ansi(&lines[1]).into_owned();
        assert_eq!(plain, format!("│ {}… │", "a".repeat(15)));

        let lines = renderer(false, false).draw(&["b".repeat(50)], "", Some(20), BorderStyle::Normal);
        assert_eq!(lines[1], format!("| {}... |", "b".repeat(13)));
    }

    #[test]
    fn test_visible_width_ignores_ansi() {
        assert_eq!(visible_width("\x1b[38;5;9mrm\x1b[39m"), 2);
        assert_eq!(visible_width("plain"), 5);
    }
}
