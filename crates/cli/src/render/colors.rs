use crossterm::style::{style, Color, Stylize};

/// Named color classes used across the interface.
///
/// When color is unsupported every class returns its text unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    enabled: bool,
}

impl ColorScheme {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn paint(&self, text: &str, foreground: Color, background: Option<Color>) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match background {
            Some(background) => style(text).with(foreground).on(background).to_string(),
            None => style(text).with(foreground).to_string(),
        }
    }

    pub fn primary(&self, text: &str) -> String {
        self.paint(text, Color::DarkCyan, None)
    }

    pub fn secondary(&self, text: &str) -> String {
        self.paint(text, Color::DarkYellow, None)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(text, Color::DarkGreen, None)
    }

    pub fn warning(&self, text: &str) -> String {
        self.paint(text, Color::Yellow, None)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(text, Color::DarkRed, None)
    }

    pub fn danger(&self, text: &str) -> String {
        self.paint(text, Color::Red, None)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(text, Color::DarkGrey, None)
    }

    pub fn highlight(&self, text: &str) -> String {
        self.paint(text, Color::White, Some(Color::DarkBlue))
    }

    /// The character under the cursor while the editor overwrites.
    pub fn overwrite(&self, text: &str) -> String {
        self.paint(text, Color::Black, Some(Color::DarkYellow))
    }

    pub fn command(&self, text: &str) -> String {
        self.paint(text, Color::Cyan, None)
    }

    pub fn info(&self, text: &str) -> String {
        self.paint(text, Color::Blue, None)
    }
}
