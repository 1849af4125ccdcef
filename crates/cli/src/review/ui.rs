use std::io::Write;
use std::thread;
use std::time::Duration;

use cli_ai_core::clipboard::Clipboard;
use cli_ai_core::config::Settings;
use cli_ai_core::error::Result;
use cli_ai_core::risk::{self, RiskLevel};
use cli_ai_core::suggestion::CommandSuggestion;
use log::{debug, info};

use super::types::{Gesture, ReviewAction, ReviewState};
use crate::editor::{Highlighter, LineEditor};
use crate::input::{Key, KeySource, MAX_IDLE_READS};
use crate::render::{visible_width, write_lines, BorderStyle, ColorScheme, PanelRenderer};
use crate::terminal::TerminalCapabilities;

const NOTICE_DELAY: Duration = Duration::from_secs(1);
const KEY_COLUMN_WIDTH: usize = 20;

/// Shows a suggested command and turns single keypresses into actions.
pub struct ReviewInterface<'a> {
    unicode: bool,
    colors: ColorScheme,
    panels: PanelRenderer,
    highlighter: Highlighter,
    editor: LineEditor,
    clipboard: &'a dyn Clipboard,
    show_explanations: bool,
    notice_delay: Duration,
}

impl<'a> ReviewInterface<'a> {
    pub fn new(
        capabilities: &TerminalCapabilities,
        settings: &Settings,
        clipboard: &'a dyn Clipboard,
    ) -> Self {
        let colors = ColorScheme::new(capabilities.color);
        Self {
            unicode: capabilities.unicode,
            colors,
            panels: PanelRenderer::new(capabilities, colors),
            highlighter: Highlighter::new(colors, settings.enable_syntax_highlighting),
            editor: LineEditor::new(capabilities, colors, settings.enable_syntax_highlighting),
            clipboard,
            show_explanations: settings.show_explanations,
            notice_delay: NOTICE_DELAY,
        }
    }

    /// How long transient notices stay on screen before the panel is redrawn.
    #[must_use]
    pub fn with_notice_delay(mut self, notice_delay: Duration) -> Self {
        self.notice_delay = notice_delay;
        self
    }

    fn glyph<'g>(&self, unicode: &'g str, ascii: &'g str) -> &'g str {
        if self.unicode {
            unicode
        } else {
            ascii
        }
    }

    fn highlighted_command(&self, command: &str) -> String {
        let highlighted = self.highlighter.highlight(command);
        if highlighted == command {
            self.colors.command(command)
        } else {
            highlighted
        }
    }

    fn risk_banner(&self, level: RiskLevel) -> Option<String> {
        let warning = self.glyph("⚠ ", "WARNING: ");
        match level {
            RiskLevel::High => Some(self.colors.danger(&format!(
                "{warning} HIGH RISK - This command may cause data loss"
            ))),
            RiskLevel::Medium => Some(
                self.colors
                    .warning(&format!("{warning} MEDIUM RISK - Use with caution")),
            ),
            RiskLevel::Low => None,
        }
    }

    /// Lines of the main suggestion panel, with the banner for the recorded
    /// risk level (assessed here when the suggestion has none yet).
    pub fn suggestion_panel(&self, suggestion: &CommandSuggestion) -> Vec<String> {
        let level = suggestion
            .risk_level()
            .unwrap_or_else(|| risk::assess(suggestion.command()).0);
        let mut content = vec![self.highlighted_command(suggestion.command())];

        if self.show_explanations {
            content.push(String::new());
            if suggestion.explanation().trim().is_empty() {
                content.extend(explain_locally(suggestion.command(), self.unicode));
            } else {
                content.extend(suggestion.explanation().lines().map(str::to_string));
            }
        }

        if let Some(banner) = self.risk_banner(level) {
            content.push(String::new());
            content.push(banner);
        }

        if !suggestion.context_hints().is_empty() {
            content.push(String::new());
            let tip = self.glyph("💡 ", "TIP: ");
            content.extend(
                suggestion
                    .context_hints()
                    .iter()
                    .map(|hint| format!("{tip}{hint}")),
            );
        }

        self.panels
            .draw(&content, "AI Command Suggestion", None, BorderStyle::Normal)
    }

    fn control_line(&self, key: String, action: &str) -> String {
        let padding = KEY_COLUMN_WIDTH.saturating_sub(visible_width(&key));
        format!("  {key}{} {action}", " ".repeat(padding))
    }

    /// Lines of the panel listing the available gestures.
    pub fn controls_panel(&self, suggestion: &CommandSuggestion) -> Vec<String> {
        let c = &self.colors;
        let mut content = vec![c.secondary("Quick Actions:")];
        let execute = if suggestion.is_destructive() {
            "Execute (modifies or deletes data)"
        } else if suggestion.requires_sudo() {
            "Execute (as administrator)"
        } else {
            "Execute"
        };
        content.push(self.control_line(c.success(self.glyph("↵ Enter", "Enter")), execute));
        content.push(self.control_line(
            c.primary(self.glyph("⇥ Tab", "Tab")),
            "Accept (paste to CLI)",
        ));
        content.push(self.control_line(c.secondary("Ctrl+C"), "Copy to Clipboard"));
        content.push(self.control_line(c.primary("Ctrl+E"), "Edit Command"));

        if !suggestion.alternatives().is_empty() {
            content.push(String::new());
            content.push(c.secondary("Options:"));
            content.push(self.control_line(c.primary("Ctrl+A"), "Show Alternatives"));
        }

        content.push(String::new());
        content.push(c.secondary("Exit:"));
        content.push(self.control_line(c.muted(self.glyph("✗ Esc", "Esc")), "Cancel"));
        content.push(self.control_line(c.info("? Help"), "Show Help"));

        self.panels
            .draw(&content, "Command Controls", None, BorderStyle::Rounded)
    }

    pub fn help_panel(&self) -> Vec<String> {
        let content: Vec<String> = [
            "Gesture Commands:",
            "",
            "Enter       - Execute command immediately",
            "Tab         - Accept command and paste to CLI if focused",
            "Ctrl + C    - Copy command to clipboard",
            "Ctrl + A    - Show alternative commands",
            "Ctrl + E    - Edit command",
            "Esc         - Cancel and exit",
            "?           - Show help",
        ]
        .iter()
        .map(|line| (*line).to_string())
        .collect();

        self.panels.draw(&content, "Help", None, BorderStyle::Double)
    }

    fn notice(&self, out: &mut dyn Write, text: &str) -> Result<()> {
        write!(out, "\r\n{text}\r\n")?;
        out.flush()?;
        if !self.notice_delay.is_zero() {
            thread::sleep(self.notice_delay);
        }
        Ok(())
    }

    fn display(
        &self,
        suggestion: &mut CommandSuggestion,
        line_mode: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        let level = suggestion.assess();
        debug!("Reviewing {:?} at {level} risk", suggestion.command());

        write!(out, "\r\n")?;
        write_lines(out, &self.suggestion_panel(suggestion))?;
        write!(out, "\r\n")?;
        write_lines(out, &self.controls_panel(suggestion))?;

        if line_mode {
            write!(
                out,
                "{}\r\n",
                self.colors.muted(
                    "Type a choice and press Enter (Enter alone executes): accept, copy, alt, edit, help, q"
                )
            )?;
        }
        out.flush()?;
        Ok(())
    }

    fn read_gesture(&self, keys: &mut dyn KeySource) -> Option<Gesture> {
        let mut idle_reads = 0;
        while idle_reads < MAX_IDLE_READS {
            match keys.read_key(None) {
                Some(key) => {
                    if let Some(gesture) = Gesture::from_key(&key) {
                        return Some(gesture);
                    }
                    debug!("Ignoring key {key:?}");
                    idle_reads = 0;
                }
                None => idle_reads += 1,
            }
        }
        None
    }

    fn copy(&self, command: &str, out: &mut dyn Write) -> Result<()> {
        if self.clipboard.copy(command) {
            info!("Command copied to clipboard");
            let done = format!("{}Command copied to clipboard", self.glyph("✓ ", ""));
            return self.notice(out, &self.colors.success(&done));
        }

        let diagnostics = self.clipboard.diagnostics();
        let failed = format!("{}Could not copy to clipboard", self.glyph("⚠ ", "WARNING: "));
        write!(out, "\r\n{}\r\n", self.colors.warning(&failed))?;
        for issue in &diagnostics.issues {
            write!(out, "{}\r\n", self.colors.muted(&format!("  {issue}")))?;
        }
        let shown = format!("{} {}", self.colors.muted("Command:"), self.colors.command(command));
        self.notice(out, &shown)
    }

    /// Runs the alternatives sub-loop; the chosen command, or `None` to go back.
    fn choose_alternative(
        &self,
        alternatives: &[String],
        keys: &mut dyn KeySource,
        out: &mut dyn Write,
    ) -> Result<Option<String>> {
        write!(out, "\r\n{}\r\n", self.colors.secondary("Alternative Commands:"))?;
        for (i, alternative) in alternatives.iter().enumerate() {
            write!(
                out,
                "{}. {}\r\n",
                self.colors.primary(&(i + 1).to_string()),
                self.highlighted_command(alternative)
            )?;
        }
        write!(
            out,
            "\r\n{}\r\n",
            self.colors
                .muted("Enter number to select, or press Enter to go back")
        )?;
        out.flush()?;

        let pick = |selection: &str| {
            selection
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| alternatives.get(i))
                .cloned()
        };

        let mut selection = String::new();
        let mut idle_reads = 0;
        while idle_reads < MAX_IDLE_READS {
            let Some(key) = keys.read_key(None) else {
                idle_reads += 1;
                continue;
            };
            idle_reads = 0;

            match key {
                Key::Enter => return Ok(pick(&selection)),
                Key::Line(line) => return Ok(pick(&line)),
                Key::Escape | Key::Ctrl('c') => return Ok(None),
                Key::Char(c) if c.is_ascii_digit() => {
                    selection = c.to_string();
                    write!(out, "\r{} {selection}", self.colors.primary("Selected:"))?;
                    out.flush()?;
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn show_help(&self, keys: &mut dyn KeySource, out: &mut dyn Write) -> Result<()> {
        write!(out, "\r\n")?;
        write_lines(out, &self.help_panel())?;
        write!(
            out,
            "\r\n{}\r\n",
            self.colors.muted("Press any key to continue...")
        )?;
        out.flush()?;

        for _ in 0..MAX_IDLE_READS {
            if keys.read_key(None).is_some() {
                break;
            }
        }
        Ok(())
    }

    /// Reviews `suggestion` until the user executes, accepts or cancels it.
    ///
    /// Picking an alternative or editing replaces the suggestion's command.
    /// Returns `None` when the review was cancelled. `history` holds previous
    /// commands, oldest first, for browsing while editing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn process(
        &self,
        suggestion: &mut CommandSuggestion,
        keys: &mut dyn KeySource,
        history: &[String],
        out: &mut dyn Write,
    ) -> Result<Option<ReviewAction>> {
        let line_mode = keys.is_line_mode();
        let mut state = ReviewState::Displaying;

        loop {
            state = match state {
                ReviewState::Displaying => {
                    self.display(suggestion, line_mode, out)?;
                    ReviewState::AwaitingGesture
                }
                ReviewState::AwaitingGesture => match self.read_gesture(keys) {
                    None => {
                        debug!("No gesture arrived, cancelling review");
                        ReviewState::Cancelled
                    }
                    Some(gesture) => {
                        debug!("Gesture {gesture:?}");
                        self.transition(gesture, suggestion, out)?
                    }
                },
                ReviewState::ShowingAlternatives => {
                    let alternatives = suggestion.alternatives().to_vec();
                    if let Some(chosen) = self.choose_alternative(&alternatives, keys, out)? {
                        info!("Selected alternative {chosen:?}");
                        suggestion.replace_command(chosen);
                    }
                    ReviewState::Displaying
                }
                ReviewState::ShowingHelp => {
                    self.show_help(keys, out)?;
                    ReviewState::Displaying
                }
                ReviewState::Editing => {
                    write!(out, "\r\n")?;
                    let edited =
                        self.editor
                            .edit(suggestion.command(), history.to_vec(), keys, out)?;
                    match edited.as_deref().map(str::trim) {
                        Some(command) if !command.is_empty() => {
                            suggestion.replace_command(command);
                        }
                        _ => debug!("Edit cancelled, keeping the command"),
                    }
                    ReviewState::Displaying
                }
                ReviewState::Cancelled => return Ok(None),
                ReviewState::Terminal(action) => return Ok(Some(action)),
            };
        }
    }

    fn transition(
        &self,
        gesture: Gesture,
        suggestion: &CommandSuggestion,
        out: &mut dyn Write,
    ) -> Result<ReviewState> {
        let command = suggestion.command().to_string();
        Ok(match gesture {
            Gesture::Execute => ReviewState::Terminal(ReviewAction::Execute(command)),
            Gesture::Accept => ReviewState::Terminal(ReviewAction::Accept(command)),
            Gesture::Copy => {
                self.copy(&command, out)?;
                ReviewState::Displaying
            }
            Gesture::Alternatives if suggestion.alternatives().is_empty() => {
                self.notice(out, &self.colors.muted("No alternatives available"))?;
                ReviewState::Displaying
            }
            Gesture::Alternatives => ReviewState::ShowingAlternatives,
            Gesture::Edit => ReviewState::Editing,
            Gesture::Cancel => ReviewState::Cancelled,
            Gesture::Help => ReviewState::ShowingHelp,
        })
    }
}

fn has_short_flag(command: &str, flag: char) -> bool {
    command.split_whitespace().any(|word| {
        word.len() > 1
            && word.starts_with('-')
            && !word.starts_with("--")
            && word[1..].contains(flag)
    })
}

/// A short bullet-point explanation built from the command text alone.
pub fn explain_locally(command: &str, unicode: bool) -> Vec<String> {
    let bullet = if unicode { "•" } else { "*" };
    let program = command.split_whitespace().next().unwrap_or_default();

    let mut lines: Vec<&str> = Vec::new();
    match program {
        "find" => lines.push("Searches for files and directories"),
        "ls" => lines.push("Lists directory contents"),
        "grep" => lines.push("Searches for patterns in text"),
        "cat" => lines.push("Displays file contents"),
        "chmod" => lines.push("Changes file permissions"),
        "chown" => lines.push("Changes file ownership"),
        _ if command.split_whitespace().any(|word| word == "sudo") => {
            lines.push("Requires administrator privileges");
        }
        _ => {}
    }

    for (flag, meaning) in [
        ('r', "Operates recursively on directories"),
        ('f', "Forces operation without confirmation"),
        ('v', "Provides verbose output"),
        ('h', "Shows human-readable format"),
    ] {
        if has_short_flag(command, flag) {
            lines.push(meaning);
        }
    }

    if lines.is_empty() {
        lines.push("Command will be executed as specified");
    }

    lines
        .into_iter()
        .map(|line| format!("{bullet} {line}"))
        .collect()
}
