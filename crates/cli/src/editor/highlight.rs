use std::ops::Range;

use cli_ai_core::risk::{assess_detailed, RiskLevel};

use crate::render::ColorScheme;

const DANGER_COMMANDS: &[&str] = &["sudo", "su"];
const DESTRUCTIVE_COMMANDS: &[&str] = &["rm", "rmdir", "dd", "mkfs", "format"];
const SAFE_COMMANDS: &[&str] = &["ls", "cat", "grep", "find", "which", "whereis"];
const NAVIGATION_COMMANDS: &[&str] = &["cd", "pwd", "echo", "printf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Danger,
    Destructive,
    Safe,
    Navigation,
    Operator,
    Redirect,
    Flag,
    Quoted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub class: Option<TokenClass>,
    range: Range<usize>,
}

fn is_operator(c: char) -> bool {
    matches!(c, '|' | '&' | ';')
}

fn is_redirect(c: char) -> bool {
    matches!(c, '<' | '>')
}

fn is_flag(word: &str) -> bool {
    word.starts_with('-')
        && word
            .trim_start_matches('-')
            .starts_with(|c: char| c.is_alphanumeric() || c == '_')
}

fn classify_word(word: &str) -> Option<TokenClass> {
    // mkfs.ext4 and friends are classified by their stem
    let stem = word.split('.').next().unwrap_or(word);
    let is = |names: &[&str]| names.iter().any(|name| name.eq_ignore_ascii_case(stem));

    if is(DANGER_COMMANDS) {
        Some(TokenClass::Danger)
    } else if is(DESTRUCTIVE_COMMANDS) {
        Some(TokenClass::Destructive)
    } else if is(SAFE_COMMANDS) {
        Some(TokenClass::Safe)
    } else if is(NAVIGATION_COMMANDS) {
        Some(TokenClass::Navigation)
    } else if is_flag(word) {
        Some(TokenClass::Flag)
    } else {
        None
    }
}

/// Splits `command` into classified segments covering all of its text.
///
/// When the command is high risk, every token overlapping the text that
/// decided the risk level is classified as [`TokenClass::Danger`].
pub fn classify(command: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = command.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let mut end = start + c.len_utf8();
        let class = if c.is_whitespace() {
            while let Some(&(i, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            None
        } else if c == '"' || c == '\'' {
            for (i, next) in chars.by_ref() {
                end = i + next.len_utf8();
                if next == c {
                    break;
                }
            }
            Some(TokenClass::Quoted)
        } else if is_operator(c) {
            Some(TokenClass::Operator)
        } else if is_redirect(c) {
            Some(TokenClass::Redirect)
        } else {
            while let Some(&(i, next)) = chars.peek() {
                if next.is_whitespace()
                    || is_operator(next)
                    || is_redirect(next)
                    || next == '"'
                    || next == '\''
                {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            classify_word(&command[start..end])
        };

        segments.push(Segment {
            text: command[start..end].to_string(),
            class,
            range: start..end,
        });
    }

    let assessment = assess_detailed(command);
    if let (RiskLevel::High, Some(matched)) = (assessment.level, assessment.matched) {
        for segment in &mut segments {
            let overlaps = segment.range.start < matched.end && matched.start < segment.range.end;
            if overlaps && !segment.text.trim().is_empty() {
                segment.class = Some(TokenClass::Danger);
            }
        }
    }

    segments
}

/// Colors shell commands token by token.
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    colors: ColorScheme,
    enabled: bool,
}

impl Highlighter {
    /// `enabled` switches highlighting off even when colors are available.
    pub fn new(colors: ColorScheme, enabled: bool) -> Self {
        Self {
            colors,
            enabled: enabled && colors.is_enabled(),
        }
    }

    fn paint(&self, class: Option<TokenClass>, text: &str) -> String {
        match class {
            None => text.to_string(),
            Some(TokenClass::Danger) => self.colors.danger(text),
            Some(TokenClass::Destructive) => self.colors.error(text),
            Some(TokenClass::Safe) => self.colors.success(text),
            Some(TokenClass::Navigation) => self.colors.primary(text),
            Some(TokenClass::Operator) => self.colors.secondary(text),
            Some(TokenClass::Redirect) => self.colors.warning(text),
            Some(TokenClass::Flag) => self.colors.muted(text),
            Some(TokenClass::Quoted) => self.colors.highlight(text),
        }
    }

    fn segments(&self, command: &str) -> Vec<Segment> {
        if self.enabled {
            classify(command)
        } else {
            vec![Segment {
                text: command.to_string(),
                class: None,
                range: 0..command.len(),
            }]
        }
    }

    pub fn highlight(&self, command: &str) -> String {
        self.segments(command)
            .iter()
            .map(|segment| self.paint(segment.class, &segment.text))
            .collect()
    }

    /// Highlights `command` as a whole, then splits it around the character
    /// starting at byte offset `at`.
    ///
    /// Returns the colored text before that character, the character itself
    /// uncolored (`None` past the end), and the colored text after it. A
    /// token spanning `at` keeps the class of the whole token on both sides.
    pub fn highlight_around(&self, command: &str, at: usize) -> (String, Option<char>, String) {
        let at = at.min(command.len());
        let under = command[at..].chars().next();
        let resume = at + under.map_or(0, char::len_utf8);

        let mut before = String::new();
        let mut after = String::new();
        for segment in self.segments(command) {
            let Range { start, end } = segment.range;
            if start < at {
                before.push_str(&self.paint(segment.class, &command[start..end.min(at)]));
            }
            if end > resume {
                after.push_str(&self.paint(segment.class, &command[start.max(resume)..end]));
            }
        }
        (before, under, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(command: &str) -> Vec<(String, Option<TokenClass>)> {
        classify(command)
            .into_iter()
            .filter(|s| !s.text.trim().is_empty())
            .map(|s| (s.text, s.class))
            .collect()
    }

    #[test]
    fn test_segments_cover_the_command() {
        let command = "grep -n \"a b\" file.txt | sort >> out.log; echo 'done'";
        let joined: String = classify(command).into_iter().map(|s| s.text).collect();
        assert_eq!(joined, command);
    }

    #[test]
    fn test_token_classes() {
        assert_eq!(
            classes("grep -n \"a b\" x|wc -l > out"),
            vec![
                ("grep".to_string(), Some(TokenClass::Safe)),
                ("-n".to_string(), Some(TokenClass::Flag)),
                ("\"a b\"".to_string(), Some(TokenClass::Quoted)),
                ("x".to_string(), None),
                ("|".to_string(), Some(TokenClass::Operator)),
                ("wc".to_string(), None),
                ("-l".to_string(), Some(TokenClass::Flag)),
                (">".to_string(), Some(TokenClass::Redirect)),
                ("out".to_string(), None),
            ]
        );
        assert_eq!(classes("cd /tmp")[0].1, Some(TokenClass::Navigation));
        assert_eq!(classes("sudo ls")[0].1, Some(TokenClass::Danger));
        assert_eq!(classes("rmdir empty")[0].1, Some(TokenClass::Destructive));
    }

    #[test]
    fn test_recursive_delete_tokens_are_danger() {
        let classified = classes("rm -rf /var/log/old*");
        assert_eq!(classified[0], ("rm".to_string(), Some(TokenClass::Danger)));
        assert_eq!(classified[1], ("-rf".to_string(), Some(TokenClass::Danger)));
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let classified = classes("echo \"unterminated");
        assert_eq!(
            classified[1],
            ("\"unterminated".to_string(), Some(TokenClass::Quoted))
        );
    }

    #[test]
    fn test_disabled_highlighter_is_identity() {
        let highlighter = Highlighter::new(ColorScheme::new(true), false);
        assert_eq!(highlighter.highlight("rm -rf /"), "rm -rf /");
        let highlighter = Highlighter::new(ColorScheme::new(false), true);
        assert_eq!(highlighter.highlight("rm -rf /"), "rm -rf /");
    }

    #[test]
    fn test_highlighted_danger_tokens() {
        let colors = ColorScheme::new(true);
        let highlighted = Highlighter::new(colors, true).highlight("rm -rf /var/log/old");
        assert!(highlighted.starts_with(&colors.danger("rm")));
        assert!(highlighted.contains(&colors.danger("-rf")));
    }

    #[test]
    fn test_split_token_keeps_its_class() {
        let colors = ColorScheme::new(true);
        let highlighter = Highlighter::new(colors, true);

        // Cursor on the "s" of "ls"
        let (before, under, after) = highlighter.highlight_around("ls -la", 1);
        assert_eq!(before, colors.success("l"));
        assert_eq!(under, Some('s'));
        assert_eq!(after, format!(" {}", colors.muted("-la")));

        // Cursor inside "grep": neither half is classified on its own
        let (before, under, after) = highlighter.highlight_around("grep x", 2);
        assert_eq!(before, colors.success("gr"));
        assert_eq!(under, Some('e'));
        assert_eq!(after, format!("{} x", colors.success("p")));
    }

    #[test]
    fn test_split_at_end_and_without_color() {
        let colors = ColorScheme::new(true);
        let (before, under, after) = Highlighter::new(colors, true).highlight_around("cd", 2);
        assert_eq!(before, colors.primary("cd"));
        assert_eq!(under, None);
        assert_eq!(after, "");

        let plain = Highlighter::new(ColorScheme::new(false), true);
        assert_eq!(
            plain.highlight_around("écho hi", 2),
            ("é".to_string(), Some('c'), "ho hi".to_string())
        );
    }
}
