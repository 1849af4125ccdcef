//! Heuristic risk classification for shell commands.
//!
//! Commands are matched case-insensitively against curated signatures of
//! dangerous and destructive operations. The result annotates a suggestion;
//! it never blocks execution and makes no completeness guarantee.

use std::fmt::{Display, Formatter};
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl Display for RiskLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        })
    }
}

/// Outcome of assessing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub level: RiskLevel,
    pub is_destructive: bool,
    /// Byte range of the text matched by the signature that decided the level.
    pub matched: Option<Range<usize>>,
}

struct Signature {
    pattern: Regex,
    /// Matches whose text also matches this are ignored.
    exempt: Option<Regex>,
}

impl Signature {
    fn new(pattern: &str) -> Self {
        Self {
            pattern: case_insensitive(pattern),
            exempt: None,
        }
    }

    fn with_exemption(pattern: &str, exempt: &str) -> Self {
        Self {
            pattern: case_insensitive(pattern),
            exempt: Some(case_insensitive(exempt)),
        }
    }

    fn find(&self, command: &str) -> Option<Range<usize>> {
        self.pattern
            .find_iter(command)
            .find(|m| {
                self.exempt
                    .as_ref()
                    .map_or(true, |exempt| !exempt.is_match(m.as_str()))
            })
            .map(|m| m.range())
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    // Patterns are compile-time constants covered by tests.
    Regex::new(&format!("(?i){pattern}")).unwrap_or_else(|e| panic!("bad risk pattern: {e}"))
}

static DANGEROUS: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        // recursive delete
        Signature::new(r"\brm\s+(?:.*\s)?-[a-z]*r"),
        Signature::new(r"\brm\s+.*--recursive"),
        Signature::new(r"\bremove-item\b.*-recurse"),
        Signature::new(r"\b(?:rd|rmdir)\s+/s\b"),
        // raw disk writes and filesystem format
        Signature::new(r"\bdd\s+"),
        Signature::new(r"\bmkfs\b"),
        Signature::new(r"(?:^|[;&|(]\s*)(?:sudo\s+)?format\b"),
        Signature::new(r"\bfdisk\b"),
        Signature::new(r"\bshred\b"),
        Signature::new(r">\s*/dev/(?:sd|hd|vd|xvd|nvme|disk|mmcblk|mem|kmem|port)"),
        // broad permission/ownership changes
        Signature::new(r"\bchmod\s+(?:-[a-z]+\s+)*0?777"),
        Signature::new(r"\bchmod\s+(?:-[a-z]+\s+)*-[a-z]*r[a-z]*\s+\S+\s+/(?:\s|$)"),
        Signature::new(r"\bchown\s+.*root"),
        // scheduled jobs, firewall and credential stores
        Signature::new(r"\bcrontab\s+-r"),
        Signature::new(r"\biptables\s+(?:-t\s+\w+\s+)?(?:-f\b|--flush)"),
        Signature::new(r"\bsecurity\s+delete-(?:generic|internet)-password"),
        Signature::new(r"\bcmdkey\s+/delete"),
        Signature::new(r"\bssh-add\s+-d\b"),
    ]
});

static DESTRUCTIVE: Lazy<Vec<Signature>> = Lazy::new(|| {
    vec![
        Signature::new(r"\brm\s+.*/"),
        Signature::new(r"\b(?:rm|rmdir|unlink|del)\s+"),
        Signature::new(r"\bmv\s+.*\s+/dev/null"),
        Signature::new(r"\btruncate\s+"),
        Signature::new(r"\bgit\s+(?:reset\s+--hard|clean\s+-[a-z]*f|push\s+.*--force)"),
        Signature::new(r"\bdocker\s+(?:rm|rmi|system\s+prune|volume\s+rm)\b"),
        // overwriting redirect, appends and discarded output excluded
        Signature::with_exemption(
            r"(?:^|[^>&])>\s*[^|&;>\s]+",
            r">\s*/dev/(?:null|stdout|stderr|tty)\b",
        ),
    ]
});

static ELEVATION: Lazy<Regex> =
    Lazy::new(|| case_insensitive(r"(?:^|[;&|(]\s*|\s)(?:sudo|doas|pkexec|runas|su)\b"));

/// Classifies `command` into a risk level and destructiveness flag.
pub fn assess(command: &str) -> (RiskLevel, bool) {
    let assessment = assess_detailed(command);
    (assessment.level, assessment.is_destructive)
}

/// Like [`assess`], but also reports which part of the command decided the level.
pub fn assess_detailed(command: &str) -> Assessment {
    if let Some(range) = DANGEROUS.iter().find_map(|s| s.find(command)) {
        return Assessment {
            level: RiskLevel::High,
            is_destructive: true,
            matched: Some(range),
        };
    }

    if let Some(range) = DESTRUCTIVE.iter().find_map(|s| s.find(command)) {
        return Assessment {
            level: RiskLevel::Medium,
            is_destructive: true,
            matched: Some(range),
        };
    }

    if let Some(m) = ELEVATION.find(command) {
        return Assessment {
            level: RiskLevel::Medium,
            is_destructive: false,
            matched: Some(m.range()),
        };
    }

    Assessment {
        level: RiskLevel::Low,
        is_destructive: false,
        matched: None,
    }
}

/// True when the command runs with a privilege-elevation prefix.
pub fn requires_elevation(command: &str) -> bool {
    ELEVATION.is_match(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recursive_delete_is_high_regardless_of_case() {
        assert_eq!(assess("rm -rf /tmp/x"), (RiskLevel::High, true));
        assert_eq!(assess("RM -RF /tmp/x"), (RiskLevel::High, true));
        assert_eq!(assess("rm -fr build"), (RiskLevel::High, true));
    }

    #[test]
    fn test_read_only_commands_are_low() {
        assert_eq!(assess("ls -la"), (RiskLevel::Low, false));
        assert_eq!(assess("git log --format=oneline"), (RiskLevel::Low, false));
        assert_eq!(assess("grep -r foo . 2>/dev/null"), (RiskLevel::Low, false));
    }

    #[test]
    fn test_dangerous_signatures() {
        for command in [
            "dd if=/dev/zero of=/dev/sda",
            "mkfs.ext4 /dev/sdb1",
            "sudo fdisk /dev/sda",
            "shred -u secrets.txt",
            "chmod 777 /etc/passwd",
            "chmod -R 755 /",
            "chown -R root:root /home/me",
            "cat image.iso > /dev/sdb",
            "crontab -r",
            "iptables -F",
            "ssh-add -D",
            "Remove-Item C:\\temp -Recurse",
        ] {
            assert_eq!(assess(command).0, RiskLevel::High, "{command}");
        }
    }

    #[test]
    fn test_destructive_signatures_are_medium() {
        for command in [
            "rm notes.txt",
            "rm ./build/output.log",
            "truncate -s 0 app.log",
            "echo hello > greeting.txt",
            "git reset --hard HEAD~1",
            "docker rmi my-image",
        ] {
            assert_eq!(assess(command), (RiskLevel::Medium, true), "{command}");
        }
    }

    #[test]
    fn test_append_redirect_is_not_destructive() {
        assert_eq!(assess("echo hello >> greeting.txt"), (RiskLevel::Low, false));
    }

    #[test]
    fn test_elevation_alone_is_medium_non_destructive() {
        assert_eq!(assess("sudo apt update"), (RiskLevel::Medium, false));
        assert_eq!(assess("SUDO systemctl status nginx"), (RiskLevel::Medium, false));
        assert!(requires_elevation("sudo ls"));
        assert!(!requires_elevation("pseudo-random"));
    }

    #[test]
    fn test_dangerous_beats_destructive() {
        // Matches both a destructive and a dangerous signature.
        assert_eq!(assess("rm -r /var/tmp/cache"), (RiskLevel::High, true));
    }

    #[test]
    fn test_matched_range_covers_command_and_flag() {
        let command = "rm -rf /var/log/old";
        let assessment = assess_detailed(command);
        let range = assessment.matched.unwrap();
        assert_eq!(&command[range], "rm -r");
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let first = assess_detailed("sudo rm -rf /opt/app");
        let second = assess_detailed("sudo rm -rf /opt/app");
        assert_eq!(first, second);
    }

    #[test]
    fn test_risk_level_display_and_order() {
        assert_eq!(RiskLevel::High.to_string(), "HIGH");
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }
}
