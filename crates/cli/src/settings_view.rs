//! Panels for the `config-show` command and `--capabilities`.

use cli_ai_core::config::{find_spec, Settings, SettingSpec, SETTING_SPECS};
use cli_ai_core::error::Result;

use crate::render::{BorderStyle, ColorScheme, PanelRenderer};
use crate::terminal::TerminalCapabilities;

fn describe(settings: &Settings, spec: &SettingSpec, colors: &ColorScheme) -> Result<Vec<String>> {
    let value = settings.get(spec.key)?;
    let status = if settings.is_default(spec.key)? {
        colors.muted("(default)")
    } else {
        colors.warning("(customized)")
    };

    Ok(vec![
        format!("{}: {} {status}", colors.primary(spec.key), colors.command(&value)),
        colors.muted(&format!("  {}", spec.description)),
    ])
}

/// Renders every setting, or only `key`, with its value, status and description.
///
/// # Errors
///
/// Returns [`cli_ai_core::error::Error::UnknownSetting`] when `key` does not exist.
pub fn settings_panel(
    settings: &Settings,
    key: Option<&str>,
    panels: &PanelRenderer,
    colors: &ColorScheme,
) -> Result<Vec<String>> {
    let specs: Vec<&SettingSpec> = match key {
        Some(key) => vec![find_spec(key)?],
        None => SETTING_SPECS.iter().collect(),
    };

    let mut content = Vec::new();
    for (i, spec) in specs.iter().enumerate() {
        if i > 0 {
            content.push(String::new());
        }
        content.extend(describe(settings, spec, colors)?);
    }

    Ok(panels.draw(&content, "Configuration", None, BorderStyle::Normal))
}

fn support(enabled: bool, colors: &ColorScheme) -> String {
    if enabled {
        colors.success("enabled")
    } else {
        colors.muted("disabled")
    }
}

/// Renders the version and what was detected about the terminal.
///
/// `term` is the declared terminal type, `None` when `TERM` is unset.
pub fn capabilities_panel(
    capabilities: &TerminalCapabilities,
    term: Option<&str>,
    panels: &PanelRenderer,
    colors: &ColorScheme,
) -> Vec<String> {
    let platform = if capabilities.is_wsl {
        format!("{} (WSL)", capabilities.os)
    } else {
        capabilities.os.to_string()
    };
    let label = |name: &str| colors.primary(&format!("{name}:"));

    let content = vec![
        format!("{} {}", label("Version"), env!("CARGO_PKG_VERSION")),
        format!("{} {platform}", label("Platform")),
        format!("{} {}", label("Terminal"), term.unwrap_or("unknown")),
        format!(
            "{} {}x{}",
            label("Size"),
            capabilities.width,
            capabilities.height
        ),
        format!(
            "{} {}",
            label("Interactive"),
            if capabilities.interactive { "yes" } else { "no" }
        ),
        format!("{} {}", label("Color"), support(capabilities.color, colors)),
        format!("{} {}", label("Unicode"), support(capabilities.unicode, colors)),
        format!("{} {}", label("Mouse"), support(capabilities.mouse, colors)),
    ];

    panels.draw(&content, "Terminal Capabilities", None, BorderStyle::Normal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TerminalCapabilities;
    use cli_ai_core::error::Error;

    fn plain() -> (PanelRenderer, ColorScheme) {
        let colors = ColorScheme::new(false);
        (
            PanelRenderer::new(&TerminalCapabilities::conservative(), colors),
            colors,
        )
    }

    #[test]
    fn test_all_settings_are_listed() {
        let (panels, colors) = plain();
        let lines = settings_panel(&Settings::default(), None, &panels, &colors).unwrap();
        let text = lines.join("\n");
        for spec in SETTING_SPECS {
            assert!(text.contains(spec.key), "{}", spec.key);
        }
        assert!(!text.contains("(customized)"));
    }

    #[test]
    fn test_single_customized_setting() {
        let (panels, colors) = plain();
        let mut settings = Settings::default();
        settings.set("max_alternatives", "2").unwrap();

        let lines = settings_panel(&settings, Some("max_alternatives"), &panels, &colors).unwrap();
        // Border, value, description, border
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("max_alternatives: 2 (customized)"));
    }

    #[test]
    fn test_unknown_key() {
        let (panels, colors) = plain();
        let result = settings_panel(&Settings::default(), Some("colour"), &panels, &colors);
        assert!(matches!(result, Err(Error::UnknownSetting { .. })));
    }
}
