#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use cli_ai_cli::input::{Key, KeyScript};
    use cli_ai_cli::render::panel::strip_ansi;
    use cli_ai_cli::render::{ColorScheme, PanelRenderer};
    use cli_ai_cli::review::ReviewInterface;
    use cli_ai_cli::settings_view::{capabilities_panel, settings_panel};
    use cli_ai_cli::terminal::{OsFamily, TerminalCapabilities};
    use cli_ai_core::clipboard::SystemClipboard;
    use cli_ai_core::file_handling::load_settings;
    use cli_ai_core::suggestion::CommandSuggestion;
    use tempfile::NamedTempFile;

    fn settings_file(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_show_reflects_file() {
        let file = settings_file("max_alternatives: 2\nsimple_mode: true\n");
        let settings = load_settings(file.path().to_str().unwrap()).unwrap();

        let capabilities = TerminalCapabilities::conservative();
        let colors = ColorScheme::new(capabilities.color);
        let panels = PanelRenderer::new(&capabilities, colors);
        let lines = settings_panel(&settings, None, &panels, &colors).unwrap();

        let text = lines.join("\n");
        assert!(text.starts_with("+- Configuration "));
        assert!(text.contains("max_alternatives: 2 (customized)"));
        assert!(text.contains("simple_mode: true (customized)"));
        assert!(text.contains("show_explanations: true (default)"));
        for line in &lines {
            assert_eq!(line.chars().count(), panels.default_width());
        }
    }

    #[test]
    fn test_explanations_setting_controls_panel() {
        let file = settings_file("show_explanations: false\nenable_syntax_highlighting: false\n");
        let settings = load_settings(file.path().to_str().unwrap()).unwrap();

        let capabilities = TerminalCapabilities::conservative();
        let clipboard = SystemClipboard::new();
        let interface = ReviewInterface::new(&capabilities, &settings, &clipboard)
            .with_notice_delay(Duration::ZERO);

        let mut suggestion =
            CommandSuggestion::new("ls -lh").with_explanation("Lists files with sizes");
        let mut keys = KeyScript::new([Key::Enter]);
        let mut out = Vec::new();
        interface
            .process(&mut suggestion, &mut keys, &[], &mut out)
            .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(!strip_ansi(&output).contains("Lists files with sizes"));
        assert!(output.contains("ls -lh"));
    }

    #[test]
    fn test_local_explanation_fills_missing_one() {
        let file = settings_file("model: claude-3-5-haiku-latest\n");
        let settings = load_settings(file.path().to_str().unwrap()).unwrap();

        let capabilities = TerminalCapabilities::conservative();
        let clipboard = SystemClipboard::new();
        let interface = ReviewInterface::new(&capabilities, &settings, &clipboard);

        let suggestion = CommandSuggestion::new("grep -rv TODO src");
        let text = interface.suggestion_panel(&suggestion).join("\n");

        assert!(text.contains("* Searches for patterns in text"));
        assert!(text.contains("* Operates recursively on directories"));
        assert!(text.contains("* Provides verbose output"));
    }

    #[test]
    fn test_capabilities_report() {
        let capabilities = TerminalCapabilities {
            width: 120,
            height: 40,
            color: true,
            unicode: false,
            mouse: false,
            interactive: true,
            os: OsFamily::Linux,
            is_wsl: true,
        };
        let colors = ColorScheme::new(false);
        let panels = PanelRenderer::new(&capabilities, colors);

        let lines = capabilities_panel(&capabilities, Some("xterm-256color"), &panels, &colors);
        let text = lines.join("\n");
        assert!(text.starts_with("+- Terminal Capabilities "));
        assert!(text.contains(&format!("Version: {}", env!("CARGO_PKG_VERSION"))));
        assert!(text.contains("Platform: Linux (WSL)"));
        assert!(text.contains("Terminal: xterm-256color"));
        assert!(text.contains("Size: 120x40"));
        assert!(text.contains("Interactive: yes"));
        assert!(text.contains("Color: enabled"));
        assert!(text.contains("Unicode: disabled"));
        for line in &lines {
            assert_eq!(line.chars().count(), panels.default_width());
        }
    }

    #[test]
    fn test_capabilities_report_without_term() {
        let capabilities = TerminalCapabilities::conservative();
        let colors = ColorScheme::new(false);
        let panels = PanelRenderer::new(&capabilities, colors);

        let text = capabilities_panel(&capabilities, None, &panels, &colors).join("\n");
        assert!(text.contains("Terminal: unknown"));
        assert!(text.contains("Interactive: no"));
        assert!(!text.contains("(WSL)"));
    }
}
