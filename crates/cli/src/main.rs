use std::io::{stdout, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cli_ai_core::assistant::{RequestContext, SuggestionService};
use cli_ai_core::clipboard::{Clipboard, SystemClipboard};
use cli_ai_core::config::{self, Settings};
use cli_ai_core::error::{Error, Result};
use cli_ai_core::execution;
use cli_ai_core::file_handling;
use cli_ai_core::history::{CommandHistory, HistoryEntry};
use cli_ai_core::llm::AnthropicClient;
use cli_ai_core::shell::ShellEnvironment;
use cli_ai_core::suggestion::CommandSuggestion;
use log::{debug, info, warn};

use cli_ai_cli::cli_args::{Action, Args};
use cli_ai_cli::input::KeyReader;
use cli_ai_cli::render::{write_lines, ColorScheme, PanelRenderer};
use cli_ai_cli::review::{ReviewAction, ReviewInterface};
use cli_ai_cli::settings_view::{capabilities_panel, settings_panel};
use cli_ai_cli::spinner::Spinner;
use cli_ai_cli::terminal::TerminalCapabilities;

/// How a run ended when nothing failed.
enum Outcome {
    Completed,
    Cancelled,
}

fn config_set(config_path: &str, assignment: &str) -> Result<Outcome> {
    let mut settings = file_handling::load_settings(config_path)?;
    let (key, value) = config::parse_assignment(assignment)?;
    settings.set(&key, &value)?;
    file_handling::save_settings(config_path, &settings)?;
    info!("Saved `{key}` to `{config_path}`");

    let colors = ColorScheme::new(TerminalCapabilities::detect().color);
    println!(
        "{} {} = {}",
        colors.success("Set"),
        colors.primary(&key),
        colors.command(&settings.get(&key)?)
    );
    Ok(Outcome::Completed)
}

fn config_show(config_path: &str, key: Option<&str>) -> Result<Outcome> {
    let settings = file_handling::load_settings(config_path)?;
    let capabilities = TerminalCapabilities::detect();
    let colors = ColorScheme::new(capabilities.color);
    let panels = PanelRenderer::new(&capabilities, colors);

    let lines = settings_panel(&settings, key, &panels, &colors)?;
    write_lines(&mut stdout(), &lines)?;
    println!("{}", colors.muted(&format!("Settings file: {config_path}")));
    Ok(Outcome::Completed)
}

fn show_capabilities() -> Result<Outcome> {
    let capabilities = TerminalCapabilities::detect();
    let colors = ColorScheme::new(capabilities.color);
    let panels = PanelRenderer::new(&capabilities, colors);
    let term = std::env::var("TERM").ok();

    let lines = capabilities_panel(&capabilities, term.as_deref(), &panels, &colors);
    write_lines(&mut stdout(), &lines)?;
    Ok(Outcome::Completed)
}

fn load_history(settings: &Settings, history_path: &str) -> Result<CommandHistory> {
    if !settings.enable_command_history {
        return Ok(CommandHistory::default());
    }
    file_handling::load_history(history_path)
}

fn record_history(
    settings: &Settings,
    history_path: &str,
    history: &mut CommandHistory,
    entry: HistoryEntry,
) {
    if !settings.enable_command_history {
        return;
    }
    history.push(entry);
    if let Err(e) = file_handling::save_history(history_path, history) {
        warn!("Could not save command history: {e}");
    }
}

fn request_suggestion(
    settings: &Settings,
    history: &CommandHistory,
    capabilities: &TerminalCapabilities,
    shell: &ShellEnvironment,
    request: &str,
) -> Result<CommandSuggestion> {
    // Checked before anything is sent
    let api_key = config::get_api_key()?;
    let client = AnthropicClient::new(settings, api_key)?;

    let directory_listing = if settings.directory_tree_context {
        Some(execution::directory_listing(shell)).filter(|listing| !listing.is_empty())
    } else {
        None
    };
    let context = RequestContext {
        shell: shell.to_string(),
        directory_listing,
    };

    let mut spinner = Spinner::start(capabilities);
    let suggestion = SuggestionService::new(&client, settings, history).suggest(request, &context);
    spinner.stop();

    suggestion
}

fn print_simple(
    suggestion: &mut CommandSuggestion,
    interface: &ReviewInterface,
    clipboard: &dyn Clipboard,
    colors: &ColorScheme,
) -> Result<()> {
    suggestion.assess();
    write_lines(&mut stdout(), &interface.suggestion_panel(suggestion))?;

    if clipboard.copy(suggestion.command()) {
        println!("{}", colors.success("Command copied to clipboard"));
    } else {
        println!("{}", colors.warning("Could not copy to clipboard"));
    }
    Ok(())
}

fn run_command(shell: &ShellEnvironment, command: &str, colors: &ColorScheme) -> Result<()> {
    println!("{} {}", colors.muted("Executing:"), colors.command(command));
    let output = execution::execute(shell, command)?;
    if !output.stdout.is_empty() {
        println!("{}", output.stdout);
    }
    debug!("Command finished with status {}", output.status);
    Ok(())
}

fn execute() -> Result<Outcome> {
    let args = Args::parse();
    if args.capabilities {
        return show_capabilities();
    }

    let config_path = config::get_config_path(&args.config_path);
    debug!("Config path: `{config_path}`");

    match &args.command {
        Some(Action::ConfigSet { assignment }) => return config_set(&config_path, assignment),
        Some(Action::ConfigShow { key }) => return config_show(&config_path, key.as_deref()),
        None => {}
    }

    let request = args.request();
    if request.is_empty() {
        Args::command().print_help()?;
        return Ok(Outcome::Cancelled);
    }

    let settings = file_handling::load_settings(&config_path)?;
    let history_path = config::get_history_path(&args.history_path);
    debug!("History path: `{history_path}`");
    let mut history = load_history(&settings, &history_path)?;

    let capabilities = TerminalCapabilities::detect();
    let colors = ColorScheme::new(capabilities.color);
    let shell = ShellEnvironment::detect();

    let mut suggestion =
        request_suggestion(&settings, &history, &capabilities, &shell, &request)?;

    let clipboard = SystemClipboard::new();
    let interface = ReviewInterface::new(&capabilities, &settings, &clipboard);

    if args.simple || settings.simple_mode {
        print_simple(&mut suggestion, &interface, &clipboard, &colors)?;
        record_history(
            &settings,
            &history_path,
            &mut history,
            HistoryEntry {
                request,
                command: suggestion.command().to_string(),
                executed: false,
            },
        );
        return Ok(Outcome::Completed);
    }

    let action = {
        // Raw mode ends with this scope, before anything else is printed
        let mut keys = KeyReader::open();
        let mut out = stdout();
        interface.process(&mut suggestion, &mut keys, &history.commands(), &mut out)?
    };

    match action {
        Some(ReviewAction::Execute(command)) if args.dry_run => {
            println!("{} {}", colors.muted("Dry run, not executing:"), colors.command(&command));
            record_history(
                &settings,
                &history_path,
                &mut history,
                HistoryEntry {
                    request,
                    command,
                    executed: false,
                },
            );
            Ok(Outcome::Completed)
        }
        Some(ReviewAction::Execute(command)) => {
            let result = run_command(&shell, &command, &colors);
            record_history(
                &settings,
                &history_path,
                &mut history,
                HistoryEntry {
                    request,
                    command,
                    executed: true,
                },
            );
            result.map(|()| Outcome::Completed)
        }
        Some(ReviewAction::Accept(command)) => {
            let copied = clipboard.copy(&command);
            println!("{}", colors.success("Command ready to paste:"));
            println!("{}", colors.command(&command));
            if copied {
                println!("{}", colors.muted("(copied to clipboard)"));
            }
            record_history(
                &settings,
                &history_path,
                &mut history,
                HistoryEntry {
                    request,
                    command,
                    executed: false,
                },
            );
            Ok(Outcome::Completed)
        }
        None => {
            println!("{}", colors.muted("Cancelled"));
            record_history(
                &settings,
                &history_path,
                &mut history,
                HistoryEntry {
                    request,
                    command: suggestion.command().to_string(),
                    executed: false,
                },
            );
            Ok(Outcome::Cancelled)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => ExitCode::FAILURE,
        Err(e) => {
            let _ = stdout().flush();
            eprintln!("{e}");
            if matches!(e, Error::MissingApiKey) {
                eprintln!("Example: export {}=sk-...", config::API_KEY_VARIABLE);
            } else if e.is_model_failure() {
                eprintln!("No suggestion could be obtained from the language model. Check the API key and the network connection, then try again.");
            }
            ExitCode::FAILURE
        }
    }
}
