use crate::commands::{
    self, clamp_delay_ms, parse_declared_kind, DeclaredKind, Notification, NotificationLevel,
    OutlineSymbol, ReloadRunOptions,
};
use crate::state::AppState;
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "XOJO_OUTLINE_LOG";
const DEFAULT_LOG_FILTER: &str = "xojo_outline_lib=info";

#[derive(Parser)]
#[command(name = "xojo-outline")]
#[command(about = "Outline Xojo source files and drive the Xojo IDE", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the symbol outline of a Xojo file
    Outline {
        /// Path to a .xojo_code, .xojo_window, .xojo_menu or script file
        file: PathBuf,

        /// Override the kind derived from the file extension (menu, window, code, generic)
        #[arg(short, long)]
        kind: Option<String>,

        /// Keep only symbols whose name contains this text, plus their ancestors
        #[arg(long)]
        filter: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormatArg,
    },

    /// Open Xojo, reload the project and run it
    ReloadAndRun {
        /// Folder searched for a *.xojo_project
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Only activate Xojo instead of opening the project first
        #[arg(long)]
        no_open_project: bool,

        #[arg(long, allow_negative_numbers = true)]
        open_delay_ms: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        reload_dialog_delay_ms: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        reload_to_run_delay_ms: Option<i64>,
    },

    /// Reload and run using the workspace's launch.json entry
    Debug {
        /// Workspace folder (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },

    /// Write .vscode/launch.json with the default Xojo configuration
    CreateDefaultLaunch {
        /// Workspace folder (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    /// Pretty-printed JSON tree
    Json,
    /// Indented plain text
    Tree,
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub(crate) fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Outline {
            file,
            kind,
            filter,
            format,
        } => {
            print_outline(file, kind.as_deref(), filter, format)?;
            Ok(true)
        }
        Commands::ReloadAndRun {
            folder,
            no_open_project,
            open_delay_ms,
            reload_dialog_delay_ms,
            reload_to_run_delay_ms,
        } => {
            let defaults = ReloadRunOptions::default();
            let options = ReloadRunOptions {
                folder: Some(resolve_folder(folder)?),
                open_project: !no_open_project,
                open_delay_ms: clamp_delay_ms(open_delay_ms, defaults.open_delay_ms),
                reload_dialog_delay_ms: clamp_delay_ms(
                    reload_dialog_delay_ms,
                    defaults.reload_dialog_delay_ms,
                ),
                reload_to_run_delay_ms: clamp_delay_ms(
                    reload_to_run_delay_ms,
                    defaults.reload_to_run_delay_ms,
                ),
            };
            Ok(report(&commands::reload_and_run(options)))
        }
        Commands::Debug { workspace } => {
            let workspace = resolve_folder(workspace)?;
            Ok(report(&commands::debug_workspace(Some(workspace))))
        }
        Commands::CreateDefaultLaunch { workspace } => {
            let workspace = resolve_folder(workspace)?;
            Ok(report(&[commands::create_default_launch(Some(workspace))]))
        }
    }
}

fn resolve_folder(folder: Option<PathBuf>) -> Result<PathBuf> {
    match folder {
        Some(folder) => Ok(folder),
        None => std::env::current_dir().context("Failed to read the current directory"),
    }
}

fn print_outline(
    file: PathBuf,
    kind: Option<&str>,
    filter: Option<String>,
    format: OutputFormatArg,
) -> Result<()> {
    let declared_kind: Option<DeclaredKind> = kind
        .map(|label| parse_declared_kind(label).ok_or_else(|| anyhow!("Unknown kind: {}", label)))
        .transpose()?;

    let state = AppState::new();
    let info = commands::open_file(&state, file.to_string_lossy().to_string())
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to open {}", file.display()))?;

    let mut symbols =
        commands::get_outline(&state, info.id.clone(), declared_kind).map_err(|e| anyhow!(e))?;
    commands::close_file(&state, info.id);

    if let Some(keyword) = filter {
        symbols = commands::filter_outline_symbols(symbols, keyword);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormatArg::Json => {
            serde_json::to_writer_pretty(&mut out, &symbols)?;
            writeln!(out)?;
        }
        OutputFormatArg::Tree => out.write_all(render_tree(&symbols).as_bytes())?,
    }
    out.flush()?;

    Ok(())
}

fn render_tree(symbols: &[OutlineSymbol]) -> String {
    fn walk(symbols: &[OutlineSymbol], depth: usize, output: &mut String) {
        for symbol in symbols {
            output.push_str(&"  ".repeat(depth));
            output.push_str(&symbol.name);
            if !symbol.detail.is_empty() {
                output.push_str("  ");
                output.push_str(&symbol.detail);
            }
            output.push_str(&format!("  [{}]\n", symbol.full_range.start.line + 1));
            walk(&symbol.children, depth + 1, output);
        }
    }

    let mut output = String::new();
    walk(symbols, 0, &mut output);
    output
}

/// Prints notifications and reports whether none of them is an error.
fn report(notifications: &[Notification]) -> bool {
    for notification in notifications {
        let prefix = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        eprintln!("{}: {}", prefix, notification.message);
    }

    notifications
        .iter()
        .all(|notification| notification.level != NotificationLevel::Error)
}
