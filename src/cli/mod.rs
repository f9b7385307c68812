//! Command-line interface parsing and startup
//!
//! This module parses arguments, loads configuration and key bindings, and
//! either prints the binding table or starts the interactive browser.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::core::config::{Config, ConfigError};
use crate::core::error::TwigError;
use crate::core::repo::GitCli;
use crate::input::bindings::{Binding, KeyBindings};
use crate::ui::event_loop::{Channels, Engine, EngineSettings};
use crate::ui::lifecycle;
use crate::ui::terminal::CrosstermTerminal;
use crate::utils::logging;
use crate::views::MainView;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "twig")]
#[command(version = VERSION)]
#[command(about = "A keyboard-driven terminal browser for git repositories")]
#[command(
    long_about = "Twig is a full-screen terminal browser for git repositories. \
It shows the commit history and the working tree status, each beside a diff \
of the selected entry.\n\n\
Controls (defaults):\n\
  j/k               Move down/up\n\
  gg/G              Jump to first/last line\n\
  Tab               Switch pane\n\
  gt/gT             Switch tab\n\
  Enter             Show the selected diff\n\
  Ctrl+R            Reload the current pane\n\
  q, Ctrl+C         Quit\n\n\
Key bindings can be changed in the configuration file; run 'twig bindings' \
to list the effective table.\n\n\
Environment Variables:\n\
  TWIG_LOG_FILE     Write diagnostic logs to this file\n\
  TWIG_LOG          Log filter directives (default: info)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Repository to browse (defaults to the current directory)
    #[arg(value_name = "REPO")]
    pub repo: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the effective key bindings
    Bindings,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let log_path = logging::resolve_log_path(args.log.clone());
    if let Err(err) = logging::init(log_path.as_deref()) {
        eprintln!("⚠️  Cannot open log file: {err}");
    }

    let (config, mut config_errors) = load_config(args.config.clone());
    let mut bindings = KeyBindings::with_defaults();
    config_errors.extend(config.apply_bindings(&mut bindings));
    for err in &config_errors {
        warn!(error = %err, "Configuration problem");
    }
    let bindings = Arc::new(bindings);

    match args.command {
        Some(Commands::Bindings) => {
            for err in &config_errors {
                eprintln!("⚠️  {err}");
            }
            print_bindings(&bindings, &mut io::stdout().lock())?;
            Ok(())
        }
        None => run_browser(args.repo, config, config_errors, bindings).await,
    }
}

fn load_config(explicit: Option<PathBuf>) -> (Config, Vec<ConfigError>) {
    match explicit.or_else(Config::default_path) {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration");
            Config::load(&path)
        }
        None => (Config::default(), Vec::new()),
    }
}

async fn run_browser(
    repo: Option<PathBuf>,
    config: Config,
    config_errors: Vec<ConfigError>,
    bindings: Arc<KeyBindings>,
) -> Result<(), Box<dyn Error>> {
    let repo_path = repo.unwrap_or_else(|| PathBuf::from("."));
    let repo = Arc::new(GitCli::open(&repo_path).await?);
    info!(root = %repo.root().display(), "Opened repository");

    install_panic_hook();
    let terminal = Arc::new(CrosstermTerminal::new(Duration::from_millis(
        config.escape_delay_ms,
    ))?);

    let (channels, receivers) = Channels::new();
    let screen = Arc::new(MainView::for_repository(
        repo,
        channels.clone(),
        bindings.clone(),
        config.commit_limit,
    ));
    let engine = Engine::new(
        channels,
        receivers,
        terminal.clone(),
        screen,
        bindings,
        EngineSettings::from(&config),
    );

    let startup_errors = config_errors.into_iter().map(TwigError::from).collect();
    let result = match engine.initialise(startup_errors).await {
        Ok(()) => engine.run().await,
        Err(err) => Err(err),
    };

    terminal.restore().await?;
    result?;
    Ok(())
}

/// Put the terminal back before the default hook prints the panic.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = lifecycle::leave_screen();
        previous(info);
    }));
}

fn print_bindings(bindings: &KeyBindings, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{:<12} {:<12} ACTION", "VIEW", "KEYS")?;
    for (view, keys, binding) in bindings.entries() {
        let target = match binding {
            Binding::Action(action) => action.name().to_string(),
            Binding::Keystring(replacement) => format!("-> {replacement}"),
        };
        writeln!(out, "{:<12} {:<12} {target}", view.name(), keys)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::ActionType;
    use crate::views::ViewId;

    #[test]
    fn repository_argument_and_global_flags_parse() {
        let args = Args::try_parse_from(["twig", "../repo", "--log", "twig.log"]).unwrap();
        assert_eq!(args.repo, Some(PathBuf::from("../repo")));
        assert_eq!(args.log, Some(PathBuf::from("twig.log")));
        assert!(args.command.is_none());
    }

    #[test]
    fn bindings_subcommand_parses() {
        let args = Args::try_parse_from(["twig", "bindings", "--config", "c.toml"]).unwrap();
        assert_eq!(args.command, Some(Commands::Bindings));
        assert_eq!(args.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn binding_table_lists_actions_and_mappings() {
        let mut bindings = KeyBindings::new();
        bindings.bind_action(ViewId::All, "q", ActionType::Exit);
        bindings.bind_keystring(ViewId::Commit, "x", "gg");

        let mut out = Vec::new();
        print_bindings(&bindings, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("all"));
        assert!(lines[1].ends_with("exit"));
        assert!(lines[2].starts_with("commit"));
        assert!(lines[2].ends_with("-> gg"));
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let (config, errors) = load_config(Some(dir.path().join("absent.toml")));
        assert_eq!(config, Config::default());
        assert!(errors.is_empty());
    }
}
