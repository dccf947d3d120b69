//! Pomodoro Clock CLI
//!
//! Runs the timer daemon or talks to it:
//! - `invoke` starts a pomodoro, ends overtime or kills the running phase
//! - `pause`, `resume`, `toggle-pause` and `kill` control the running phase
//! - `status` shows the phase, remaining time and cycle count

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use pomodoro_clock::cli::{
    ask_stdin, resolve_answers, Cli, Commands, DaemonArgs, Display, IpcClient,
};
use pomodoro_clock::config::{default_config_path, default_socket_path};
use pomodoro_clock::daemon::{self, DaemonOptions};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let socket = cli.socket;

    match cli.command {
        Some(Commands::Invoke(args)) => {
            let client = client(socket)?;
            let status = client.status().await?;
            let answers = match &status.data {
                Some(data) => resolve_answers(data, &args, ask_stdin),
                None => Default::default(),
            };
            let response = client.invoke(args.task.clone(), answers).await?;
            Display::show_invoke_result(&response);
        }
        Some(Commands::Pause) => {
            let response = client(socket)?.pause().await?;
            Display::show_result(&response);
        }
        Some(Commands::Resume) => {
            let response = client(socket)?.resume().await?;
            Display::show_result(&response);
        }
        Some(Commands::TogglePause) => {
            let response = client(socket)?.toggle_pause().await?;
            Display::show_result(&response);
        }
        Some(Commands::Kill) => {
            let response = client(socket)?.kill().await?;
            Display::show_result(&response);
        }
        Some(Commands::Status) => {
            let response = client(socket)?.status().await?;
            Display::show_status(&response);
        }
        Some(Commands::Daemon(args)) => {
            daemon::run(daemon_options(socket, args)?).await?;
        }
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

fn client(socket: Option<PathBuf>) -> Result<IpcClient> {
    match socket {
        Some(path) => Ok(IpcClient::with_socket_path(path)),
        None => IpcClient::new(),
    }
}

fn daemon_options(socket: Option<PathBuf>, args: DaemonArgs) -> Result<DaemonOptions> {
    let socket_path = match socket {
        Some(path) => path,
        None => default_socket_path().context("Cannot determine the home directory")?,
    };
    let config_path = match args.config {
        Some(path) => path,
        None => default_config_path().context("Cannot determine the home directory")?,
    };
    Ok(DaemonOptions {
        socket_path,
        config_path,
    })
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
