//! Bit Timer CLI - an interval training (HIIT) timer
//!
//! Alternates work and rest phases for a configured number of sets:
//! - 25 seconds of work
//! - 10 seconds of rest
//! - 3 sets

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};

use bit_timer::cli::{Cli, Commands, Display, IpcClient, MusicCommand};
use bit_timer::daemon::{self, ipc::default_socket_path, DaemonConfig};
use bit_timer::media;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Some(Commands::Daemon(_)), false) => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `default_level` when set.
fn init_tracing(default_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Daemon(args) => {
            let socket_path = match cli.socket {
                Some(path) => path,
                None => default_socket_path()?,
            };
            daemon::run(DaemonConfig {
                socket_path,
                session: args.session_config(),
            })
            .await?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
        command => {
            let client = IpcClient::from_option(cli.socket)?;
            run_client_command(&client, command).await?;
        }
    }

    Ok(())
}

/// Runs a command that talks to the daemon.
async fn run_client_command(client: &IpcClient, command: Commands) -> Result<()> {
    match command {
        Commands::Start => Display::show_action(&client.start().await?),
        Commands::Pause => Display::show_action(&client.pause().await?),
        Commands::Toggle => Display::show_action(&client.toggle().await?),
        Commands::Reset => Display::show_action(&client.reset().await?),
        Commands::Skip => Display::show_action(&client.skip().await?),
        Commands::Ack => Display::show_action(&client.ack().await?),
        Commands::Set(args) => {
            let value = args.parsed_value()?;
            Display::show_action(&client.set(args.setting, value).await?)
        }
        Commands::Status => {
            let response = client.status().await?;
            Display::show_status(&response);
            acknowledge_if_finished(client, &response).await?;
        }
        Commands::Watch => watch(client).await?,
        Commands::Settings => Display::show_settings(&client.settings().await?),
        Commands::Music(MusicCommand::List) => Display::show_tracks(&client.tracks().await?),
        Commands::Music(MusicCommand::Select { track }) => {
            Display::show_action(&client.select_track(&track).await?)
        }
        Commands::Music(MusicCommand::Open) => {
            let response = client.tracks().await?;
            let track = response
                .data
                .and_then(|data| data.track)
                .context("The daemon did not report a track")?;
            media::open_in_browser(&track)?;
            println!("* Opening {}", track.title);
        }
        Commands::Daemon(_) | Commands::Completions { .. } => {
            anyhow::bail!("this command does not talk to the daemon")
        }
    }

    Ok(())
}

/// Clears the completion flag once the notice has been shown.
async fn acknowledge_if_finished(
    client: &IpcClient,
    response: &bit_timer::IpcResponse,
) -> Result<()> {
    let finished = response
        .data
        .as_ref()
        .and_then(|data| data.is_finished)
        .unwrap_or(false);
    if finished {
        client.ack().await?;
    }
    Ok(())
}

/// Redraws the countdown once per second until the session completes or
/// Ctrl+C is pressed.
async fn watch(client: &IpcClient) -> Result<()> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    let mut stdout = std::io::stdout();

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                return Ok(());
            }
        }

        let response = client.status().await?;
        let Some(data) = &response.data else {
            continue;
        };

        if data.is_finished == Some(true) {
            println!();
            Display::show_completion();
            acknowledge_if_finished(client, &response).await?;
            return Ok(());
        }

        if let Some(line) = Display::render_summary(data) {
            print!("\r{:<40}", line);
            stdout.flush()?;
        }
    }
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
