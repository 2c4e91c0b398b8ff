//! Raven CLI binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use raven_cli::cli::{Cli, Commands};
use raven_cli::commands::{
    ChatCommand, MetricsCommand, SendCommand, SessionsCommand, SettingsCommand, TerminateCommand,
    WatchCommand,
};
use raven_cli::{CliError, Context, OutputFormat, SettingsStore};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("raven=info,raven_cli=info,raven_link=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    // Settings commands never touch the network, so they skip link resolution.
    if let Commands::Settings { command } = &cli.command {
        let store = SettingsStore::resolve(cli.settings.as_deref())?;
        return SettingsCommand::new(&store).execute(&mut stdout, &format, command);
    }

    let ctx = Context::from_cli(&cli)?;
    debug!(endpoint = %ctx.link.endpoint, "resolved gateway");

    match &cli.command {
        Commands::Watch => {
            let stop = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %e, "cannot listen for interrupt");
                    std::future::pending::<()>().await;
                }
            };
            WatchCommand::new(&ctx).execute(&mut stdout, &format, stop).await?;
        }
        Commands::Chat => {
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            ChatCommand::new(&ctx).execute(input, &mut stdout, &format).await?;
        }
        Commands::Sessions => {
            SessionsCommand::new(&ctx).execute(&mut stdout, &format).await?;
        }
        Commands::Metrics => {
            MetricsCommand::new(&ctx).execute(&mut stdout, &format).await?;
        }
        Commands::Terminate { session_id } => {
            TerminateCommand::new(&ctx)
                .execute(&mut stdout, &format, session_id)
                .await?;
        }
        Commands::Send { payload, wait } => {
            SendCommand::new(&ctx)
                .execute(&mut stdout, &format, payload, *wait)
                .await?;
        }
        Commands::Settings { .. } => {}
    }

    Ok(())
}
