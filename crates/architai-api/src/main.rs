//! ArchitAI command-line client.
//!
//! Binary name: `architai`
//!
//! Parses CLI arguments, loads configuration, then dispatches to the design
//! loop or the history commands.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use architai_observe::tracing_setup::{init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = cli::log_filter(cli.quiet, cli.verbose);
    if let Err(e) = init_tracing(filter, cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "architai", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.base_url.clone()).await?;

    let result = match cli.command {
        Commands::Design { prompt } => cli::design::run_design(&state, prompt, cli.json).await,
        Commands::History => cli::history::list_history(&state, cli.json).await,
        Commands::Show { session_id } => {
            cli::history::show_session(&state, &session_id, cli.json).await
        }
        Commands::Completions { .. } => Ok(()),
    };

    shutdown_tracing();
    result
}
