mod config;

use clap::Parser;
use config::{AppConfig, Cli, FileConfig};
use dnr_core::{build_generator, BriefingRun, TelegramDispatcher};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Startup failures (bad config, missing secrets) exit with this code.
const EXIT_CONFIG_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let run = match build_run(cli) {
        Ok(run) => run,
        Err(e) => {
            error!("❌ Configuration error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let today = chrono::Local::now().date_naive();
    let outcome = run.execute(today).await;
    info!("Run finished: exit code {}", outcome.exit_code());

    ExitCode::from(outcome.exit_code() as u8)
}

fn build_run(cli: Cli) -> anyhow::Result<BriefingRun> {
    let file = FileConfig::from_cli(cli.config.as_deref())?;
    let config = AppConfig::resolve(cli, file)?;

    info!(
        "Provider: {} (model {}, max {} output tokens)",
        config.provider, config.generation.model, config.generation.max_output_tokens
    );

    let generator = build_generator(config.provider, config.api_key, config.generation)?;
    let dispatcher = TelegramDispatcher::new(config.telegram)?;
    Ok(BriefingRun::new(generator, Arc::new(dispatcher)))
}
