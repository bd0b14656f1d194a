//! Model Scout CLI.
//!
//! Lists a platform's models, probes each one with a 1-token chat
//! completion across a bounded worker pool, and writes a JSON or YAML
//! report of which models are callable. Logs go to stderr; the report
//! goes to stdout or `--output-file`.

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use model_scout::config::{build_adapter, Cli, Command, ScanConfig};
use model_scout::runner::run_scan;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}", render_error(&e));
        std::process::exit(1);
    }
}

/// One line, outermost context first, no backtrace.
fn render_error(err: &anyhow::Error) -> String {
    format!("error: {err:#}")
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "model_scout=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan(args) => {
            let config = ScanConfig::from_args(args)?;
            let adapter = build_adapter(&config).context("Failed to initialize platform adapter")?;

            info!(
                "🔭 Model Scout v{} scanning {} ({} workers)",
                env!("CARGO_PKG_VERSION"),
                config.platform,
                config.workers.max(1)
            );

            let cancel = CancellationToken::new();
            spawn_cancel_triggers(&cancel, &config);

            run_scan(&config, adapter, &cancel).await?;
        }
    }

    Ok(())
}

/// Ctrl-C and the optional `--deadline` both cancel the scan.
fn spawn_cancel_triggers(cancel: &CancellationToken, config: &ScanConfig) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling scan");
            on_signal.cancel();
        }
    });

    if let Some(deadline) = config.deadline {
        let on_deadline = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = on_deadline.cancelled() => {}
                _ = tokio::time::sleep(deadline) => {
                    warn!(deadline = %humantime::format_duration(deadline), "Scan deadline reached, cancelling");
                    on_deadline.cancel();
                }
            }
        });
    }
}
