// Roster optimizer entry point.
//
// 1. Parse arguments, initialize tracing (stderr or --log-file)
// 2. Load config (defaults unless --config is given), apply overrides
// 3. Run the pipeline and print the report to stdout
// Any error prints one line to stderr and exits 1.

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use roster_optimizer::cli::Cli;
use roster_optimizer::config;
use roster_optimizer::pipeline;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_file.as_deref(), cli.verbose) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    match try_main(&cli).await {
        Ok(report) => println!("{report}"),
        Err(e) => {
            error!("run failed: {:#}", e);
            eprintln!("error: {e:#}");
            // Exit without waiting on a solver thread abandoned by a timeout.
            std::process::exit(1);
        }
    }
}

async fn try_main(cli: &Cli) -> anyhow::Result<String> {
    let mut config =
        config::load_config(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(secs) = cli.timeout_secs {
        config.solver.timeout_secs = Some(secs);
        config::validate(&config).context("invalid --timeout-secs")?;
    }
    info!(
        "roster rules: budget {:.2}, {} F / {} D",
        config.roster.budget_cap, config.roster.forwards, config.roster.defensemen
    );

    let report = pipeline::run(&cli.input, &config).await?;
    Ok(report)
}

/// Initialize tracing. Logs go to stderr, or to `log_file` without ANSI
/// colours, so stdout carries only the report.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "roster_optimizer=debug,info"
    } else {
        "roster_optimizer=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = fmt::Subscriber::builder()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
