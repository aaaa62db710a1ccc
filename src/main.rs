mod audit;
mod cli;
mod kubernetes;
mod report;
mod scanner;
#[cfg(test)]
mod tests;
mod types;
mod utils;

use clap::Parser;
use std::time::Duration;

use cli::Cli;
use kubernetes::KubeCluster;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // All diagnostics go to stderr; stdout carries only the report.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let since_seconds = utils::parse_since(&cli.since)?;

    let cluster = KubeCluster::connect().await?;
    let options = audit::ScanOptions {
        namespace: cli.namespace,
        since_seconds,
        tail_lines: cli.tail,
        timeout: Duration::from_secs(cli.timeout),
        concurrency: cli.concurrency,
    };

    let report = audit::run(&cluster, &options).await?;
    print!("{report}");
    Ok(())
}
