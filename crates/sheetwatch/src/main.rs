//! sheetwatch command line entry point

use anyhow::Context;
use clap::Parser;
use sheetwatch::{logging, Cli, WatchConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    let config = WatchConfig::from_cli(cli).context("invalid configuration")?;
    let report = sheetwatch::run(config)
        .await
        .map_err(|error| {
            tracing::error!(%error, "run aborted");
            error
        })
        .context("run aborted")?;

    let summary = report.summary();
    if summary.failed > 0 {
        tracing::warn!(failed = summary.failed, "some records could not be checked");
    }
    Ok(())
}
