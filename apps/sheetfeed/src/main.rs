mod cli;

use anyhow::{Context, Result};
use cli::Command;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = cli::parse_args();

    match args.command {
        Command::ListDatasets => {
            for name in sheetfeed_core::dataset::names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Sync { dataset } => {
            let config = sheetfeed_config::load_config(&args.config_path)
                .with_context(|| format!("failed to load config {}", args.config_path.display()))?;

            sheetfeed_core::run_dataset(&config, &dataset).await?;
            info!("sync complete for dataset `{dataset}`");
            Ok(())
        }
    }
}
