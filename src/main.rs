use anyhow::{anyhow, Result};
use clap::Parser;
use site_deploy::cli::{run, Cli};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) -> Result<()> {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // stdout is reserved for the command lines and status markers.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    tracing::info!("CLI arguments parsed, invoking run");

    match run(cli).await {
        Ok(_) => {
            tracing::info!("CLI completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, code = e.exit_code(), "CLI exited with error");
            std::process::exit(e.exit_code());
        }
    }
}
