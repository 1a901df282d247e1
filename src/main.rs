use color_eyre::Result;
use tracing::info;

use fomo::adapters::FileCredentialsProvider;
use fomo::cli::{parse_args, run_cli_command, CliCommand};
use fomo::config::ClientConfig;
use fomo::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let command = parse_args(std::env::args());

    // Chat owns the terminal; everything else may log to stderr
    if matches!(command, CliCommand::Chat(_)) {
        init_logging("info");
    } else {
        fomo::logging::init_logging_at(None, "warn");
    }

    let config = ClientConfig::from_env();
    info!("fomo {} starting", fomo::cli::VERSION);

    let credentials = FileCredentialsProvider::new()?;
    run_cli_command(command, &config, &credentials).await
}
