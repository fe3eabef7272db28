use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use patient_portal_app::cli::Cli;
use patient_portal_app::config::AppConfig;
use patient_portal_app::session::{ErrorResponse, Session};
use patient_portal_data::database::BackendType;

/// Entry point for the patient portal command line
///
/// Loads `.env`, sets up logging on stderr, opens the configured store,
/// runs one command and prints its JSON result on stdout.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .with(env_filter)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("Invalid storage configuration")?;
    if let Some(backend) = &cli.backend {
        config.backend.backend_type = BackendType::parse(backend).context("Invalid --backend")?;
    }
    if let Some(dir) = &cli.data_dir {
        config.backend.sqlite_path = sqlite_path_in(dir, &config.backend.sqlite_path);
        config.backend.data_dir = dir.clone();
    }

    let mut session = Session::open(config).await?;

    match session.run(cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
            info!("Exiting with status {}", e.exit_code());
            std::process::exit(e.exit_code());
        }
    }
}

/// Move the SQLite file into `dir`, keeping its file name
fn sqlite_path_in(dir: &std::path::Path, current: &std::path::Path) -> PathBuf {
    match current.file_name() {
        Some(name) => dir.join(name),
        None => dir.join(patient_portal_data::database::DEFAULT_SQLITE_FILE),
    }
}
