//! Chip factory command-line tool.
//!
//! Reads a YAML job file and, depending on the flags:
//! - checks that the image is accessible (`--check-image`)
//! - lists the image's bands (`--list-bands`)
//! - otherwise writes one chip per location to the output location
//!
//! Remote compute jobs read `EE_PROJECT`, `EE_API_URL`, `EE_ACCESS_TOKEN`
//! and `EE_TIMEOUT_SECS` from the environment (or a `.env` file).

mod config;
mod runner;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use earth_engine::EarthEngineConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::ChipJobConfig;
use runner::{Action, Outcome};

#[derive(Parser, Debug)]
#[command(name = "chipper")]
#[command(about = "Request image chips at point locations and write them to disk")]
struct Args {
    /// Job file (YAML)
    #[arg(short, long, env = "CHIPPER_CONFIG")]
    config: PathBuf,

    /// Override the job's output location
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Check that the image is accessible and exit
    #[arg(long, conflicts_with = "list_bands")]
    check_image: bool,

    /// List the image's bands and exit
    #[arg(long)]
    list_bands: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn action(&self) -> Action {
        if self.check_image {
            Action::CheckImage
        } else if self.list_bands {
            Action::ListBands
        } else {
            Action::Chip
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!("Starting chipper");

    let job = ChipJobConfig::load(&args.config)?;
    let factory = runner::build_factory(
        &job,
        args.output_dir.as_deref(),
        EarthEngineConfig::from_env(),
    )?;

    match runner::run(factory.as_ref(), &job, args.action()).await? {
        Outcome::Image(info) => {
            info!(image = %info.id, bands = info.bands.len(), "Image is accessible");
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Outcome::Bands(bands) => {
            for band in bands {
                println!("{}", band);
            }
        }
        Outcome::Chips(report) => {
            info!(
                variant = %report.variant,
                requested = report.requested,
                files = report.files_written(),
                bytes = report.total_bytes(),
                "Chipping finished"
            );
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
