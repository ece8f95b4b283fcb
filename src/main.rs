use anyhow::Result;
use clap::{Parser, Subcommand};
use orweja_kalender::config::{KalenderConfig, load_config};
use orweja_kalender::model::RegistrationStatus;
use orweja_kalender::service::Kalender;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "orweja-kalender",
    about = "Scraper for the Orweja wedstrijdkalender"
)]
struct Cli {
    /// Optional TOML config overriding the built-in Orweja defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one extraction cycle and print the resulting records.
    Fetch {
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Only show events in this category.
        #[arg(long)]
        category: Option<String>,
        /// Only show events with this registration status (open, closed, pending).
        #[arg(long)]
        status: Option<RegistrationStatus>,
    },
    /// Load and validate a config file without fetching anything.
    Validate { config_file: PathBuf },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            json,
            category,
            status,
        } => {
            let config = match &cli.config {
                Some(path) => load_config(path)?,
                None => KalenderConfig::default(),
            };
            let kalender = Kalender::new(config);
            let report = kalender.refresh()?;

            info!(
                endpoints = report.endpoints_tried,
                endpoint = report.winning_endpoint.as_deref().unwrap_or("-"),
                candidates = report.candidates_seen,
                records = report.records_published,
                "fetch complete"
            );

            let events = kalender.filter(category.as_deref(), status);
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                for event in &events {
                    println!(
                        "{}  {:<30} {:<10} {:<24} {}",
                        event.date,
                        event.event_type,
                        event.category,
                        event.location,
                        event.status.label()
                    );
                }
            }
        }
        Commands::Validate { config_file } => {
            let config = load_config(&config_file)?;
            println!(
                "OK: {} endpoints, policy {:?}",
                config.endpoints.len(),
                config.parse.policy
            );
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
