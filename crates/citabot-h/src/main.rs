mod backend;
mod cdp;
mod probe;

use anyhow::bail;
use backend::HeadlessBackend;
use citabot_engine::config::{BookingConfig, ConfigLoader, Consultation};
use citabot_engine::flow::RunOutcome;
use citabot_engine::session;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Books a cardiology appointment slot", long_about = None)]
struct Args {
    /// Booking page URL (overrides config)
    #[arg(long)]
    url: Option<String>,

    /// Run with a visible browser window instead of headless
    #[arg(long)]
    visible: bool,

    /// Consultation type: primera-vez, primera-vez-pediatrica, control, control-pediatrica
    #[arg(long)]
    consultation: Option<Consultation>,

    /// City to select in the location section
    #[arg(long)]
    city: Option<String>,

    /// Path to a YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Close the browser immediately instead of pausing for review
    #[arg(long)]
    no_pause: bool,

    /// Per-step timeout in seconds (overrides config)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr so stdout stays clean for the review prompt
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = load_config(&args).await?;

    info!("Starting citabot...");
    info!(
        "Consultation: {}, city: {}, professional: {}",
        config.consultation, config.city, config.professional
    );

    let mut driver = HeadlessBackend::new(args.visible);
    let pause = !args.no_pause;
    let report = session::run_booking(&mut driver, &config, || hold_for_review(pause)).await?;

    for record in &report.steps {
        match record.strategy {
            Some(strategy) => info!("  {} -> {:?} (via {})", record.name, record.status, strategy),
            None => info!("  {} -> {:?}", record.name, record.status),
        }
    }

    match report.outcome {
        RunOutcome::Success => {
            info!("Booking flow completed: {}", report.outcome);
            Ok(())
        }
        RunOutcome::CompletedWithWarnings => {
            warn!("Booking flow completed with warnings: {}", report.outcome);
            Ok(())
        }
        RunOutcome::Failed => {
            let step = report.failed_step.unwrap_or("unknown");
            bail!("booking flow failed at step '{}'", step);
        }
    }
}

async fn load_config(args: &Args) -> anyhow::Result<BookingConfig> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(consultation) = args.consultation {
        config.consultation = consultation;
    }
    if let Some(city) = &args.city {
        config.city = city.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.step_timeout_secs = secs;
    }
    Ok(config)
}

/// Keeps the browser open so the operator can inspect or finish the booking
/// by hand. Enter (or EOF, when stdin is not a terminal) resumes teardown.
async fn hold_for_review(pause: bool) {
    if !pause {
        return;
    }
    use tokio::io::AsyncBufReadExt;
    println!("Press Enter to close the browser...");
    let mut line = String::new();
    let mut reader = tokio::io::BufReader::new(tokio::io::stdin());
    if let Err(e) = reader.read_line(&mut line).await {
        warn!("Failed to read from stdin, closing immediately: {}", e);
    }
}
