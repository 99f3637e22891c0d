use clap::Parser;
use jotti_uploader::infrastructure::jotti::setup_submitter;
use jotti_uploader::{EXIT_FAILURE, ScanConfig};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "jotti")]
#[command(version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), "\n", env!("CARGO_PKG_REPOSITORY")))]
#[command(about = "Upload files to Jotti's malware scan, skipping files it already knows")]
struct Cli {
    #[arg(help = "Files to scan")]
    files: Vec<PathBuf>,

    #[arg(long, help = "Print author credit")]
    credits: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr, stdout carries the per-file results
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jotti=info,jotti_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.credits {
        eprintln!("Coded by {} ;)", env!("CARGO_PKG_AUTHORS"));
        return Ok(());
    }

    if cli.files.is_empty() {
        error!("Usage: jotti <file_to_scan>");
        std::process::exit(EXIT_FAILURE);
    }

    let config = ScanConfig::from_env();
    let submitter = setup_submitter(&config)?;

    let mut stdout = std::io::stdout();
    match submitter.run(&cli.files, &mut stdout).await {
        Ok(summary) => {
            info!(
                "✅ Done with {} files: {} uploaded, {} already scanned, {} skipped, {} failed",
                summary.total(),
                summary.uploaded,
                summary.already_scanned,
                summary.skipped,
                summary.failed
            );
            Ok(())
        }
        Err(e) => std::process::exit(e.exit_code()),
    }
}
