//! Trawler main entry point
//!
//! This is the command-line interface for the Trawler file-server crawler.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trawler::{Crawlers, FileIndex, MemoryIndex};

/// Trawler: a file-server crawler
///
/// Trawler walks the configured FTP and HTTP servers in a continuous cycle,
/// respecting robots.txt and rate limits, and feeds every discovered file
/// into the indexing sink.
#[derive(Parser, Debug)]
#[command(name = "trawler")]
#[command(version = "1.0.0")]
#[command(about = "A file-server crawler", long_about = None)]
struct Cli {
    /// Path to JSON configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let index = Arc::new(MemoryIndex::new());
    let mut crawlers = Crawlers::new(cli.config.clone(), Arc::clone(&index) as Arc<dyn FileIndex>);

    // The initial load is the only fatal configuration error; later reloads
    // keep the running set on failure.
    tracing::info!("Loading configuration from: {}", cli.config.display());
    crawlers.reload()?;
    tracing::info!("Crawling {} targets", crawlers.target_count());

    wait_for_shutdown(&mut crawlers).await?;

    tracing::info!("Waiting for crawl tasks to finish");
    crawlers.run().await;

    tracing::info!("Indexed {} distinct files this run", index.file_count());
    Ok(())
}

/// Drives the orchestrator until shutdown is requested
///
/// SIGUSR1 triggers a configuration reload, Ctrl-C a graceful shutdown.
#[cfg(unix)]
async fn wait_for_shutdown(crawlers: &mut Crawlers) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut reload = signal(SignalKind::user_defined1())?;

    loop {
        tokio::select! {
            _ = reload.recv() => {
                tracing::info!("Reloading configuration");
                match crawlers.reload() {
                    Ok(()) => tracing::info!("Now crawling {} targets", crawlers.target_count()),
                    Err(e) => tracing::error!("Reload failed, keeping previous targets: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                crawlers.quit();
                return Ok(());
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(crawlers: &mut Crawlers) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    crawlers.quit();
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("trawler=info,warn"),
            1 => EnvFilter::new("trawler=debug,info"),
            2 => EnvFilter::new("trawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
