//! PartScout interactive shell.
//!
//! Imports a parts catalog from a spreadsheet, then finds part codes by
//! free-form text or photograph via the remote matching service.

mod shell;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use partscout_core::config::AppConfig;
use partscout_core::session::{LoadResolution, SearchSession};
use partscout_matcher::MatcherClient;

#[derive(Parser, Debug)]
#[command(name = "partscout")]
#[command(about = "Find part codes by text or photo against a parts catalog")]
struct Args {
    /// Matcher endpoint URL (falls back to PARTSCOUT_ENDPOINT, then the
    /// built-in default)
    #[arg(long)]
    endpoint: Option<String>,

    /// Catalog workbook to import at startup
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let endpoint = args
        .endpoint
        .or_else(|| std::env::var(AppConfig::ENDPOINT_ENV_VAR).ok());
    let matcher = MatcherClient::new(endpoint.as_deref());
    info!("Matcher endpoint: {}", matcher.endpoint());

    let session = Arc::new(SearchSession::new(Arc::new(matcher)));

    if let Some(path) = &args.catalog {
        match session.load_catalog(path).await {
            Ok(LoadResolution::Loaded(count)) => println!("Catalog loaded: {count} parts."),
            Ok(LoadResolution::Superseded) => {}
            Err(err) => eprintln!("{err}"),
        }
    }

    shell::run(session).await
}
