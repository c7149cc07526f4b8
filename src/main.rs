//! Restaurant Scout - restaurant search by location and cuisine
//!
//! Prompts for a location and a restaurant type, fetches listings through the
//! request cache, and prints aggregate views of the results.

use std::io;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use restaurant_scout::cache::CacheStore;
use restaurant_scout::cli::{Cli, Settings};
use restaurant_scout::data::{BusinessSearchClient, GeocodeClient};
use restaurant_scout::db::Database;
use restaurant_scout::fetch::FetchGateway;
use restaurant_scout::session::Session;

/// Logs go to stderr so the prompts on stdout stay readable
fn init_logging(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;
    init_logging(settings.log_level());

    let store = CacheStore::load(&settings.cache_path);
    tracing::info!(
        path = %store.path().display(),
        entries = store.len(),
        "request cache ready"
    );
    let db = Database::open(&settings.database_path)?;

    let mut session = Session::new(
        FetchGateway::new(store),
        db,
        GeocodeClient::new(settings.google_key),
        BusinessSearchClient::new(settings.yelp_key),
    );

    let stdin = io::stdin();
    session.run_interactive(stdin.lock(), io::stdout()).await?;

    Ok(())
}
