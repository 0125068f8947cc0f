//! Contest Calendar — Binary Entrypoint
//! Fetches every enabled platform once and prints the merged feed to stdout
//! as JSON.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use contest_calendar::feed;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Logs go to stderr so the feed on stdout stays pipeable.
    init_tracing();

    let enabled = feed::config::load_sources_default()?;
    let sources = feed::providers::build_sources(&enabled);
    let records = feed::run_once(&sources).await;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
