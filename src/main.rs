use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod export;
mod extract;
mod settings;
mod slack;
mod trade;

use export::Table;
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let settings = Settings::new().context("Failed to load settings from environment")?;
    let client = slack::Client::new(&settings.slack);
    let messages = client
        .fetch_messages(&settings.app.oldest, settings.app.limit)
        .await
        .context("Failed to fetch messages")?;
    info!(count = messages.len(), "Fetched messages");
    let table = Table::from_messages(&messages);
    table
        .export(&settings.app.output)
        .context("Failed to export trades")?;
    info!(rows = table.rows().len(), path = %settings.app.output, "Exported trades");
    Ok(())
}
