use std::error::Error;

use ai_llm_service::telemetry;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_TARGETS: &[&str] = &[
    ai_llm_service::telemetry::TARGET_PREFIX,
    comment_digest::TARGET_PREFIX,
    api::TARGET_PREFIX,
    "survey_digest",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file; real env vars win.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let filter = telemetry::env_filter_with_level("warn", LOG_TARGETS, Level::INFO);

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry::layer(LOG_TARGETS))
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "survey-digest starting");

    api::start().await?;

    Ok(())
}
