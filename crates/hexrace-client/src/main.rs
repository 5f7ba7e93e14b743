//! Hexrace terminal client.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod coordinator;
mod protocol;
mod runtime;
mod session;
mod store;

use config::ClientConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ClientConfig::from_env()?;

    info!("Starting Hexrace client...");

    runtime::run(config).await
}
