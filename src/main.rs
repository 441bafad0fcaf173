//! datasight - document analysis with multi-provider LLM commentary.
//!
//! A tool for decoding tabular and text documents and collecting analysis
//! commentary from multiple LLM providers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use datasight::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let default_filter = if cli::is_verbose() {
        "datasight=info"
    } else {
        "datasight=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Run CLI
    cli::run().await
}
