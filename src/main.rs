//! Moderation AI - content classifier with a moderator feedback loop

use moderation_ai::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Rustls 0.23+ needs an explicit crypto provider for HTTPS
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install Rustls crypto provider"))?;

    // WARN by default, use RUST_LOG=info for per-classification logs
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run().await
}
