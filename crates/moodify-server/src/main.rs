//! # moodify-server
//!
//! HTTP API behind the Moodify app.
//!
//! This binary provides:
//! - **Mood insight** and **daily check-in question** endpoints backed by a
//!   generative-language model, with canned fallbacks when it is unavailable
//! - **Feedback relay** to the team inbox through a transactional e-mail API
//! - The static **support resource** directory
//! - **Per-IP rate limiting** to protect the model quota

mod api;
mod config;
mod error;
mod gemini;
mod mailer;
mod prompts;
mod rate_limit;

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::AppState;
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,moodify_server=debug")),
        )
        .init();

    info!("Starting Moodify API server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, AI endpoints will serve fallbacks");
    }
    if config.resend_api_key.is_none() {
        tracing::warn!("RESEND_API_KEY not set, feedback relay will fail");
    }

    let state = AppState::from_config(&config);

    // Evict buckets idle for 10 minutes, every 5 minutes.
    let rl = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rl.purge_stale(Duration::from_secs(600)).await;
        }
    });

    tokio::select! {
        result = api::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
