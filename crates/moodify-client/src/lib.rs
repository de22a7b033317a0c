//! # moodify-client
//!
//! Application core for the Moodify client: the [`session::Session`] that
//! owns the user's recorded data, the endpoint wrapper for the Moodify API
//! server, and the one-way mirror to the hosted research database.

pub mod api;
pub mod config;
pub mod error;
pub mod mirror;
pub mod session;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use session::{Gate, Session, WelcomeForm};

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("moodify_client=debug,moodify_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
