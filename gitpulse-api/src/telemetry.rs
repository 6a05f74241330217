//! Tracing Initialization
//!
//! Sets up the tracing subscriber for the process. Call once at startup
//! before any tracing occurs.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to debug-level logs for
/// the API itself and info elsewhere.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gitpulse_api=debug,tower_http=debug,info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
