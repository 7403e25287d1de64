//! Tracing initialization for the `astgen` binary.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter, e.g. `ASTGEN_LOG=astgen=debug`.
pub const LOG_ENV: &str = "ASTGEN_LOG";

const DEFAULT_FILTER: &str = "astgen=warn";

static INIT: Once = Once::new();

/// Installs the global subscriber. Logs go to stderr so JSON on stdout stays
/// clean. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // Another subscriber may already be installed when embedded.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .with(filter)
            .try_init();
    });
}
