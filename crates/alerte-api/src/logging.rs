//! Process-wide logging setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the tracing subscriber exactly once.
///
/// The mobile shell may bounce through its startup sequence more than once
/// per process (hot restart, activity recreation), so this has to be
/// idempotent and race-safe rather than a mutable "already initialized"
/// flag.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}
