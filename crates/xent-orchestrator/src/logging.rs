//! Logging setup for binaries.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,xent_runtime=info,xent_orchestrator=info";

/// Initialize logging with a default filter.
///
/// Use the `RUST_LOG` environment variable to override the default filter.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt().with_env_filter(filter).with_target(false).init();
}
