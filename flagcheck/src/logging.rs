//! Development-time tracing for debugging constraint evaluation.
//!
//! Tracing output goes to stderr and is controlled by `RUST_LOG`. It is
//! separate from constraint diagnostics, which are part of the command's
//! product output and are printed whatever the log level.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Used when `RUST_LOG` is unset or unparsable: pass summaries from this
/// crate, warnings from everything else.
const DEFAULT_FILTER: &str = "warn,flagcheck=info";

/// Initialize the tracing subscriber on stderr.
///
/// # Example
/// ```bash
/// RUST_LOG=flagcheck=debug flagcheck check --mode auto-correct
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
