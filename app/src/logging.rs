use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber, filtered by `RUST_LOG` (default `info`).
///
/// Library crates log through the `log` facade; the subscriber's log bridge
/// picks those records up as well.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    tracing::debug!("Logging setup complete.");
}
