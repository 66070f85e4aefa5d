pub mod config;
pub mod error;

pub use config::{AemetConfig, Config, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Initialize logging for the application.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    init_with_default("info")
}

/// Initialize logging with `default_filter` when `RUST_LOG` is unset.
///
/// Logs go to stderr so they never mix with output written to stdout.
pub fn init_with_default(default_filter: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing::subscriber::set_global_default(subscriber(filter, std::io::stderr))
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::debug!("Tiempo core initialized");
    Ok(())
}

fn subscriber<W>(filter: EnvFilter, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .finish()
}
