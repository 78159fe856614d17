use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{CliError, Result};

/// Installs the process-wide subscriber. Records go to stderr so stdout only
/// carries command output. `RUST_LOG` takes precedence over the configured
/// filter.
pub(crate) fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), &config.filter)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(CliError::LogInit)
}

/// An invalid `RUST_LOG` is an error rather than a silent fallback.
fn build_filter(env_directives: Option<String>, configured: &str) -> Result<EnvFilter> {
    let directives = env_directives.as_deref().unwrap_or(configured);
    Ok(EnvFilter::try_new(directives)?)
}
