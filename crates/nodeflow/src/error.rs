use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}'")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log filter")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to install log subscriber")]
    LogInit(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("workflow error")]
    Operation(#[from] nodeflow_operations::OperationError),
}

pub type Result<T> = std::result::Result<T, CliError>;
