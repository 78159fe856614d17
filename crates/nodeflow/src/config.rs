use std::path::{Path, PathBuf};
use std::time::Duration;

use nodeflow_operations::operations::WorkflowSettings;
use nodeflow_saga::{DEFAULT_RETRY_DELAY, RetryPolicy};
use serde::Deserialize;

use crate::error::{CliError, Result};

pub(crate) const DEFAULT_CONFIG_FILE: &str = "nodeflow.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoggingConfig {
    pub(crate) filter: String,
    pub(crate) format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: String::from("info"),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct StepRetryConfig {
    max_attempts: Option<u32>,
    delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RetryConfig {
    default_delay_ms: Option<u64>,
    index_keywords: StepRetryConfig,
    remove_keywords: StepRetryConfig,
    publish_event: StepRetryConfig,
}

impl RetryConfig {
    fn policy(&self, step: StepRetryConfig, fallback: RetryPolicy) -> RetryPolicy {
        let delay = step
            .delay_ms
            .or(self.default_delay_ms)
            .map_or(DEFAULT_RETRY_DELAY, Duration::from_millis);
        RetryPolicy::new(
            step.max_attempts.unwrap_or(fallback.max_attempts()),
            delay,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) logging: LoggingConfig,
    pub(crate) retry: RetryConfig,
}

impl Config {
    /// Loads `path`, or `nodeflow.toml` from the working directory when no
    /// path is given. Only an explicitly requested file has to exist.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::read(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub(crate) fn workflow_settings(&self) -> WorkflowSettings {
        let defaults = WorkflowSettings::default();
        WorkflowSettings {
            index_keywords: self
                .retry
                .policy(self.retry.index_keywords, defaults.index_keywords),
            remove_keywords: self
                .retry
                .policy(self.retry.remove_keywords, defaults.remove_keywords),
            publish_event: self
                .retry
                .policy(self.retry.publish_event, defaults.publish_event),
        }
    }
}
