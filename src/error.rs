use std::fmt;

/// Configuration error
///
/// Returned while resolving [`LoadTestConfig`](crate::config::LoadTestConfig) from the
/// environment or command line, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Profile name is not one of `smoke`, `load`, `stress`, `spike`
    InvalidProfile {
        /// The rejected profile name
        value: String,
    },
    /// Base URL cannot be parsed or is not http(s)
    InvalidBaseUrl {
        /// The rejected URL
        url: String,
        /// Parser or scheme complaint
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidProfile { value } => {
                write!(
                    f,
                    "Configuration error: Unknown profile '{}'. \
                    Expected one of: smoke, load, stress, spike",
                    value
                )
            }
            ConfigError::InvalidBaseUrl { url, reason } => {
                write!(
                    f,
                    "Configuration error: Invalid base URL '{}': {}. \
                    Expected format: http(s)://host:port (e.g., http://localhost:1323)",
                    url, reason
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
