//! Error types and handling for the stratus forecaster

use thiserror::Error;

/// Main error type for the stratus forecaster
#[derive(Error, Debug)]
pub enum StratusError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API returned something we could not interpret
    #[error("API error: {message}")]
    Api { message: String },

    /// A station's reports could not be fetched
    #[error("Source unavailable for {station}: {message}")]
    SourceUnavailable { station: String, message: String },

    /// The requested window or target time had no qualifying observation
    #[error("No data: {message}")]
    NoData { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StratusError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new source-unavailable error for one station
    pub fn source_unavailable<S: Into<String>, M: Into<String>>(station: S, message: M) -> Self {
        Self::SourceUnavailable {
            station: station.into(),
            message: message.into(),
        }
    }

    /// Create a new no-data error
    pub fn no_data<S: Into<String>>(message: S) -> Self {
        Self::NoData {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StratusError::Config { .. } => {
                "Configuration error. Please check your config file and environment.".to_string()
            }
            StratusError::Api { .. } => {
                "The aviation weather service returned an unexpected response.".to_string()
            }
            StratusError::SourceUnavailable { station, .. } => {
                format!("Observations for {station} are unavailable. Enter values manually.")
            }
            StratusError::NoData { message } => {
                format!("No data available: {message}")
            }
            StratusError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            StratusError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            StratusError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
