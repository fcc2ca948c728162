//! Error types for loading and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching an image resource.
///
/// Cloneable so a single failed fetch can be reported to every caller that
/// was awaiting it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The resource does not exist.
    #[error("Image not found: {url}")]
    NotFound { url: String },

    /// Generic I/O failure while reading the resource.
    #[error("I/O error loading {url}: {message}")]
    Io { url: String, message: String },

    /// The resource was read but is not a usable image.
    #[error("Cannot decode {url}: {message}")]
    Decode { url: String, message: String },

    /// The slot index is outside the sequence.
    #[error("Slot {relative} is out of range (total {total})")]
    OutOfRange { relative: usize, total: usize },

    /// The load task ended without producing a result.
    #[error("Load of {url} was aborted")]
    Aborted { url: String },
}

impl LoadError {
    /// Create an I/O error with URL context.
    pub fn io(url: impl Into<String>, source: &std::io::Error) -> Self {
        let url = url.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { url },
            _ => Self::Io {
                url,
                message: source.to_string(),
            },
        }
    }

    /// Create a decode error.
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }
}

/// Errors from building or reading a navigator configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field failed validation.
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// The configuration file could not be read.
    #[error("Cannot read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for a navigator.
    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<crate::config::NavigatorConfigBuilderError> for ConfigError {
    fn from(err: crate::config::NavigatorConfigBuilderError) -> Self {
        Self::Invalid {
            message: err.to_string(),
        }
    }
}

/// Errors returned by navigator commands that are not navigation requests.
#[derive(Debug, Error)]
pub enum NavigatorError {
    /// A transition is in flight; the command cannot run now.
    #[error("A transition is in progress")]
    Busy,

    /// The sequence has no pages.
    #[error("The sequence is empty")]
    Empty,

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
