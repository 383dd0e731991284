//! Error taxonomy for the scene subsystem

use thiserror::Error;

/// Failure to fetch or decode an external asset (model or environment map).
///
/// Always recovered locally: the caller substitutes a fallback and logs the
/// error. It is never retried and never shown to the viewer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load asset {url}: {reason}")]
pub struct AssetLoadError {
    pub url: String,
    pub reason: String,
}

impl AssetLoadError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Fatal scene initialization errors
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Viewport container is unavailable")]
    ViewportUnavailable,
    #[error("Viewport container has no area ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
