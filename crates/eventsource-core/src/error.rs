//! Error types for eventsource-core

use crate::types::{CredentialField, SecretLocator};
use aws_credential_types::provider::error::CredentialsError;
use thiserror::Error;

/// Result type alias using eventsource-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving credentials or constructing sessions
#[derive(Error, Debug)]
pub enum Error {
    /// An environment-bound locator did not resolve to a value
    #[error("can not find {field} in environment: {locator}")]
    LocatorNotFound {
        field: CredentialField,
        locator: String,
    },

    /// A volume-bound locator's backing file could not be read
    #[error("can not find {field} at {locator}: {source}")]
    VolumeReadFailed {
        field: CredentialField,
        locator: String,
        #[source]
        source: std::io::Error,
    },

    /// Session parameters were rejected before a session could be built
    #[error("failed to construct session for region '{region}': {reason}")]
    SessionConstructionFailed { region: String, reason: String },

    /// A session's credential provider failed when first read
    #[error("failed to load credentials from {provider}: {source}")]
    DeferredCredentialFailure {
        provider: String,
        #[source]
        source: CredentialsError,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration content
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a locator-not-found error. A missing locator is rendered as `<none>`.
    pub fn locator_not_found(field: CredentialField, locator: Option<&SecretLocator>) -> Self {
        Self::LocatorNotFound {
            field,
            locator: describe(locator),
        }
    }

    /// Create a volume read error
    pub fn volume_read_failed(
        field: CredentialField,
        locator: Option<&SecretLocator>,
        source: std::io::Error,
    ) -> Self {
        Self::VolumeReadFailed {
            field,
            locator: describe(locator),
            source,
        }
    }

    /// Create a session construction error
    pub fn session_construction_failed(
        region: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::SessionConstructionFailed {
            region: region.into(),
            reason: reason.into(),
        }
    }

    /// Create a deferred credential error
    pub fn deferred_credential_failure(
        provider: impl Into<String>,
        source: CredentialsError,
    ) -> Self {
        Self::DeferredCredentialFailure {
            provider: provider.into(),
            source,
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// The credential field this error is about, if any
    pub fn field(&self) -> Option<CredentialField> {
        match self {
            Self::LocatorNotFound { field, .. } | Self::VolumeReadFailed { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }
}

fn describe(locator: Option<&SecretLocator>) -> String {
    locator
        .map(ToString::to_string)
        .unwrap_or_else(|| "<none>".to_string())
}
