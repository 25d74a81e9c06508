//! Credentials configuration loading and parsing

use crate::error::{Error, Result};
use crate::types::{LocatorSpec, ResolutionRequest, Strategy};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

/// Default mount point of the secrets volume
pub const DEFAULT_SECRETS_DIR: &str = "/etc/eventsource/secrets";

fn default_secrets_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_SECRETS_DIR)
}

/// Credentials section of an eventsource definition.
///
/// ```yaml
/// strategy: volume
/// region: us-east-1
/// accessKey:
///   secret: { name: aws-creds, key: accesskey }
/// secretKey:
///   secret: { name: aws-creds, key: secretkey }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsConfig {
    /// How locators are resolved
    #[serde(default)]
    pub strategy: Strategy,

    /// Target region
    pub region: String,

    /// Role to assume; takes priority over any locators
    #[serde(default, rename = "roleARN")]
    pub role_arn: Option<String>,

    #[serde(default)]
    pub access_key: Option<LocatorSpec>,

    #[serde(default)]
    pub secret_key: Option<LocatorSpec>,

    /// Only honoured by the volume strategy
    #[serde(default)]
    pub session_token: Option<LocatorSpec>,

    /// Mount point of the secrets volume
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: Utf8PathBuf,

    /// Session name passed to STS when assuming a role
    #[serde(default)]
    pub role_session_name: Option<String>,
}

impl CredentialsConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        debug!("Loaded credentials config from {}", path);
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: CredentialsConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(Error::invalid_config("region is required"));
        }
        if self.secrets_dir.as_str().is_empty() {
            return Err(Error::invalid_config("secretsDir must not be empty"));
        }
        if let Some(name) = &self.role_session_name {
            if name.is_empty() {
                return Err(Error::invalid_config("roleSessionName must not be empty"));
            }
        }
        Ok(())
    }

    /// Turn the written locators into a request for the configured strategy
    pub fn to_request(&self) -> ResolutionRequest {
        let locate = |spec: &Option<LocatorSpec>| spec.as_ref().map(|s| s.to_locator(self.strategy));

        ResolutionRequest {
            region: self.region.clone(),
            role_arn: self.role_arn.clone(),
            access_key: locate(&self.access_key),
            secret_key: locate(&self.secret_key),
            session_token: locate(&self.session_token),
        }
    }
}
