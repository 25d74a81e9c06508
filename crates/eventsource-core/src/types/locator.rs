//! Secret locators: references to where a secret value lives

use super::Strategy;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a single secret value lives.
///
/// A locator never carries the secret itself. `Env` names a key among the
/// process environment; `Volume` is a path relative to the mounted secrets
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretLocator {
    Env(String),
    Volume(Utf8PathBuf),
}

impl SecretLocator {
    pub fn env(name: impl Into<String>) -> Self {
        SecretLocator::Env(name.into())
    }

    pub fn volume(path: impl Into<Utf8PathBuf>) -> Self {
        SecretLocator::Volume(path.into())
    }

    /// Environment key name, for environment-bound locators
    pub fn as_env(&self) -> Option<&str> {
        match self {
            SecretLocator::Env(name) => Some(name),
            SecretLocator::Volume(_) => None,
        }
    }

    /// Relative volume path, for volume-bound locators
    pub fn as_volume(&self) -> Option<&camino::Utf8Path> {
        match self {
            SecretLocator::Volume(path) => Some(path),
            SecretLocator::Env(_) => None,
        }
    }
}

impl fmt::Display for SecretLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretLocator::Env(name) => write!(f, "env:{}", name),
            SecretLocator::Volume(path) => write!(f, "volume:{}", path),
        }
    }
}

/// A cluster secret reference: the secret object's name and the key within it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

impl SecretKeySelector {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Environment variable name the secret is injected under.
    ///
    /// `aws-creds` / `access.key` becomes `AWS_CREDS_ACCESS_KEY`.
    pub fn env_var_name(&self) -> String {
        format!("{}_{}", self.name, self.key)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Path of the secret relative to the secrets mount: `<name>/<key>`
    pub fn volume_path(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.name).join(&self.key)
    }

    /// Locator for the given strategy
    pub fn to_locator(&self, strategy: Strategy) -> SecretLocator {
        match strategy {
            Strategy::Env => SecretLocator::Env(self.env_var_name()),
            Strategy::Volume => SecretLocator::Volume(self.volume_path()),
        }
    }
}

/// Locator as written in configuration.
///
/// ```yaml
/// accessKey: { env: AWS_ACCESS_KEY }
/// secretKey: { volume: aws-creds/secret }
/// sessionToken: { secret: { name: aws-creds, key: token } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocatorSpec {
    Env { env: String },
    Volume { volume: Utf8PathBuf },
    Secret { secret: SecretKeySelector },
}

impl LocatorSpec {
    /// Resolve the written form into a locator. Explicit `env`/`volume` forms
    /// are kept as written; `secret` selectors follow the strategy.
    pub fn to_locator(&self, strategy: Strategy) -> SecretLocator {
        match self {
            LocatorSpec::Env { env } => SecretLocator::Env(env.clone()),
            LocatorSpec::Volume { volume } => SecretLocator::Volume(volume.clone()),
            LocatorSpec::Secret { secret } => secret.to_locator(strategy),
        }
    }
}
