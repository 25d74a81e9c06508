//! Resolution requests and region validation

use super::SecretLocator;
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Host label accepted by the SDK endpoint resolver: 1-63 ASCII alphanumerics
/// or '-', not starting with '-'. Case is left to the SDK.
static REGION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9-]{0,62}$").expect("region regex is valid"));

/// Where credential locators are resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Secrets injected into the process environment
    #[default]
    Env,
    /// Secrets mounted as files under a secrets directory
    Volume,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Env => write!(f, "env"),
            Strategy::Volume => write!(f, "volume"),
        }
    }
}

/// Everything needed to build one session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionRequest {
    pub region: String,
    pub role_arn: Option<String>,
    pub access_key: Option<SecretLocator>,
    pub secret_key: Option<SecretLocator>,
    /// Only honoured by the volume strategy
    pub session_token: Option<SecretLocator>,
}

impl ResolutionRequest {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    pub fn with_access_key(mut self, locator: SecretLocator) -> Self {
        self.access_key = Some(locator);
        self
    }

    pub fn with_secret_key(mut self, locator: SecretLocator) -> Self {
        self.secret_key = Some(locator);
        self
    }

    pub fn with_session_token(mut self, locator: SecretLocator) -> Self {
        self.session_token = Some(locator);
        self
    }

    /// Role ARN, when set to a non-empty value
    pub fn assumed_role(&self) -> Option<&str> {
        self.role_arn.as_deref().filter(|arn| !arn.is_empty())
    }

    /// Neither of the mandatory locators was supplied
    pub fn has_no_locators(&self) -> bool {
        self.access_key.is_none() && self.secret_key.is_none()
    }
}

/// Check that a region can be bound to a session.
///
/// Anything the SDK would place in an endpoint host passes through unchanged;
/// only strings it can never resolve are rejected here.
pub fn validate_region(region: &str) -> Result<()> {
    if !REGION_RE.is_match(region) {
        return Err(Error::session_construction_failed(
            region,
            "region must be a host label of 1-63 alphanumerics or '-', not starting with '-'",
        ));
    }
    Ok(())
}
