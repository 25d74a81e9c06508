//! AWS session construction
//!
//! A [`Session`] is an [`SdkConfig`] bound to one region and one credential
//! source. Sessions are built fresh per call and never mutated.
//!
//! Assumed-role sessions do not talk to STS while being built: the
//! `AssumeRoleProvider` is only asked for credentials on first use, so STS
//! failures surface from [`Session::credentials`] or the first SDK request.

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use eventsource_core::{validate_region, CredentialMaterial, Error, Result};
use std::fmt;
use tracing::{debug, info};

/// Provider name reported by static credentials
const STATIC_PROVIDER_NAME: &str = "EventsourceStatic";

/// Where a session's credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// The SDK's default provider chain, consulted at call time
    Ambient,
    /// Fixed resolved material
    Static(CredentialMaterial),
    /// STS role assumption on top of the ambient chain
    AssumedRole {
        role_arn: String,
        session_name: Option<String>,
    },
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Ambient => write!(f, "default credential chain"),
            CredentialSource::Static(_) => write!(f, "static credentials"),
            CredentialSource::AssumedRole { role_arn, .. } => {
                write!(f, "assumed role {}", role_arn)
            }
        }
    }
}

/// Region and credential source a session is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    pub region: String,
    pub source: CredentialSource,
}

/// Region-bound SDK configuration, ready to build service clients from
#[derive(Clone)]
pub struct Session {
    binding: SessionBinding,
    config: SdkConfig,
}

impl Session {
    pub(crate) fn from_parts(binding: SessionBinding, config: SdkConfig) -> Self {
        Self { binding, config }
    }

    pub fn region(&self) -> &str {
        &self.binding.region
    }

    pub fn source(&self) -> &CredentialSource {
        &self.binding.source
    }

    pub fn binding(&self) -> &SessionBinding {
        &self.binding
    }

    pub fn is_assumed_role(&self) -> bool {
        matches!(self.binding.source, CredentialSource::AssumedRole { .. })
    }

    /// SDK configuration to hand to a service client, e.g.
    /// `aws_sdk_sqs::Client::new(session.sdk_config())`
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn into_sdk_config(self) -> SdkConfig {
        self.config
    }

    /// Ask the session's provider for credentials.
    ///
    /// For assumed-role sessions this performs the STS exchange.
    pub async fn credentials(&self) -> Result<Credentials> {
        let source = self.binding.source.to_string();

        let provider = self.config.credentials_provider().ok_or_else(|| {
            Error::deferred_credential_failure(
                source.clone(),
                CredentialsError::not_loaded("session has no credentials provider"),
            )
        })?;

        provider
            .provide_credentials()
            .await
            .map_err(|e| Error::deferred_credential_failure(source, e))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("region", &self.binding.region)
            .field("source", &self.binding.source)
            .finish_non_exhaustive()
    }
}

/// Build a session from resolved material, or from the default chain when
/// no material is given
pub async fn build_session(
    credential: Option<&CredentialMaterial>,
    region: &str,
) -> Result<Session> {
    let Some(material) = credential else {
        return build_session_without_credentials(region).await;
    };

    validate_region(region)?;
    if !material.is_complete() {
        return Err(Error::session_construction_failed(
            region,
            "static credentials need both an access key id and a secret access key",
        ));
    }

    let credentials = Credentials::new(
        material.access_key_id(),
        material.secret_access_key(),
        material.session_token().map(str::to_string),
        None,
        STATIC_PROVIDER_NAME,
    );

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(credentials)
        .load()
        .await;

    debug!("Built static credential session for region {}", region);
    Ok(Session::from_parts(
        SessionBinding {
            region: region.to_string(),
            source: CredentialSource::Static(material.clone()),
        },
        config,
    ))
}

/// Build a session bound only to a region; credentials come from the SDK's
/// default provider chain when first needed
pub async fn build_session_without_credentials(region: &str) -> Result<Session> {
    validate_region(region)?;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;

    debug!("Built default-chain session for region {}", region);
    Ok(Session::from_parts(
        SessionBinding {
            region: region.to_string(),
            source: CredentialSource::Ambient,
        },
        config,
    ))
}

/// Build a session whose credentials come from assuming `role_arn`
pub async fn build_assumed_role_session(role_arn: &str, region: &str) -> Result<Session> {
    build_assumed_role_session_named(role_arn, region, None).await
}

/// Like [`build_assumed_role_session`], with an explicit STS session name.
/// Without one the SDK generates a name.
pub async fn build_assumed_role_session_named(
    role_arn: &str,
    region: &str,
    session_name: Option<&str>,
) -> Result<Session> {
    validate_region(region)?;
    if role_arn.is_empty() {
        return Err(Error::session_construction_failed(
            region,
            "role ARN must not be empty",
        ));
    }

    let region_id = Region::new(region.to_string());

    // Base identity used to call STS
    let base = aws_config::defaults(BehaviorVersion::latest())
        .region(region_id.clone())
        .load()
        .await;

    let mut builder = AssumeRoleProvider::builder(role_arn)
        .region(region_id.clone())
        .configure(&base);
    if let Some(name) = session_name {
        builder = builder.session_name(name);
    }
    let provider = builder.build().await;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_id)
        .credentials_provider(SharedCredentialsProvider::new(provider))
        .load()
        .await;

    info!("Built assumed-role session for {} in region {}", role_arn, region);
    Ok(Session::from_parts(
        SessionBinding {
            region: region.to_string(),
            source: CredentialSource::AssumedRole {
                role_arn: role_arn.to_string(),
                session_name: session_name.map(str::to_string),
            },
        },
        config,
    ))
}
