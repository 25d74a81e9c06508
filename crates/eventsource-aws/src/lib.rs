//! AWS credentials for eventsources
//!
//! This crate turns secret locators into ready-to-use AWS sessions:
//! - **Lookups**: environment variables and mounted secret volumes
//! - **Resolution**: access key, secret key and (volume only) session token
//! - **Sessions**: static credentials, the default chain, or an assumed role
//! - **Precedence**: role ARN, then no locators, then resolved credentials
//!
//! Nothing is cached between calls; every call builds a fresh [`Session`].

pub mod audit;
pub mod credentials;
pub mod lookup;
pub mod orchestrator;
pub mod session;

// Re-export commonly used items
pub use audit::CredentialAudit;
pub use credentials::CredentialResolver;
pub use lookup::{EnvLookup, MountedVolume, ProcessEnv, StaticEnv, VolumeLookup};
pub use orchestrator::SessionFactory;
pub use session::{
    build_assumed_role_session, build_assumed_role_session_named, build_session,
    build_session_without_credentials, CredentialSource, Session, SessionBinding,
};

use eventsource_core::config::DEFAULT_SECRETS_DIR;
use eventsource_core::{CredentialMaterial, CredentialsConfig, Result, SecretLocator};

/// Resolve access and secret keys from the process environment
pub fn resolve_env_credential(
    access: Option<&SecretLocator>,
    secret: Option<&SecretLocator>,
) -> Result<CredentialMaterial> {
    CredentialResolver::new(DEFAULT_SECRETS_DIR).resolve_env_credential(access, secret)
}

/// Resolve credentials from the default secrets volume
pub async fn resolve_volume_credential(
    access: Option<&SecretLocator>,
    secret: Option<&SecretLocator>,
    session_token: Option<&SecretLocator>,
) -> Result<CredentialMaterial> {
    CredentialResolver::new(DEFAULT_SECRETS_DIR)
        .resolve_volume_credential(access, secret, session_token)
        .await
}

/// Create a session with credentials taken from the process environment
pub async fn create_session_from_env(
    region: &str,
    role_arn: Option<&str>,
    access: Option<&SecretLocator>,
    secret: Option<&SecretLocator>,
) -> Result<Session> {
    SessionFactory::new(DEFAULT_SECRETS_DIR)
        .create_session_from_env(region, role_arn, access, secret)
        .await
}

/// Create a session with credentials taken from the default secrets volume
pub async fn create_session_from_volume(
    region: &str,
    role_arn: Option<&str>,
    access: Option<&SecretLocator>,
    secret: Option<&SecretLocator>,
    session_token: Option<&SecretLocator>,
) -> Result<Session> {
    SessionFactory::new(DEFAULT_SECRETS_DIR)
        .create_session_from_volume(region, role_arn, access, secret, session_token)
        .await
}

/// Create a session as described by a credentials config
pub async fn create_session_from_config(config: &CredentialsConfig) -> Result<Session> {
    SessionFactory::from_config(config)
        .create_session(config.strategy, &config.to_request())
        .await
}
