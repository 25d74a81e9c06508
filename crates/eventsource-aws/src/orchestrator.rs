//! Session creation precedence
//!
//! The same rule applies to both strategies, first match wins:
//! 1. a non-empty role ARN builds an assumed-role session, locators are ignored
//! 2. no access and no secret locator builds a default-chain session
//! 3. otherwise locators are resolved and bound as static credentials
//!
//! Supplying only one of the access/secret locators lands in 3 and fails in
//! the resolver for the missing one.

use crate::credentials::CredentialResolver;
use crate::lookup::{EnvLookup, MountedVolume, ProcessEnv, VolumeLookup};
use crate::session::{
    build_assumed_role_session_named, build_session, build_session_without_credentials, Session,
};
use camino::Utf8PathBuf;
use eventsource_core::{CredentialsConfig, ResolutionRequest, Result, SecretLocator, Strategy};
use tracing::debug;

/// Builds sessions from resolution requests
#[derive(Debug, Clone, Default)]
pub struct SessionFactory<E = ProcessEnv, V = MountedVolume> {
    resolver: CredentialResolver<E, V>,
    role_session_name: Option<String>,
}

impl SessionFactory {
    /// Factory over the process environment and a secrets volume at `secrets_dir`
    pub fn new(secrets_dir: impl Into<Utf8PathBuf>) -> Self {
        Self::with_resolver(CredentialResolver::new(secrets_dir))
    }

    /// Factory for the secrets directory and session name of `config`
    pub fn from_config(config: &CredentialsConfig) -> Self {
        Self::new(config.secrets_dir.clone())
            .with_role_session_name(config.role_session_name.clone())
    }
}

impl<E: EnvLookup, V: VolumeLookup> SessionFactory<E, V> {
    pub fn with_resolver(resolver: CredentialResolver<E, V>) -> Self {
        Self {
            resolver,
            role_session_name: None,
        }
    }

    /// STS session name used for assumed-role sessions
    pub fn with_role_session_name(mut self, name: Option<String>) -> Self {
        self.role_session_name = name;
        self
    }

    /// Build a session for `request`, resolving locators with `strategy`
    pub async fn create_session(
        &self,
        strategy: Strategy,
        request: &ResolutionRequest,
    ) -> Result<Session> {
        if let Some(role_arn) = request.assumed_role() {
            debug!(strategy = %strategy, "Role ARN set, assuming {}", role_arn);
            return build_assumed_role_session_named(
                role_arn,
                &request.region,
                self.role_session_name.as_deref(),
            )
            .await;
        }

        if request.has_no_locators() {
            debug!(strategy = %strategy, "No credential locators, using default chain");
            return build_session_without_credentials(&request.region).await;
        }

        let material = self.resolver.resolve(strategy, request).await?;
        build_session(Some(&material), &request.region).await
    }

    /// Build a session with credentials taken from the environment
    pub async fn create_session_from_env(
        &self,
        region: &str,
        role_arn: Option<&str>,
        access: Option<&SecretLocator>,
        secret: Option<&SecretLocator>,
    ) -> Result<Session> {
        let request = ResolutionRequest {
            region: region.to_string(),
            role_arn: role_arn.map(str::to_string),
            access_key: access.cloned(),
            secret_key: secret.cloned(),
            session_token: None,
        };
        self.create_session(Strategy::Env, &request).await
    }

    /// Build a session with credentials taken from the secrets volume
    pub async fn create_session_from_volume(
        &self,
        region: &str,
        role_arn: Option<&str>,
        access: Option<&SecretLocator>,
        secret: Option<&SecretLocator>,
        session_token: Option<&SecretLocator>,
    ) -> Result<Session> {
        let request = ResolutionRequest {
            region: region.to_string(),
            role_arn: role_arn.map(str::to_string),
            access_key: access.cloned(),
            secret_key: secret.cloned(),
            session_token: session_token.cloned(),
        };
        self.create_session(Strategy::Volume, &request).await
    }
}
