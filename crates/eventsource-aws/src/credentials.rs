//! Credential resolution
//!
//! Turns access/secret (and, for volumes, session token) locators into one
//! [`CredentialMaterial`]. Lookups run in field order and the first failure
//! ends the call; nothing is retried.

use crate::audit::CredentialAudit;
use crate::lookup::{EnvLookup, MountedVolume, ProcessEnv, VolumeLookup};
use camino::Utf8PathBuf;
use eventsource_core::{
    CredentialField, CredentialMaterial, Error, ResolutionRequest, Result, SecretLocator, Strategy,
};
use std::io;
use tracing::{debug, warn};

/// Resolves credential locators through the environment and volume lookups
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver<E = ProcessEnv, V = MountedVolume> {
    env: E,
    volume: V,
}

impl CredentialResolver {
    /// Resolver over the process environment and a secrets volume at `secrets_dir`
    pub fn new(secrets_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            env: ProcessEnv::new(),
            volume: MountedVolume::new(secrets_dir),
        }
    }
}

impl<E: EnvLookup, V: VolumeLookup> CredentialResolver<E, V> {
    pub fn with_lookups(env: E, volume: V) -> Self {
        Self { env, volume }
    }

    /// Resolve access and secret keys from the environment.
    ///
    /// Session tokens cannot be sourced from the environment.
    pub fn resolve_env_credential(
        &self,
        access: Option<&SecretLocator>,
        secret: Option<&SecretLocator>,
    ) -> Result<CredentialMaterial> {
        let access_key = self.env_value(CredentialField::AccessKey, access)?;
        let secret_key = self.env_value(CredentialField::SecretKey, secret)?;

        debug!("Resolved credentials from environment");
        Ok(CredentialMaterial::new(access_key, secret_key))
    }

    /// Resolve access and secret keys, and the session token when a locator
    /// for it is given, from the secrets volume
    pub async fn resolve_volume_credential(
        &self,
        access: Option<&SecretLocator>,
        secret: Option<&SecretLocator>,
        session_token: Option<&SecretLocator>,
    ) -> Result<CredentialMaterial> {
        let access_key = self.volume_value(CredentialField::AccessKey, access).await?;
        let secret_key = self.volume_value(CredentialField::SecretKey, secret).await?;

        let token = match session_token {
            Some(locator) => Some(self.volume_token(locator).await?),
            None => None,
        };

        debug!(
            has_session_token = token.as_ref().is_some_and(|t| !t.is_empty()),
            "Resolved credentials from volume"
        );
        Ok(CredentialMaterial::new(access_key, secret_key).with_session_token(token))
    }

    /// Resolve a request's locators with the given strategy
    pub async fn resolve(
        &self,
        strategy: Strategy,
        request: &ResolutionRequest,
    ) -> Result<CredentialMaterial> {
        match strategy {
            Strategy::Env => {
                if request.session_token.is_some() {
                    warn!("Session token locators are not supported for env credentials; ignoring");
                }
                self.resolve_env_credential(request.access_key.as_ref(), request.secret_key.as_ref())
            }
            Strategy::Volume => {
                self.resolve_volume_credential(
                    request.access_key.as_ref(),
                    request.secret_key.as_ref(),
                    request.session_token.as_ref(),
                )
                .await
            }
        }
    }

    fn env_value(&self, field: CredentialField, locator: Option<&SecretLocator>) -> Result<String> {
        let audit = CredentialAudit::new(field, locator, Strategy::Env);

        let value = locator
            .and_then(SecretLocator::as_env)
            .and_then(|name| self.env.lookup(name))
            .filter(|value| !value.is_empty());

        match value {
            Some(value) => {
                audit.log();
                Ok(value)
            }
            None => {
                let err = Error::locator_not_found(field, locator);
                audit.with_error(&err).log();
                Err(err)
            }
        }
    }

    async fn volume_value(
        &self,
        field: CredentialField,
        locator: Option<&SecretLocator>,
    ) -> Result<String> {
        let audit = CredentialAudit::new(field, locator, Strategy::Volume);

        let result = match locator {
            Some(locator) => self.read_volume(locator).await.and_then(|value| {
                if value.is_empty() {
                    Err(io::Error::new(io::ErrorKind::InvalidData, "secret is empty"))
                } else {
                    Ok(value)
                }
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no locator given",
            )),
        };

        match result {
            Ok(value) => {
                audit.log();
                Ok(value)
            }
            Err(source) => {
                let err = Error::volume_read_failed(field, locator, source);
                audit.with_error(&err).log();
                Err(err)
            }
        }
    }

    /// A session token may legitimately be empty; it is then treated as absent
    async fn volume_token(&self, locator: &SecretLocator) -> Result<String> {
        let audit =
            CredentialAudit::new(CredentialField::SessionToken, Some(locator), Strategy::Volume);

        match self.read_volume(locator).await {
            Ok(value) => {
                audit.log();
                Ok(value)
            }
            Err(source) => {
                let err =
                    Error::volume_read_failed(CredentialField::SessionToken, Some(locator), source);
                audit.with_error(&err).log();
                Err(err)
            }
        }
    }

    async fn read_volume(&self, locator: &SecretLocator) -> io::Result<String> {
        match locator.as_volume() {
            Some(path) => self.volume.read(path).await,
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a volume locator", locator),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{MockEnvLookup, MockVolumeLookup, StaticEnv};
    use camino::Utf8Path;
    use mockall::predicate::eq;
    use tempfile::TempDir;

    fn env_resolver(vars: &[(&str, &str)]) -> CredentialResolver<StaticEnv, MockVolumeLookup> {
        CredentialResolver::with_lookups(
            vars.iter().copied().collect(),
            MockVolumeLookup::new(),
        )
    }

    fn volume_resolver(temp_dir: &TempDir) -> CredentialResolver<MockEnvLookup, MountedVolume> {
        let root = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).unwrap();
        CredentialResolver::with_lookups(MockEnvLookup::new(), MountedVolume::new(root))
    }

    fn write_secret(temp_dir: &TempDir, path: &str, value: &str) {
        let full = temp_dir.path().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, value).unwrap();
    }

    #[test]
    fn test_env_credential_resolves_both_keys() {
        let resolver = env_resolver(&[("ACCESS", "AKIA123"), ("SECRET", "s3cr3t")]);

        let material = resolver
            .resolve_env_credential(
                Some(&SecretLocator::env("ACCESS")),
                Some(&SecretLocator::env("SECRET")),
            )
            .unwrap();

        assert_eq!(material.access_key_id(), "AKIA123");
        assert_eq!(material.secret_access_key(), "s3cr3t");
        assert_eq!(material.session_token(), None);
    }

    #[test]
    fn test_env_access_key_checked_first() {
        let resolver = env_resolver(&[]);

        let err = resolver
            .resolve_env_credential(
                Some(&SecretLocator::env("ACCESS")),
                Some(&SecretLocator::env("SECRET")),
            )
            .unwrap_err();

        match err {
            Error::LocatorNotFound { field, locator } => {
                assert_eq!(field, CredentialField::AccessKey);
                assert_eq!(locator, "env:ACCESS");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_env_missing_secret_key() {
        let resolver = env_resolver(&[("ACCESS", "AKIA123")]);

        let err = resolver
            .resolve_env_credential(Some(&SecretLocator::env("ACCESS")), None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::LocatorNotFound {
                field: CredentialField::SecretKey,
                ..
            }
        ));
    }

    #[test]
    fn test_env_stops_after_first_failure() {
        let mut env = MockEnvLookup::new();
        env.expect_lookup()
            .with(eq("ACCESS"))
            .times(1)
            .returning(|_| None);
        let resolver = CredentialResolver::with_lookups(env, MockVolumeLookup::new());

        let err = resolver
            .resolve_env_credential(
                Some(&SecretLocator::env("ACCESS")),
                Some(&SecretLocator::env("SECRET")),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some(CredentialField::AccessKey));
    }

    #[test]
    fn test_env_empty_value_is_not_found() {
        let resolver = env_resolver(&[("ACCESS", ""), ("SECRET", "s3cr3t")]);

        let err = resolver
            .resolve_env_credential(
                Some(&SecretLocator::env("ACCESS")),
                Some(&SecretLocator::env("SECRET")),
            )
            .unwrap_err();
        assert!(matches!(err, Error::LocatorNotFound { .. }));
    }

    #[test]
    fn test_env_rejects_volume_locator() {
        let resolver = env_resolver(&[("aws/access", "AKIA123")]);

        let err = resolver
            .resolve_env_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::env("SECRET")),
            )
            .unwrap_err();
        assert_eq!(err.field(), Some(CredentialField::AccessKey));
    }

    #[tokio::test]
    async fn test_volume_credential_with_token() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "AKIA123\n");
        write_secret(&temp_dir, "aws/secret", "s3cr3t");
        write_secret(&temp_dir, "aws/token", "FwoGZXIvYXdz\n");

        let material = volume_resolver(&temp_dir)
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                Some(&SecretLocator::volume("aws/token")),
            )
            .await
            .unwrap();

        assert_eq!(material.access_key_id(), "AKIA123");
        assert_eq!(material.secret_access_key(), "s3cr3t");
        assert_eq!(material.session_token(), Some("FwoGZXIvYXdz"));
    }

    #[tokio::test]
    async fn test_volume_credential_without_token() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "AKIA123");
        write_secret(&temp_dir, "aws/secret", "s3cr3t");

        let material = volume_resolver(&temp_dir)
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                None,
            )
            .await
            .unwrap();

        assert_eq!(material.session_token(), None);
    }

    #[tokio::test]
    async fn test_volume_missing_fields_are_named() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "AKIA123");
        let resolver = volume_resolver(&temp_dir);

        let err = resolver
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/missing")),
                Some(&SecretLocator::volume("aws/secret")),
                None,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("can not find access key"));

        let err = resolver
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                None,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("can not find secret key"));

        write_secret(&temp_dir, "aws/secret", "s3cr3t");
        let err = resolver
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                Some(&SecretLocator::volume("aws/token")),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("can not find session token"));
        match err {
            Error::VolumeReadFailed { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_volume_missing_locator() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "AKIA123");

        let err = volume_resolver(&temp_dir)
            .resolve_volume_credential(Some(&SecretLocator::volume("aws/access")), None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::VolumeReadFailed {
                field: CredentialField::SecretKey,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_volume_empty_token_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "AKIA123");
        write_secret(&temp_dir, "aws/secret", "s3cr3t");
        write_secret(&temp_dir, "aws/token", "\n");

        let material = volume_resolver(&temp_dir)
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                Some(&SecretLocator::volume("aws/token")),
            )
            .await
            .unwrap();
        assert_eq!(material.session_token(), None);
    }

    #[tokio::test]
    async fn test_volume_empty_access_key_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_secret(&temp_dir, "aws/access", "");
        write_secret(&temp_dir, "aws/secret", "s3cr3t");

        let err = volume_resolver(&temp_dir)
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some(CredentialField::AccessKey));
    }

    #[tokio::test]
    async fn test_volume_lookup_called_once_per_field() {
        let mut volume = MockVolumeLookup::new();
        volume
            .expect_read()
            .times(2)
            .returning(|path: &Utf8Path| match path.as_str() {
                "aws/access" => Ok("AKIA123".to_string()),
                "aws/secret" => Ok("s3cr3t".to_string()),
                other => Err(io::Error::new(io::ErrorKind::NotFound, other.to_string())),
            });
        let resolver = CredentialResolver::with_lookups(MockEnvLookup::new(), volume);

        let material = resolver
            .resolve_volume_credential(
                Some(&SecretLocator::volume("aws/access")),
                Some(&SecretLocator::volume("aws/secret")),
                None,
            )
            .await
            .unwrap();
        assert_eq!(material.access_key_id(), "AKIA123");
    }

    #[tokio::test]
    async fn test_resolve_env_ignores_session_token() {
        let resolver = env_resolver(&[("ACCESS", "AKIA123"), ("SECRET", "s3cr3t")]);
        let request = ResolutionRequest::new("us-east-1")
            .with_access_key(SecretLocator::env("ACCESS"))
            .with_secret_key(SecretLocator::env("SECRET"))
            .with_session_token(SecretLocator::env("TOKEN"));

        let material = resolver.resolve(Strategy::Env, &request).await.unwrap();
        assert_eq!(material.session_token(), None);
    }

    #[tokio::test]
    async fn test_resolution_is_repeatable() {
        let resolver = env_resolver(&[("ACCESS", "AKIA123"), ("SECRET", "s3cr3t")]);
        let request = ResolutionRequest::new("us-east-1")
            .with_access_key(SecretLocator::env("ACCESS"))
            .with_secret_key(SecretLocator::env("SECRET"));

        let first = resolver.resolve(Strategy::Env, &request).await.unwrap();
        let second = resolver.resolve(Strategy::Env, &request).await.unwrap();
        assert_eq!(first, second);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn secret_value() -> impl proptest::strategy::Strategy<Value = String> {
            "[A-Za-z0-9/+=]{1,40}"
        }

        proptest! {
            #[test]
            fn env_resolution_returns_stored_values(
                access in secret_value(),
                secret in secret_value(),
            ) {
                let resolver =
                    env_resolver(&[("ACCESS", access.as_str()), ("SECRET", secret.as_str())]);

                let material = resolver
                    .resolve_env_credential(
                        Some(&SecretLocator::env("ACCESS")),
                        Some(&SecretLocator::env("SECRET")),
                    )
                    .unwrap();

                prop_assert_eq!(material.access_key_id(), access.as_str());
                prop_assert_eq!(material.secret_access_key(), secret.as_str());
                prop_assert_eq!(material.session_token(), None);
            }

            #[test]
            fn volume_resolution_returns_stored_values(
                access in secret_value(),
                secret in secret_value(),
                token in proptest::option::of(secret_value()),
            ) {
                let temp_dir = TempDir::new().unwrap();
                write_secret(&temp_dir, "aws/access", &access);
                write_secret(&temp_dir, "aws/secret", &secret);
                if let Some(token) = &token {
                    write_secret(&temp_dir, "aws/token", token);
                }
                let token_locator = token.as_ref().map(|_| SecretLocator::volume("aws/token"));

                let runtime = tokio::runtime::Builder::new_current_thread()
                    .build()
                    .unwrap();
                let material = runtime
                    .block_on(volume_resolver(&temp_dir).resolve_volume_credential(
                        Some(&SecretLocator::volume("aws/access")),
                        Some(&SecretLocator::volume("aws/secret")),
                        token_locator.as_ref(),
                    ))
                    .unwrap();

                prop_assert_eq!(material.access_key_id(), access.as_str());
                prop_assert_eq!(material.secret_access_key(), secret.as_str());
                prop_assert_eq!(material.session_token(), token.as_deref());
            }
        }
    }
}
