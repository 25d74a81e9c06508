//! Volume-bound secret lookups
//!
//! Secrets are mounted as one file per key under a secrets directory,
//! `<root>/<secret-name>/<key>`. Paths are validated so a locator can never
//! read outside the mount.

use super::VolumeLookup;
use async_trait::async_trait;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use eventsource_core::config::DEFAULT_SECRETS_DIR;
use std::io;
use tracing::debug;

/// Reads secrets from files under a mounted secrets directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedVolume {
    root: Utf8PathBuf,
}

impl MountedVolume {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Join a locator path onto the mount root, rejecting anything that could
    /// leave it
    fn resolve_path(&self, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
        if path.as_str().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "secret path is empty",
            ));
        }

        for component in path.components() {
            match component {
                Utf8Component::Normal(_) | Utf8Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!(
                            "secret path {} must be relative to {} without '..'",
                            path, self.root
                        ),
                    ));
                }
            }
        }

        Ok(self.root.join(path))
    }
}

impl Default for MountedVolume {
    fn default() -> Self {
        Self::new(DEFAULT_SECRETS_DIR)
    }
}

#[async_trait]
impl VolumeLookup for MountedVolume {
    async fn read(&self, path: &Utf8Path) -> io::Result<String> {
        let full_path = self.resolve_path(path)?;
        let mut content = tokio::fs::read_to_string(&full_path).await?;

        debug!("Read {} bytes from {}", content.len(), full_path);

        // Files edited by hand usually end with a newline that is not part of the secret
        if content.ends_with('\n') {
            content.pop();
        }
        Ok(content)
    }
}
