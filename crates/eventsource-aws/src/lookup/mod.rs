//! Secret lookup collaborators
//!
//! The resolver never reads secrets itself; it asks one of these services.

pub mod env;
pub mod volume;

use async_trait::async_trait;
use camino::Utf8Path;

/// Looks up environment-bound secrets by key name
#[cfg_attr(test, mockall::automock)]
pub trait EnvLookup: Send + Sync {
    /// Returns `None` when the key is not present
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads volume-bound secrets by path relative to the secrets mount
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VolumeLookup: Send + Sync {
    async fn read(&self, path: &Utf8Path) -> std::io::Result<String>;
}

pub use env::{ProcessEnv, StaticEnv};
pub use volume::MountedVolume;
