//! Configuration loading

mod loader;

pub use loader::{CredentialsConfig, DEFAULT_SECRETS_DIR};
