//! # eventsource-core
//!
//! Core library for eventsource credential handling providing:
//! - Secret locators (environment and volume references)
//! - Credential material and resolution requests
//! - Credentials configuration parsing
//! - Error types shared by the resolution and session crates

pub mod config;
pub mod error;
pub mod types;

pub use config::CredentialsConfig;
pub use error::{Error, Result};
pub use types::{
    validate_region, CredentialField, CredentialMaterial, LocatorSpec, ResolutionRequest,
    SecretKeySelector, SecretLocator, Strategy,
};
