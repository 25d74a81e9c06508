//! Audit records for credential resolution
//!
//! Records which locator was read for which field and whether it worked.
//! Secret values never reach an audit record.

use chrono::{DateTime, Utc};
use eventsource_core::{CredentialField, SecretLocator, Strategy};

/// Audit log entry for one locator lookup
#[derive(Debug, Clone)]
pub struct CredentialAudit {
    pub field: CredentialField,
    pub locator: String,
    pub strategy: Strategy,
    pub success: bool,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl CredentialAudit {
    pub fn new(field: CredentialField, locator: Option<&SecretLocator>, strategy: Strategy) -> Self {
        Self {
            field,
            locator: locator
                .map(ToString::to_string)
                .unwrap_or_else(|| "<none>".to_string()),
            strategy,
            success: true,
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self
    }

    /// Emit the entry through tracing
    pub fn log(&self) {
        if self.success {
            tracing::debug!(
                field = %self.field,
                locator = %self.locator,
                strategy = %self.strategy,
                timestamp = %self.timestamp,
                "Credential lookup succeeded"
            );
        } else {
            tracing::warn!(
                field = %self.field,
                locator = %self.locator,
                strategy = %self.strategy,
                error = ?self.error,
                timestamp = %self.timestamp,
                "Credential lookup failed"
            );
        }
    }
}
