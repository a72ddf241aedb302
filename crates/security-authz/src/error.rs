//! Error types for authorization operations
//!
//! This module defines the errors surfaced by the authorization manager and
//! the collaborators it consumes (rule store, group source, hierarchy,
//! cache).

use security_rights::RightsError;
use thiserror::Error;

use crate::config::ConfigError;

/// Authorization error types.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// The user lacks the right, or the decision could not be made
    #[error("Access denied: user [{user}] lacks right [{right}] on [{entity}]")]
    AccessDenied {
        /// User the check was made for.
        user: String,
        /// Entity the check was made on.
        entity: String,
        /// Right that was checked.
        right: String,
        /// Human-readable reason, when one is known.
        reason: Option<String>,
        /// Infrastructure failure that prevented the decision.
        #[source]
        cause: Option<Box<AuthorizationError>>,
    },

    /// Malformed or conflicting right registration
    #[error(transparent)]
    InvalidDefinition(#[from] RightsError),

    /// The rule store failed to read rules
    #[error("Rule store error: {0}")]
    RuleStore(String),

    /// The group source failed to list memberships
    #[error("Group source error: {0}")]
    GroupSource(String),

    /// The entity hierarchy could not be walked
    #[error("Hierarchy error: {0}")]
    Hierarchy(String),

    /// The security cache failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for authorization operations.
pub type AuthorizationResult<T> = Result<T, AuthorizationError>;

impl AuthorizationError {
    /// Check if this error comes from a collaborator rather than a decision.
    ///
    /// For `AccessDenied` this tells whether a cause is attached.
    pub fn is_infrastructure_failure(&self) -> bool {
        match self {
            AuthorizationError::AccessDenied { cause, .. } => cause.is_some(),
            AuthorizationError::RuleStore(_)
            | AuthorizationError::GroupSource(_)
            | AuthorizationError::Hierarchy(_)
            | AuthorizationError::Cache(_) => true,
            AuthorizationError::InvalidDefinition(_) | AuthorizationError::Config(_) => false,
        }
    }

    /// Check if this is an access denial.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, AuthorizationError::AccessDenied { .. })
    }

    /// Reason attached to an access denial.
    pub fn reason(&self) -> Option<&str> {
        match self {
            AuthorizationError::AccessDenied { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthorizationError::AccessDenied { .. } => "ACCESS_DENIED",
            AuthorizationError::InvalidDefinition(e) => e.error_code(),
            AuthorizationError::RuleStore(_) => "RULE_STORE_ERROR",
            AuthorizationError::GroupSource(_) => "GROUP_SOURCE_ERROR",
            AuthorizationError::Hierarchy(_) => "HIERARCHY_ERROR",
            AuthorizationError::Cache(_) => "CACHE_ERROR",
            AuthorizationError::Config(_) => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn denied(cause: Option<AuthorizationError>) -> AuthorizationError {
        AuthorizationError::AccessDenied {
            user: "Alice".to_string(),
            entity: "xwiki:Main.WebHome".to_string(),
            right: "edit".to_string(),
            reason: Some("rules".to_string()),
            cause: cause.map(Box::new),
        }
    }

    #[test]
    fn test_access_denied_display() {
        assert_eq!(
            denied(None).to_string(),
            "Access denied: user [Alice] lacks right [edit] on [xwiki:Main.WebHome]"
        );
    }

    #[test]
    fn test_cause_chain() {
        let plain = denied(None);
        assert!(!plain.is_infrastructure_failure());
        assert!(plain.source().is_none());

        let failed = denied(Some(AuthorizationError::RuleStore("timeout".to_string())));
        assert!(failed.is_infrastructure_failure());
        assert_eq!(failed.source().unwrap().to_string(), "Rule store error: timeout");
        assert_eq!(failed.reason(), Some("rules"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(denied(None).error_code(), "ACCESS_DENIED");
        assert_eq!(AuthorizationError::Cache("x".into()).error_code(), "CACHE_ERROR");
        assert_eq!(
            AuthorizationError::from(RightsError::invalid("x")).error_code(),
            "INVALID_RIGHT_DEFINITION"
        );
    }
}
