//! Error types for scoped-acl
//!
//! This module defines the error hierarchy used throughout the crate.
//! Each concern gets its own `thiserror` enum; `AppError` collects them
//! for callers that do not care which layer failed.

use crate::access_control::types::AclScope;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("Policy store error: {0}")]
    Store(#[from] StoreError),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] AccessDeniedError),

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while decoding or encoding a XACML policy document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The document is not a policy this codec understands
    #[error("Malformed policy: {0}")]
    Malformed(String),

    /// A single rule has an unexpected shape
    #[error("Malformed rule '{rule_id}': {reason}")]
    MalformedRule { rule_id: String, reason: String },

    /// The ACL could not be serialized
    #[error("Failed to encode policy: {0}")]
    Encoding(String),

    /// A textual entry (`role:action:effect`) could not be parsed
    #[error("Invalid entry '{input}': {reason}")]
    InvalidEntry { input: String, reason: String },
}

impl PolicyError {
    pub fn malformed(message: impl Into<String>) -> Self {
        PolicyError::Malformed(message.into())
    }

    pub fn malformed_rule(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        PolicyError::MalformedRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_entry(input: impl Into<String>, reason: impl Into<String>) -> Self {
        PolicyError::InvalidEntry {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// Policy store failures other than "not found"
///
/// Absence is reported as `Ok(None)` by the store, never as an error.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Policy store unavailable during {operation}: {reason}")]
    Unavailable { operation: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn unavailable(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Unavailable {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the scope resolver
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Scope '{0}' cannot be stored or removed")]
    UnsupportedScope(AclScope),
}

/// Access control errors
#[derive(Error, Debug)]
#[error("Access denied for action '{action}': {reason}")]
pub struct AccessDeniedError {
    pub action: String,
    pub reason: String,
}

impl AccessDeniedError {
    pub fn new(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            reason: reason.into(),
        }
    }

    pub fn denied_by_rule(action: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            reason: format!("explicitly denied for role '{}'", role.into()),
        }
    }

    pub fn no_matching_rule(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            reason: "no rule grants this action to any of the caller's roles".into(),
        }
    }
}

/// Identity/role lookup errors
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Invalid caller: {0}")]
    InvalidCaller(String),
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Result type alias for codec operations
pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

/// Result type alias for policy store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_constructors() {
        let err = AccessDeniedError::denied_by_rule("write", "ROLE_STUDENT");
        assert!(err.reason.contains("ROLE_STUDENT"));

        let err = AccessDeniedError::no_matching_rule("read");
        assert_eq!(err.action, "read");
        assert!(err.reason.contains("no rule"));
    }

    #[test]
    fn test_malformed_rule_message_names_rule() {
        let err = PolicyError::malformed_rule("admin_read_Permit", "condition is missing");
        assert_eq!(
            err.to_string(),
            "Malformed rule 'admin_read_Permit': condition is missing"
        );
    }

    #[test]
    fn test_resolver_error_wraps_store_error() {
        let err: ResolverError = StoreError::unavailable("load", "disk on fire").into();
        assert!(matches!(err, ResolverError::Store(StoreError::Unavailable { .. })));
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_unsupported_scope_message() {
        let err = ResolverError::UnsupportedScope(AclScope::Merged);
        assert!(err.to_string().contains("merged"));
    }
}
