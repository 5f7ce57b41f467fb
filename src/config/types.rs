//! Configuration types for scoped-acl
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::access_control::types::MergeMode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Policy resolution settings
    pub policy: PolicyConfig,

    /// Where policy documents are kept
    pub store: StoreConfig,

    /// Static caller-to-roles mapping
    pub identity: IdentityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Policy resolution configuration
///
/// Read once when a resolver is built.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// How episode and series policies are combined
    pub merge_mode: MergeMode,

    /// Roles that are permitted everything without consulting policy
    pub admin_roles: Vec<String>,
}

/// Filesystem store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory, `~` is expanded
    pub root: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .map(|dir| dir.join("scoped-acl"))
            .unwrap_or_else(|| PathBuf::from(".scoped-acl"));
        Self {
            root: root.display().to_string(),
        }
    }
}

impl StoreConfig {
    /// Root directory with `~` expanded
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.root).as_ref())
    }
}

/// Static identity configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Roles every caller holds, including unknown ones
    pub anonymous_roles: Vec<String>,

    /// Roles per user name
    pub users: HashMap<String, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.policy.merge_mode, MergeMode::Override);
        assert!(config.policy.admin_roles.is_empty());
        assert!(!config.store.root.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_root_path_expands_tilde() {
        let store = StoreConfig {
            root: "~/acl".to_string(),
        };
        let path = store.root_path();
        assert!(!path.starts_with("~"));
        assert!(path.ends_with("acl"));
    }

    #[test]
    fn test_deserialize_identity() {
        let config: IdentityConfig = serde_json::from_str(
            r#"{"anonymous_roles": ["ROLE_ANONYMOUS"], "users": {"alice": ["ROLE_STUDENT"]}}"#,
        )
        .unwrap();
        assert_eq!(config.anonymous_roles, vec!["ROLE_ANONYMOUS"]);
        assert_eq!(config.users["alice"], vec!["ROLE_STUDENT"]);
    }
}
