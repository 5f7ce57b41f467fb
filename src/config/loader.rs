//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (SCOPED_ACL_*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "scoped-acl.toml",
    ".scoped-acl.toml",
    "~/.config/scoped-acl/config.toml",
    "/etc/scoped-acl/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        let expanded = shellexpand::tilde(path);
        if !Path::new(expanded.as_ref()).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with SCOPED_ACL_ prefix
    // e.g., SCOPED_ACL_POLICY__MERGE_MODE, SCOPED_ACL_STORE__ROOT
    // Double underscore (__) maps to nested keys (policy.merge_mode)
    builder = builder.add_source(
        Environment::with_prefix("SCOPED_ACL")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("policy.admin_roles")
            .with_list_parse_key("identity.anonymous_roles"),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.store.root.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "store.root".to_string(),
        });
    }

    validate_roles(&config.policy.admin_roles, "policy.admin_roles")?;
    validate_roles(&config.identity.anonymous_roles, "identity.anonymous_roles")?;

    for (user, roles) in &config.identity.users {
        if user.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "identity.users contains an empty user name".to_string(),
            });
        }
        validate_roles(roles, &format!("identity.users.{}", user))?;
    }

    Ok(())
}

/// Validate that no role name is blank
fn validate_roles(roles: &[String], field_path: &str) -> Result<(), ConfigError> {
    if roles.iter().any(|role| role.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            message: format!("{} contains an empty role", field_path),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_control::MergeMode;
    use crate::config::LogFormat;

    #[test]
    fn test_load_config_from_str_basic() {
        let toml = r#"
[policy]
merge_mode = "actions"
admin_roles = ["ROLE_ADMIN"]

[store]
root = "/var/lib/scoped-acl"

[logging]
level = "debug"
format = "json"
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.policy.merge_mode, MergeMode::Actions);
        assert_eq!(config.policy.admin_roles, vec!["ROLE_ADMIN"]);
        assert_eq!(config.store.root, "/var/lib/scoped-acl");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_identity_users() {
        let toml = r#"
[identity]
anonymous_roles = ["ROLE_ANONYMOUS"]

[identity.users]
alice = ["ROLE_STUDENT"]
bob = ["ROLE_TEACHER", "ROLE_STUDENT"]
"#;

        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.identity.anonymous_roles, vec!["ROLE_ANONYMOUS"]);
        assert_eq!(config.identity.users["bob"].len(), 2);
    }

    #[test]
    fn test_unknown_merge_mode_error() {
        let toml = r#"
[policy]
merge_mode = "union"
"#;

        assert!(matches!(
            load_config_from_str(toml),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_empty_root_error() {
        let toml = r#"
[store]
root = ""
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Missing { ref field }) if field == "store.root"));
    }

    #[test]
    fn test_empty_role_error() {
        let toml = r#"
[policy]
admin_roles = ["ROLE_ADMIN", " "]
"#;

        let result = load_config_from_str(toml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_missing_explicit_path_error() {
        let result = load_config(Some("/nonexistent/scoped-acl.toml"));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }
}
