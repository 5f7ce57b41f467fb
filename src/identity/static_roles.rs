//! Static role table
//!
//! Roles come from `[identity]` in the configuration file.

use crate::config::IdentityConfig;
use crate::error::IdentityError;
use crate::identity::provider::{CallerContext, RoleProvider};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Role provider backed by a fixed user table
#[derive(Debug, Clone, Default)]
pub struct StaticRoleProvider {
    users: HashMap<String, Vec<String>>,
    anonymous_roles: Vec<String>,
}

impl StaticRoleProvider {
    /// Create a new provider
    pub fn new(users: HashMap<String, Vec<String>>, anonymous_roles: Vec<String>) -> Self {
        Self {
            users,
            anonymous_roles,
        }
    }

    /// Create from identity configuration
    pub fn from_config(config: &IdentityConfig) -> Result<Self, IdentityError> {
        if let Some(user) = config.users.keys().find(|user| user.is_empty()) {
            return Err(IdentityError::InvalidCaller(format!("'{}' is not a user name", user)));
        }
        Ok(Self::new(config.users.clone(), config.anonymous_roles.clone()))
    }
}

#[async_trait]
impl RoleProvider for StaticRoleProvider {
    async fn roles(&self, caller: &CallerContext) -> Result<Vec<String>, IdentityError> {
        if caller.user.is_empty() {
            return Err(IdentityError::InvalidCaller(
                "caller has an empty user name".to_string(),
            ));
        }

        let mut roles = match self.users.get(&caller.user) {
            Some(roles) => roles.clone(),
            None => {
                debug!(user = %caller.user, "Unknown user, using anonymous roles");
                Vec::new()
            }
        };
        for role in &self.anonymous_roles {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }
        Ok(roles)
    }

    fn provider_type(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticRoleProvider {
        let mut users = HashMap::new();
        users.insert("alice".to_string(), vec!["ROLE_STUDENT".to_string()]);
        StaticRoleProvider::new(users, vec!["ROLE_ANONYMOUS".to_string()])
    }

    #[tokio::test]
    async fn test_known_user_gets_anonymous_roles_too() {
        let roles = provider().roles(&CallerContext::new("alice")).await.unwrap();
        assert_eq!(roles, vec!["ROLE_STUDENT", "ROLE_ANONYMOUS"]);
    }

    #[tokio::test]
    async fn test_unknown_user_is_anonymous() {
        let roles = provider().roles(&CallerContext::new("mallory")).await.unwrap();
        assert_eq!(roles, vec!["ROLE_ANONYMOUS"]);
    }

    #[tokio::test]
    async fn test_empty_user_is_invalid() {
        let err = provider().roles(&CallerContext::new("")).await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCaller(_)));
    }

    #[test]
    fn test_provider_type() {
        assert_eq!(provider().provider_type(), "static");
    }
}
