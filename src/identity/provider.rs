//! Role provider trait

use crate::error::IdentityError;
// async_trait required for dyn-compatibility with Box<dyn RoleProvider>
use async_trait::async_trait;

/// Who is asking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user: String,
}

impl CallerContext {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

/// Role provider trait
///
/// Implementations look up the roles of a caller. The returned order is
/// not significant.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Get the roles held by `caller`
    async fn roles(&self, caller: &CallerContext) -> Result<Vec<String>, IdentityError>;

    /// Get a description of the provider (for logging)
    fn provider_type(&self) -> &'static str;
}

/// Box type alias for role providers
pub type BoxedRoleProvider = Box<dyn RoleProvider>;
