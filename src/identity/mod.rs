//! Identity module
//!
//! Maps a caller to the set of roles the permission evaluator checks
//! against. The only built-in provider reads a static table from
//! configuration; directory-backed providers plug in through
//! [`RoleProvider`].

pub mod provider;
pub mod static_roles;

pub use provider::{BoxedRoleProvider, CallerContext, RoleProvider};
pub use static_roles::StaticRoleProvider;

use crate::config::IdentityConfig;
use crate::error::IdentityError;

/// Create a role provider from configuration
pub fn create_role_provider(config: &IdentityConfig) -> Result<BoxedRoleProvider, IdentityError> {
    Ok(Box::new(StaticRoleProvider::from_config(config)?))
}
