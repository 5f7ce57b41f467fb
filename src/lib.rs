//! Scoped ACL
//!
//! Role-based access control lists for content objects whose policies can
//! be attached at episode and series level, stored as XACML documents.
//!
//! ## Features
//!
//! - **XACML codec** turning ACLs into policy documents and back
//! - **Scope resolution** with episode, series and global fallback
//! - **Merge modes** `override`, `roles` and `actions` for combining scopes
//! - **Deny-overrides evaluation** of a resolved ACL against a role set
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Resolution Model
//!
//! ```text
//! episode + series → merged    episode → episode    series → series    none → global (deny all)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use scoped_acl::{AclScope, ContentObject, MemoryPolicyStore, MergeMode, ScopeResolver};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), scoped_acl::error::ResolverError> {
//! let resolver = ScopeResolver::with_merge_mode(Arc::new(MemoryPolicyStore::new()), MergeMode::Roles);
//! let resolved = resolver.resolve(&ContentObject::new("mp-1"), AclScope::Merged).await?;
//! println!("{} entries from {}", resolved.acl.len(), resolved.scope);
//! # Ok(())
//! # }
//! ```

pub mod access_control;
pub mod config;
pub mod error;
pub mod identity;
pub mod store;
pub mod xacml;

// Re-export main types
pub use access_control::{
    AccessControlEntry, AccessControlList, AccessDecision, AclEffect, AclScope, MergeMode,
    ResolvedAcl, ScopeResolver, StoredPolicy,
};
pub use config::{AppConfig, load_config};
pub use error::{AppError, Result};
pub use store::{ContentObject, FsPolicyStore, MemoryPolicyStore, PolicyStore, SharedPolicyStore};
