//! Access control module
//!
//! Role-based ACLs for content objects whose policies may be attached at
//! two levels: the episode itself and the series it belongs to.
//!
//! ## Resolution
//!
//! The [`ScopeResolver`] looks for an episode policy and a series policy.
//! If both exist they are combined under the configured [`MergeMode`]:
//!
//! - `override`: the episode policy replaces the series policy
//! - `roles`: the episode replaces series entries role by role
//! - `actions`: the episode replaces series entries per `(role, action)`
//!
//! With only one of them present that one is used, and with neither the
//! result is the empty (default-deny) global list.
//!
//! ## Evaluation
//!
//! [`check_permission`] uses deny-overrides: any matching deny entry wins
//! over every matching allow entry, and no match at all is a denial.
//!
//! ## Example Configuration
//!
//! ```toml
//! [policy]
//! merge_mode = "roles"
//! admin_roles = ["ROLE_ADMIN"]
//! ```

pub mod evaluator;
pub mod merge;
pub mod resolver;
pub mod types;

pub use evaluator::{AccessDecision, check_permission, is_permitted, require_permission};
pub use merge::merge_acls;
pub use resolver::{ResolvedAcl, ScopeResolver, StoredPolicy};
pub use types::{AccessControlEntry, AccessControlList, AclEffect, AclScope, MergeMode};
