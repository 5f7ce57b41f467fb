//! Scope resolver
//!
//! Produces the effective ACL of a content object with the fallback order
//! episode, then series, then global (empty). When both episode and series
//! policies exist they are combined by the merge engine.
//!
//! A scope document that is missing or fails to decode counts as absent.
//! A store failure is returned to the caller only on the primary scope of
//! the request; on a fallback scope it counts as absent too.

use crate::access_control::evaluator::{AccessDecision, check_permission};
use crate::access_control::merge::merge_acls;
use crate::access_control::types::{AccessControlList, AclScope, MergeMode};
use crate::config::PolicyConfig;
use crate::error::ResolverError;
use crate::store::{ContentObject, PolicyLocation, SharedPolicyStore};
use crate::xacml;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Effective ACL together with the scope it was resolved from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAcl {
    pub scope: AclScope,
    #[serde(rename = "entries")]
    pub acl: AccessControlList,
}

impl ResolvedAcl {
    fn global() -> Self {
        Self {
            scope: AclScope::Global,
            acl: AccessControlList::new(),
        }
    }
}

/// Outcome of a successful `set_policy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredPolicy {
    pub object: ContentObject,
    pub scope: AclScope,
    pub location: PolicyLocation,
}

/// Scope resolver
///
/// The merge mode and administrator roles are fixed at construction;
/// reconfiguring means building a new resolver. Every call reads the store
/// afresh, nothing is cached.
pub struct ScopeResolver {
    store: SharedPolicyStore,
    merge_mode: MergeMode,
    admin_roles: Vec<String>,
}

impl ScopeResolver {
    /// Create a resolver from policy configuration
    pub fn new(store: SharedPolicyStore, config: &PolicyConfig) -> Self {
        Self {
            store,
            merge_mode: config.merge_mode,
            admin_roles: config.admin_roles.clone(),
        }
    }

    /// Create a resolver with a merge mode and no administrator roles
    pub fn with_merge_mode(store: SharedPolicyStore, merge_mode: MergeMode) -> Self {
        Self {
            store,
            merge_mode,
            admin_roles: Vec::new(),
        }
    }

    pub fn merge_mode(&self) -> MergeMode {
        self.merge_mode
    }

    /// Resolve the effective ACL of `object` for the requested scope
    pub async fn resolve(
        &self,
        object: &ContentObject,
        requested: AclScope,
    ) -> Result<ResolvedAcl, ResolverError> {
        debug!(object = %object, scope = %requested, store = self.store.store_type(), "Resolving ACL");

        let episode = match requested {
            AclScope::Episode | AclScope::Merged => {
                self.load_scope(object, AclScope::Episode, true).await?
            }
            AclScope::Series | AclScope::Global => None,
        };

        let series = match requested {
            AclScope::Series => self.load_scope(object, AclScope::Series, true).await?,
            AclScope::Episode | AclScope::Merged => {
                self.load_scope(object, AclScope::Series, false).await?
            }
            AclScope::Global => None,
        };

        let resolved = match (episode, series) {
            (Some(episode), Some(series)) => ResolvedAcl {
                scope: AclScope::Merged,
                acl: merge_acls(&series, &episode, self.merge_mode),
            },
            (Some(episode), None) => ResolvedAcl {
                scope: AclScope::Episode,
                acl: episode,
            },
            (None, Some(series)) => ResolvedAcl {
                scope: AclScope::Series,
                acl: series,
            },
            (None, None) => ResolvedAcl::global(),
        };

        debug!(
            object = %object,
            scope = %resolved.scope,
            entries = resolved.acl.len(),
            "Resolved ACL"
        );
        Ok(resolved)
    }

    /// Resolve and return only the ACL
    pub async fn acl(
        &self,
        object: &ContentObject,
        requested: AclScope,
    ) -> Result<AccessControlList, ResolverError> {
        Ok(self.resolve(object, requested).await?.acl)
    }

    /// Load and decode one scope document
    ///
    /// `Ok(None)` means absent. Store errors are returned only when
    /// `primary` is set.
    async fn load_scope(
        &self,
        object: &ContentObject,
        scope: AclScope,
        primary: bool,
    ) -> Result<Option<AccessControlList>, ResolverError> {
        let document = match self.store.load(object, scope).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                debug!(object = %object, scope = %scope, "No policy attached");
                return Ok(None);
            }
            Err(e) if primary => return Err(e.into()),
            Err(e) => {
                warn!(
                    object = %object,
                    scope = %scope,
                    error = %e,
                    "Policy store failed on fallback scope, treating it as absent"
                );
                return Ok(None);
            }
        };

        match xacml::decode_bytes(&document.bytes) {
            Ok(acl) => Ok(Some(acl)),
            Err(e) => {
                warn!(
                    object = %object,
                    scope = %scope,
                    location = %document.location,
                    error = %e,
                    "Unable to decode policy, treating it as absent"
                );
                Ok(None)
            }
        }
    }

    /// Replace the policy of `object` at `scope`
    ///
    /// The ACL is encoded before anything is deleted, so an encoding failure
    /// leaves the stored policy untouched.
    pub async fn set_policy(
        &self,
        object: &ContentObject,
        scope: AclScope,
        acl: &AccessControlList,
        resource_id: &str,
    ) -> Result<StoredPolicy, ResolverError> {
        let filename = scope
            .filename()
            .ok_or(ResolverError::UnsupportedScope(scope))?;
        let xml = xacml::encode(acl, resource_id)?;

        if let Some(stale) = self.store.delete(object, scope).await? {
            debug!(object = %object, scope = %scope, location = %stale, "Removed stale policy");
        }
        let location = self
            .store
            .store(object, scope, filename, xml.into_bytes())
            .await?;

        info!(object = %object, scope = %scope, location = %location, "Stored policy");
        Ok(StoredPolicy {
            object: object.clone(),
            scope,
            location,
        })
    }

    /// Remove the policy of `object` at `scope`, if any
    pub async fn remove_policy(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> Result<Option<PolicyLocation>, ResolverError> {
        if !scope.is_storable() {
            return Err(ResolverError::UnsupportedScope(scope));
        }

        let removed = self.store.delete(object, scope).await?;
        match &removed {
            Some(location) => {
                info!(object = %object, scope = %scope, location = %location, "Removed policy")
            }
            None => debug!(object = %object, scope = %scope, "No policy to remove"),
        }
        Ok(removed)
    }

    /// Check whether a caller with `roles` may perform `action` on `object`
    ///
    /// Administrator roles are permitted without consulting stored policy.
    pub async fn has_permission<R: AsRef<str>>(
        &self,
        object: &ContentObject,
        action: &str,
        roles: &[R],
    ) -> Result<AccessDecision, ResolverError> {
        for role in roles {
            let role: &str = role.as_ref();
            if self.admin_roles.iter().any(|admin| admin == role) {
                debug!(object = %object, action, role, "Administrator bypass");
                return Ok(AccessDecision::Allowed);
            }
        }

        let resolved = self.resolve(object, AclScope::Merged).await?;
        Ok(check_permission(&resolved.acl, action, roles))
    }
}
