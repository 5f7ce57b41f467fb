//! Policy store module
//!
//! Persists serialized policy documents as scope-tagged attachments of a
//! content object. The resolver only sees the [`PolicyStore`] trait;
//! [`MemoryPolicyStore`] backs tests and [`FsPolicyStore`] backs the CLI.

pub mod fs;
pub mod memory;

pub use fs::FsPolicyStore;
pub use memory::MemoryPolicyStore;

use crate::access_control::types::AclScope;
use crate::error::StoreResult;
// async_trait required for dyn-compatibility with Arc<dyn PolicyStore>
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Handle to a content object (an episode) whose policies are stored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentObject {
    pub id: String,
}

impl ContentObject {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for ContentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Where a stored document lives (a path or store-specific URI)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyLocation(pub String);

impl PolicyLocation {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PolicyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored policy document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub location: PolicyLocation,
    pub bytes: Vec<u8>,
}

/// Policy store trait
///
/// "Not found" is `Ok(None)`; every `Err` is a genuine store failure.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load the document tagged with `scope`, if any
    async fn load(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyDocument>>;

    /// Store a document tagged with `scope` and return its location
    ///
    /// Stores are not required to replace an existing document of the same
    /// scope; callers delete first.
    async fn store(
        &self,
        object: &ContentObject,
        scope: AclScope,
        filename: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<PolicyLocation>;

    /// Delete the document tagged with `scope`, returning where it was
    async fn delete(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyLocation>>;

    /// Get a description of the store (for logging)
    fn store_type(&self) -> &'static str;
}

/// Shared policy store handle
pub type SharedPolicyStore = Arc<dyn PolicyStore>;
