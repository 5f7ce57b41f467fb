//! In-memory policy store
//!
//! Keeps a list of attachments per object, like a media package does.
//! Storing never replaces an existing attachment of the same scope.

use crate::access_control::types::AclScope;
use crate::error::StoreResult;
use crate::store::{ContentObject, PolicyDocument, PolicyLocation, PolicyStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Attachment {
    scope: AclScope,
    document: PolicyDocument,
}

/// In-memory policy store
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    objects: RwLock<HashMap<String, Vec<Attachment>>>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All documents attached to `object` under `scope`
    pub async fn documents(&self, object: &ContentObject, scope: AclScope) -> Vec<PolicyDocument> {
        let objects = self.objects.read().await;
        objects
            .get(&object.id)
            .map(|attachments| {
                attachments
                    .iter()
                    .filter(|attachment| attachment.scope == scope)
                    .map(|attachment| attachment.document.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attach raw bytes directly, bypassing the codec
    pub async fn insert_raw(&self, object: &ContentObject, scope: AclScope, bytes: impl Into<Vec<u8>>) {
        let location = Self::location(object, scope);
        let mut objects = self.objects.write().await;
        objects.entry(object.id.clone()).or_default().push(Attachment {
            scope,
            document: PolicyDocument {
                location,
                bytes: bytes.into(),
            },
        });
    }

    fn location(object: &ContentObject, scope: AclScope) -> PolicyLocation {
        let filename = scope.filename().unwrap_or(scope.as_str());
        PolicyLocation(format!("memory://{}/{}", object.id, filename))
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn load(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyDocument>> {
        let objects = self.objects.read().await;
        Ok(objects.get(&object.id).and_then(|attachments| {
            attachments
                .iter()
                .find(|attachment| attachment.scope == scope)
                .map(|attachment| attachment.document.clone())
        }))
    }

    async fn store(
        &self,
        object: &ContentObject,
        scope: AclScope,
        filename: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<PolicyLocation> {
        let location = PolicyLocation(format!("memory://{}/{}", object.id, filename));
        let mut objects = self.objects.write().await;
        objects.entry(object.id.clone()).or_default().push(Attachment {
            scope,
            document: PolicyDocument {
                location: location.clone(),
                bytes,
            },
        });
        Ok(location)
    }

    async fn delete(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyLocation>> {
        let mut objects = self.objects.write().await;
        let Some(attachments) = objects.get_mut(&object.id) else {
            return Ok(None);
        };

        let mut removed = None;
        attachments.retain(|attachment| {
            if attachment.scope == scope {
                removed.get_or_insert_with(|| attachment.document.location.clone());
                false
            } else {
                true
            }
        });
        Ok(removed)
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_appends_and_delete_removes_all() {
        let store = MemoryPolicyStore::new();
        let object = ContentObject::new("mp-1");

        store
            .store(&object, AclScope::Episode, "xacml-episode.xml", b"one".to_vec())
            .await
            .unwrap();
        store
            .store(&object, AclScope::Episode, "xacml-episode.xml", b"two".to_vec())
            .await
            .unwrap();
        assert_eq!(store.documents(&object, AclScope::Episode).await.len(), 2);

        let removed = store.delete(&object, AclScope::Episode).await.unwrap();
        assert_eq!(
            removed,
            Some(PolicyLocation("memory://mp-1/xacml-episode.xml".to_string()))
        );
        assert!(store.documents(&object, AclScope::Episode).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_is_none() {
        let store = MemoryPolicyStore::new();
        let object = ContentObject::new("nothing");

        assert!(store.load(&object, AclScope::Series).await.unwrap().is_none());
        assert!(store.delete(&object, AclScope::Series).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let store = MemoryPolicyStore::new();
        let object = ContentObject::new("mp-1");

        store.insert_raw(&object, AclScope::Series, "series").await;
        store.insert_raw(&object, AclScope::Episode, "episode").await;
        store.delete(&object, AclScope::Episode).await.unwrap();

        let series = store.load(&object, AclScope::Series).await.unwrap().unwrap();
        assert_eq!(series.bytes, b"series");
    }
}
