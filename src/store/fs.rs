//! Filesystem policy store
//!
//! Layout: `<root>/<percent-encoded object id>/<scope filename>`. One file
//! per scope, so a store on top of an existing document overwrites it.

use crate::access_control::types::AclScope;
use crate::error::{StoreError, StoreResult};
use crate::store::{ContentObject, PolicyDocument, PolicyLocation, PolicyStore};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Filesystem-backed policy store
#[derive(Debug, Clone)]
pub struct FsPolicyStore {
    root: PathBuf,
}

impl FsPolicyStore {
    /// Create a store rooted at `root`; the directory is created lazily
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_dir(&self, object: &ContentObject) -> StoreResult<PathBuf> {
        if object.id.is_empty() || object.id == "." || object.id == ".." {
            return Err(StoreError::unavailable(
                "resolve path",
                format!("object id '{}' cannot be used as a directory name", object.id),
            ));
        }
        Ok(self.root.join(urlencoding::encode(&object.id).into_owned()))
    }

    fn scope_path(&self, object: &ContentObject, scope: AclScope) -> StoreResult<PathBuf> {
        let filename = scope.filename().ok_or_else(|| {
            StoreError::unavailable("resolve path", format!("scope '{}' is not stored", scope))
        })?;
        Ok(self.object_dir(object)?.join(filename))
    }
}

fn location(path: &Path) -> PolicyLocation {
    PolicyLocation(path.display().to_string())
}

#[async_trait]
impl PolicyStore for FsPolicyStore {
    #[instrument(skip(self, object), fields(object = %object))]
    async fn load(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyDocument>> {
        let path = self.scope_path(object, scope)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(PolicyDocument {
                location: location(&path),
                bytes,
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No policy file");
                Ok(None)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    #[instrument(skip(self, object, bytes), fields(object = %object, len = bytes.len()))]
    async fn store(
        &self,
        object: &ContentObject,
        scope: AclScope,
        _filename: &str,
        bytes: Vec<u8>,
    ) -> StoreResult<PolicyLocation> {
        // The scope, not the filename hint, names the file.
        let path = self.scope_path(object, scope)?;
        let dir = self.object_dir(object)?;
        tokio::fs::create_dir_all(&dir).await?;

        let staging = path.with_extension("xml.tmp");
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, &path).await?;

        debug!(path = %path.display(), "Stored policy file");
        Ok(location(&path))
    }

    #[instrument(skip(self, object), fields(object = %object))]
    async fn delete(
        &self,
        object: &ContentObject,
        scope: AclScope,
    ) -> StoreResult<Option<PolicyLocation>> {
        let path = self.scope_path(object, scope)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(Some(location(&path))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn store_type(&self) -> &'static str {
        "filesystem"
    }
}
