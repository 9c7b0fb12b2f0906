use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::domain::{ApplicationId, Attachment, AttachmentKind};

/// Slash-separated object key inside the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BlobPath(String);

impl BlobPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// `<category>/<application id>-<suffix>.<ext>`
    pub fn for_attachment(
        kind: AttachmentKind,
        application_id: &ApplicationId,
        extension: &str,
    ) -> Self {
        Self(format!(
            "{}/{}-{}.{}",
            kind.category(),
            application_id,
            kind.suffix(),
            extension
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub path: BlobPath,
    pub url: String,
}

/// Blob storage gateway: upload or remove an object by path.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        path: &BlobPath,
        attachment: &Attachment,
    ) -> Result<StoredObject, BlobStoreError>;

    async fn remove(&self, path: &BlobPath) -> Result<(), BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob path '{0}' escapes the storage root")]
    InvalidPath(String),
    #[error("blob '{0}' not found")]
    NotFound(String),
    #[error("blob '{0}' already exists")]
    AlreadyExists(String),
    #[error("blob store io failure at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

/// Filesystem-backed store. Objects live under `root`; URLs are
/// `<public_base_url>/<path>`. Stored objects are never replaced.
#[derive(Debug)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
    tmp_counter: AtomicU64,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base_url,
            tmp_counter: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the storage root if needed and checks that it is a directory.
    pub async fn ensure_root(&self) -> Result<(), BlobStoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(io_error(&self.root))?;
        let metadata = fs::metadata(&self.root)
            .await
            .map_err(io_error(&self.root))?;
        if !metadata.is_dir() {
            return Err(BlobStoreError::Unavailable(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    /// Physical location of `path`; only plain relative segments are accepted.
    pub fn resolve(&self, path: &BlobPath) -> Result<PathBuf, BlobStoreError> {
        let relative = Path::new(path.as_str());
        let safe = !path.as_str().is_empty()
            && !path.as_str().contains('\\')
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(BlobStoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    pub fn public_url(&self, path: &BlobPath) -> String {
        format!("{}/{}", self.public_base_url, path)
    }

    fn tmp_path(&self, target: &Path) -> PathBuf {
        let id = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{name}.tmp.{}.{id}", std::process::id()))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BlobStoreError + '_ {
    move |source| BlobStoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(
        &self,
        path: &BlobPath,
        attachment: &Attachment,
    ) -> Result<StoredObject, BlobStoreError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await.map_err(io_error(parent))?;
        }

        let temp = self.tmp_path(&target);
        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .map_err(io_error(&temp))?;
            file.write_all(&attachment.bytes)
                .await
                .map_err(io_error(&temp))?;
            file.sync_all().await.map_err(io_error(&temp))?;
        }

        // Linking fails if the target exists, so a published object keeps its bytes.
        let linked = fs::hard_link(&temp, &target).await;
        let _ = fs::remove_file(&temp).await;
        match linked {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(BlobStoreError::AlreadyExists(path.to_string()));
            }
            Err(source) => return Err(io_error(&target)(source)),
        }

        debug!(path = %path, bytes = attachment.bytes.len(), "blob stored");
        Ok(StoredObject {
            path: path.clone(),
            url: self.public_url(path),
        })
    }

    async fn remove(&self, path: &BlobPath) -> Result<(), BlobStoreError> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobStoreError::NotFound(path.to_string()))
            }
            Err(source) => Err(io_error(&target)(source)),
        }
    }
}
