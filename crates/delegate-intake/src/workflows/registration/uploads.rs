use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::domain::{ApplicationId, AttachmentKind, AttachmentSet};
use super::storage::{BlobPath, BlobStore, BlobStoreError};

/// Public URLs of the uploaded attachments; empty when an attachment was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadedFiles {
    pub photo_url: String,
    pub ielts_proof_url: String,
    pub sat_proof_url: String,
}

impl UploadedFiles {
    fn slot(&mut self, kind: AttachmentKind) -> &mut String {
        match kind {
            AttachmentKind::Photo => &mut self.photo_url,
            AttachmentKind::IeltsProof => &mut self.ielts_proof_url,
            AttachmentKind::SatProof => &mut self.sat_proof_url,
        }
    }

    pub fn url(&self, kind: AttachmentKind) -> &str {
        match kind {
            AttachmentKind::Photo => &self.photo_url,
            AttachmentKind::IeltsProof => &self.ielts_proof_url,
            AttachmentKind::SatProof => &self.sat_proof_url,
        }
    }
}

/// The first attachment that failed to upload. Later attachments were not attempted.
#[derive(Debug, thiserror::Error)]
#[error("failed to upload {kind}: {source}")]
pub struct UploadError {
    pub kind: AttachmentKind,
    #[source]
    pub source: BlobStoreError,
}

/// Uploads the optional attachments one after another, stopping at the first failure.
///
/// Objects written before a failure are left in place.
pub struct FileUploadOrchestrator<B: ?Sized> {
    store: Arc<B>,
}

impl<B> FileUploadOrchestrator<B>
where
    B: BlobStore + ?Sized,
{
    pub fn new(store: Arc<B>) -> Self {
        Self { store }
    }

    pub async fn upload_all(
        &self,
        attachments: AttachmentSet<'_>,
        application_id: &ApplicationId,
    ) -> Result<UploadedFiles, UploadError> {
        let mut files = UploadedFiles::default();

        for kind in AttachmentKind::ORDER {
            let Some(attachment) = attachments.get(kind) else {
                continue;
            };

            let path = BlobPath::for_attachment(kind, application_id, &attachment.extension());
            let stored = self
                .store
                .upload(&path, attachment)
                .await
                .map_err(|source| UploadError { kind, source })?;

            debug!(%application_id, attachment = %kind, path = %stored.path, "attachment uploaded");
            *files.slot(kind) = stored.url;
        }

        Ok(files)
    }
}
