use async_trait::async_trait;
use chrono::Utc;
use delegate_intake::workflows::registration::{
    ApplicationId, ApplicationRecord, ApplicationRepository, Attachment, AttachmentKind, BlobPath,
    BlobStore, BlobStoreError, Notice, NoticeLevel, Notifier, RepositoryError, StoredApplication,
    StoredObject,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, StoredApplication>>>,
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::Conflict(record.application_id));
        }
        let stored = StoredApplication {
            row_id: guard.len() as u64 + 1,
            created_at: Utc::now(),
            record,
        };
        guard.insert(stored.record.application_id.clone(), stored.clone());
        Ok(stored)
    }

    async fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(application_id).cloned())
    }
}

/// Blob store that keeps objects in memory. Can be told to fail one attachment kind.
#[derive(Default)]
pub(crate) struct InMemoryBlobStore {
    objects: Mutex<HashMap<BlobPath, usize>>,
    failing: Option<AttachmentKind>,
}

impl InMemoryBlobStore {
    pub(crate) fn failing_on(kind: Option<AttachmentKind>) -> Self {
        Self {
            failing: kind,
            ..Self::default()
        }
    }

    pub(crate) fn object_count(&self) -> usize {
        self.objects.lock().expect("blob mutex poisoned").len()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(
        &self,
        path: &BlobPath,
        attachment: &Attachment,
    ) -> Result<StoredObject, BlobStoreError> {
        if let Some(kind) = self.failing {
            if path.as_str().contains(&format!("-{}.", kind.suffix())) {
                return Err(BlobStoreError::Unavailable(format!(
                    "simulated outage while storing {path}"
                )));
            }
        }

        let mut objects = self.objects.lock().expect("blob mutex poisoned");
        if objects.contains_key(path) {
            return Err(BlobStoreError::AlreadyExists(path.to_string()));
        }
        objects.insert(path.clone(), attachment.bytes.len());
        Ok(StoredObject {
            path: path.clone(),
            url: format!("memory://{path}"),
        })
    }

    async fn remove(&self, path: &BlobPath) -> Result<(), BlobStoreError> {
        match self.objects.lock().expect("blob mutex poisoned").remove(path) {
            Some(_) => Ok(()),
            None => Err(BlobStoreError::NotFound(path.to_string())),
        }
    }
}

/// Emits notices as log lines and keeps them for later inspection.
#[derive(Default)]
pub(crate) struct LogNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl LogNotifier {
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "notice"),
            NoticeLevel::Error => warn!(message = %notice.message, "notice"),
        }
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}

pub(crate) fn parse_attachment_kind(raw: &str) -> Result<AttachmentKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "photo" => Ok(AttachmentKind::Photo),
        "ielts" => Ok(AttachmentKind::IeltsProof),
        "sat" => Ok(AttachmentKind::SatProof),
        other => Err(format!(
            "unknown attachment '{other}' (expected photo, ielts or sat)"
        )),
    }
}
