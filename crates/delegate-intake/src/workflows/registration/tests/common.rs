use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Notify;

use crate::workflows::registration::domain::{
    ApplicationId, Attachment, AttachmentKind, CommitteePreferences, EssayResponses,
    ExperienceDetails, ExperienceLevel, FeeAgreement, IdentityDetails, PaymentDetails,
    RegistrationFormState,
};
use crate::workflows::registration::ids::{ApplicationIdGenerator, SequentialIdGenerator};
use crate::workflows::registration::record::ApplicationRecord;
use crate::workflows::registration::repository::{
    ApplicationRepository, Notice, Notifier, RepositoryError, StoredApplication,
};
use crate::workflows::registration::router::{registration_router, RegistrationContext};
use crate::workflows::registration::service::SubmissionCoordinator;
use crate::workflows::registration::storage::{BlobPath, BlobStore, BlobStoreError, StoredObject};

pub(super) const CDN: &str = "https://cdn.test/uploads";

pub(super) fn valid_form() -> RegistrationFormState {
    RegistrationFormState {
        application_id: None,
        identity: IdentityDetails {
            full_name: "Amina Yusuf".to_string(),
            email: "amina@example.org".to_string(),
            social_handle: "@amina.debates".to_string(),
            institution: "Harbor High School".to_string(),
            birth_date: "2008-03-14".to_string(),
            location: "Mombasa".to_string(),
            phone: String::new(),
            photo: None,
        },
        experience: ExperienceDetails {
            level: Some(ExperienceLevel::Intermediate),
            previous_conferences: "Regional MUN 2024, best delegate".to_string(),
            portfolio_link: String::new(),
        },
        committees: CommitteePreferences {
            first: "UNSC".to_string(),
            second: "UNHRC".to_string(),
            third: "WHO".to_string(),
        },
        essays: EssayResponses {
            motivation: "I want to practise negotiation in a formal setting.".to_string(),
            contribution: "Research on maritime security.".to_string(),
        },
        payment: PaymentDetails {
            fee_agreement: Some(FeeAgreement::Agree),
            confirmed: true,
            ..PaymentDetails::default()
        },
    }
}

pub(super) fn photo() -> Attachment {
    Attachment::new("portrait.JPG", "image/jpeg", b"jpeg".to_vec())
}

pub(super) fn ielts_proof() -> Attachment {
    Attachment::new("ielts-report.pdf", "application/pdf", b"%PDF-ielts".to_vec())
}

pub(super) fn sat_proof() -> Attachment {
    Attachment::new("sat", "application/pdf", b"%PDF-sat".to_vec())
}

/// Valid form claiming both discounts with every attachment present.
pub(super) fn form_with_attachments() -> RegistrationFormState {
    let mut form = valid_form();
    form.identity.photo = Some(photo());
    form.payment.discount_tags = ["IELTS".to_string(), "SAT".to_string()]
        .into_iter()
        .collect();
    form.payment.ielts_proof = Some(ielts_proof());
    form.payment.sat_proof = Some(sat_proof());
    form
}

/// In-memory blob store that records every upload attempt and can fail one kind.
#[derive(Default)]
pub(super) struct MemoryBlobStore {
    attempts: Mutex<Vec<BlobPath>>,
    failing: Option<AttachmentKind>,
}

impl MemoryBlobStore {
    pub(super) fn failing_on(kind: AttachmentKind) -> Self {
        Self {
            failing: Some(kind),
            ..Self::default()
        }
    }

    pub(super) fn attempts(&self) -> Vec<String> {
        self.attempts
            .lock()
            .expect("blob mutex poisoned")
            .iter()
            .map(|path| path.as_str().to_string())
            .collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(
        &self,
        path: &BlobPath,
        _attachment: &Attachment,
    ) -> Result<StoredObject, BlobStoreError> {
        self.attempts
            .lock()
            .expect("blob mutex poisoned")
            .push(path.clone());

        if let Some(kind) = self.failing {
            if path.as_str().contains(&format!("-{}.", kind.suffix())) {
                return Err(BlobStoreError::Unavailable("bucket offline".to_string()));
            }
        }

        Ok(StoredObject {
            path: path.clone(),
            url: format!("{CDN}/{path}"),
        })
    }

    async fn remove(&self, _path: &BlobPath) -> Result<(), BlobStoreError> {
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<StoredApplication>>,
}

impl MemoryRepository {
    pub(super) fn records(&self) -> Vec<StoredApplication> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryRepository {
    async fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard
            .iter()
            .any(|stored| stored.record.application_id == record.application_id)
        {
            return Err(RepositoryError::Conflict(record.application_id));
        }
        let stored = StoredApplication {
            row_id: guard.len() as u64 + 1,
            created_at: Utc::now(),
            record,
        };
        guard.push(stored.clone());
        Ok(stored)
    }

    async fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .find(|stored| &stored.record.application_id == application_id)
            .cloned())
    }
}

/// Counts insert calls and always fails them.
#[derive(Default)]
pub(super) struct UnavailableRepository {
    inserts: Mutex<usize>,
}

impl UnavailableRepository {
    pub(super) fn inserts(&self) -> usize {
        *self.inserts.lock().expect("repository mutex poisoned")
    }
}

#[async_trait]
impl ApplicationRepository for UnavailableRepository {
    async fn insert(&self, _record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        *self.inserts.lock().expect("repository mutex poisoned") += 1;
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    async fn fetch(
        &self,
        _application_id: &ApplicationId,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Holds every insert until `release` is notified.
#[derive(Default)]
pub(super) struct GatedRepository {
    pub(super) entered: Notify,
    pub(super) release: Notify,
    pub(super) inner: MemoryRepository,
}

#[async_trait]
impl ApplicationRepository for GatedRepository {
    async fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.insert(record).await
    }

    async fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<StoredApplication>, RepositoryError> {
        self.inner.fetch(application_id).await
    }
}

#[derive(Default)]
pub(super) struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub(super) fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
    }
}

pub(super) fn sequential_ids() -> Arc<SequentialIdGenerator> {
    Arc::new(SequentialIdGenerator::new("DLG"))
}

pub(super) fn coordinator<B, R>(
    store: Arc<B>,
    repository: Arc<R>,
    notifier: Arc<RecordingNotifier>,
    ids: Arc<SequentialIdGenerator>,
) -> SubmissionCoordinator<B, R, RecordingNotifier>
where
    B: BlobStore + 'static,
    R: ApplicationRepository + 'static,
{
    let ids: Arc<dyn ApplicationIdGenerator> = ids;
    SubmissionCoordinator::new(store, repository, notifier, ids)
}

pub(super) fn router_with<B, R>(store: Arc<B>, repository: Arc<R>) -> axum::Router
where
    B: BlobStore + 'static,
    R: ApplicationRepository + 'static,
{
    let ids: Arc<dyn ApplicationIdGenerator> = sequential_ids();
    let context = RegistrationContext::new(
        store,
        repository,
        Arc::new(RecordingNotifier::default()),
        ids,
    );
    registration_router(Arc::new(context))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
