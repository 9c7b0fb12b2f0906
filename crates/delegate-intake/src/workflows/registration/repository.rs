use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::ApplicationId;
use super::record::ApplicationRecord;

/// A record as the store holds it, with the identifiers the store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredApplication {
    pub row_id: u64,
    pub created_at: DateTime<Utc>,
    pub record: ApplicationRecord,
}

impl StoredApplication {
    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.record.application_id.clone(),
            status: self.record.status.label(),
            final_fee: self.record.final_fee,
            submitted_at: self.record.submitted_at,
        }
    }
}

/// Insert-only persistence gateway for application records.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, record: ApplicationRecord) -> Result<StoredApplication, RepositoryError>;

    async fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<StoredApplication>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("application {0} already exists")]
    Conflict(ApplicationId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Toast shown to the delegate once a submission attempt finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Notification surface. Delivery is best effort and cannot fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Public view of a stored application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub final_fee: i64,
    pub submitted_at: DateTime<Utc>,
}
