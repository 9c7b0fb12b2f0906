//! Delegate registration intake: the step-by-step wizard, its validation
//! gates, attachment uploads, fee calculation and the final submission of an
//! immutable application record.

pub mod domain;
pub mod fees;
pub mod ids;
pub mod record;
pub mod repository;
pub mod router;
pub mod service;
pub mod storage;
pub mod uploads;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationId, ApplicationStatus, Attachment, AttachmentKind, AttachmentSet,
    CommitteePreferences, EssayResponses, ExperienceDetails, ExperienceLevel, FeeAgreement,
    IdentityDetails, PaymentDetails, RegistrationFormState, StepData, WizardStep,
};
pub use fees::{
    DiscountTag, FeeBreakdown, FeeCalculator, ADVERTISED_MAX_DISCOUNT, BASE_FEE,
};
pub use ids::{ApplicationIdGenerator, SequentialIdGenerator, TimestampIdGenerator};
pub use record::{ApplicationRecord, CompletedRegistration};
pub use repository::{
    ApplicationRepository, ApplicationStatusView, Notice, NoticeLevel, Notifier, RepositoryError,
    StoredApplication,
};
pub use router::{registration_router, RegistrationContext};
pub use service::{SubmissionCoordinator, SubmissionError, SubmissionOutcome};
pub use storage::{BlobPath, BlobStore, BlobStoreError, LocalBlobStore, StoredObject};
pub use uploads::{FileUploadOrchestrator, UploadError, UploadedFiles};
pub use validation::{
    EssayFeedback, FieldValidator, ValidationIssue, WordCountStatus, SUGGESTED_ESSAY_WORDS,
};
pub use wizard::{
    reduce, Transition, TransitionOutcome, WizardAction, WizardController, WizardEffect,
    WizardState,
};
