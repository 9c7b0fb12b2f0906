use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Human-readable identifier for a submitted application.
///
/// Distinct from the row identifier the record store assigns on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The six screens of the registration wizard, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Identity,
    Experience,
    Committees,
    Essays,
    Payment,
    Confirmation,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::Identity,
        WizardStep::Experience,
        WizardStep::Committees,
        WizardStep::Essays,
        WizardStep::Payment,
        WizardStep::Confirmation,
    ];

    /// Steps that collect input, i.e. everything before the confirmation screen.
    pub const INPUT: [WizardStep; 5] = [
        WizardStep::Identity,
        WizardStep::Experience,
        WizardStep::Committees,
        WizardStep::Essays,
        WizardStep::Payment,
    ];

    pub const fn number(self) -> u8 {
        match self {
            WizardStep::Identity => 1,
            WizardStep::Experience => 2,
            WizardStep::Committees => 3,
            WizardStep::Essays => 4,
            WizardStep::Payment => 5,
            WizardStep::Confirmation => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub const fn label(self) -> &'static str {
        match self {
            WizardStep::Identity => "Personal details",
            WizardStep::Experience => "Experience",
            WizardStep::Committees => "Committee preferences",
            WizardStep::Essays => "Essays",
            WizardStep::Payment => "Fees & documents",
            WizardStep::Confirmation => "Confirmation",
        }
    }

    /// Following input step; the confirmation screen is never a `next` target.
    pub(crate) fn next_input(self) -> Option<Self> {
        match self {
            WizardStep::Identity => Some(WizardStep::Experience),
            WizardStep::Experience => Some(WizardStep::Committees),
            WizardStep::Committees => Some(WizardStep::Essays),
            WizardStep::Essays => Some(WizardStep::Payment),
            WizardStep::Payment | WizardStep::Confirmation => None,
        }
    }

    pub(crate) fn previous(self) -> Option<Self> {
        match self {
            WizardStep::Identity | WizardStep::Confirmation => None,
            WizardStep::Experience => Some(WizardStep::Identity),
            WizardStep::Committees => Some(WizardStep::Experience),
            WizardStep::Essays => Some(WizardStep::Committees),
            WizardStep::Payment => Some(WizardStep::Essays),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.label())
    }
}

/// Binary file picked by the delegate.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    #[serde(rename = "data", with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercase extension taken from the file name, else guessed from the content type.
    pub fn extension(&self) -> String {
        let from_name = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        from_name
            .or_else(|| {
                mime_guess::get_mime_extensions_str(&self.content_type)
                    .and_then(|candidates| candidates.first())
                    .map(|ext| (*ext).to_string())
            })
            .unwrap_or_else(|| "bin".to_string())
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&general_purpose::STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        general_purpose::STANDARD
            .decode(raw.trim())
            .map_err(serde::de::Error::custom)
    }
}

/// Step 1: who the delegate is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityDetails {
    pub full_name: String,
    pub email: String,
    pub social_handle: String,
    pub institution: String,
    pub birth_date: String,
    pub location: String,
    pub phone: String,
    pub photo: Option<Attachment>,
}

/// Self-assessed conference experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }
}

/// Step 2: prior experience.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceDetails {
    pub level: Option<ExperienceLevel>,
    pub previous_conferences: String,
    pub portfolio_link: String,
}

/// Step 3: ranked committee choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteePreferences {
    pub first: String,
    pub second: String,
    pub third: String,
}

impl CommitteePreferences {
    pub fn ranked(&self) -> [&str; 3] {
        [
            self.first.as_str(),
            self.second.as_str(),
            self.third.as_str(),
        ]
    }
}

/// Step 4: free-text answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EssayResponses {
    pub motivation: String,
    pub contribution: String,
}

/// Answer to the registration-fee agreement question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeAgreement {
    Agree,
    Disagree,
}

impl FeeAgreement {
    pub const fn label(self) -> &'static str {
        match self {
            FeeAgreement::Agree => "agree",
            FeeAgreement::Disagree => "disagree",
        }
    }
}

/// Step 5: fee agreement, discount claims and their proofs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub fee_agreement: Option<FeeAgreement>,
    pub discount_tags: BTreeSet<String>,
    pub ielts_proof: Option<Attachment>,
    pub sat_proof: Option<Attachment>,
    pub confirmed: bool,
}

/// One wizard step's worth of input; applying it replaces that step's section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepData {
    Identity(IdentityDetails),
    Experience(ExperienceDetails),
    Committees(CommitteePreferences),
    Essays(EssayResponses),
    Payment(PaymentDetails),
}

impl StepData {
    pub fn step(&self) -> WizardStep {
        match self {
            StepData::Identity(_) => WizardStep::Identity,
            StepData::Experience(_) => WizardStep::Experience,
            StepData::Committees(_) => WizardStep::Committees,
            StepData::Essays(_) => WizardStep::Essays,
            StepData::Payment(_) => WizardStep::Payment,
        }
    }
}

/// Everything the wizard has collected so far for one registration session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationFormState {
    pub application_id: Option<ApplicationId>,
    pub identity: IdentityDetails,
    pub experience: ExperienceDetails,
    pub committees: CommitteePreferences,
    pub essays: EssayResponses,
    pub payment: PaymentDetails,
}

impl RegistrationFormState {
    pub fn apply(&mut self, data: StepData) {
        match data {
            StepData::Identity(identity) => self.identity = identity,
            StepData::Experience(experience) => self.experience = experience,
            StepData::Committees(committees) => self.committees = committees,
            StepData::Essays(essays) => self.essays = essays,
            StepData::Payment(payment) => self.payment = payment,
        }
    }

    /// Borrowed view of the three optional uploads, in upload order.
    pub fn attachments(&self) -> AttachmentSet<'_> {
        AttachmentSet {
            photo: self.identity.photo.as_ref(),
            ielts_proof: self.payment.ielts_proof.as_ref(),
            sat_proof: self.payment.sat_proof.as_ref(),
        }
    }
}

/// Which optional upload an attachment fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Photo,
    IeltsProof,
    SatProof,
}

impl AttachmentKind {
    /// Fixed upload order.
    pub const ORDER: [AttachmentKind; 3] = [
        AttachmentKind::Photo,
        AttachmentKind::IeltsProof,
        AttachmentKind::SatProof,
    ];

    pub const fn category(self) -> &'static str {
        match self {
            AttachmentKind::Photo => "photos",
            AttachmentKind::IeltsProof | AttachmentKind::SatProof => "certificates",
        }
    }

    pub const fn suffix(self) -> &'static str {
        match self {
            AttachmentKind::Photo => "photo",
            AttachmentKind::IeltsProof => "ielts",
            AttachmentKind::SatProof => "sat",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            AttachmentKind::Photo => "profile photo",
            AttachmentKind::IeltsProof => "IELTS certificate",
            AttachmentKind::SatProof => "SAT certificate",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachmentSet<'a> {
    pub photo: Option<&'a Attachment>,
    pub ielts_proof: Option<&'a Attachment>,
    pub sat_proof: Option<&'a Attachment>,
}

impl<'a> AttachmentSet<'a> {
    pub fn get(&self, kind: AttachmentKind) -> Option<&'a Attachment> {
        match kind {
            AttachmentKind::Photo => self.photo,
            AttachmentKind::IeltsProof => self.ielts_proof,
            AttachmentKind::SatProof => self.sat_proof,
        }
    }
}

/// Lifecycle status stored on a record. Intake only ever writes `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
        }
    }
}
