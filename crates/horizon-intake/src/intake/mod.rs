//! Public application intake: form validation, the math CAPTCHA gate, the
//! duplicate probe, and the upload-then-create submission workflow with its
//! compensating delete.

pub mod captcha;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod validation;

pub use captcha::{ChallengeStore, ChallengeView};
pub use domain::{
    ApplicationForm, ApplicationId, ApplicationRecord, Availability, CefrLevel, Diploma,
    DomainParseError, ExperienceEntry, ExperienceYears, FileId, InterestField, InterestFieldId,
    PreferredCountries, ResumeUpload, MAX_EXPERIENCE_ENTRIES,
};
pub use repository::{
    ApplicationPage, ApplicationRepository, InterestFieldRepository, RepositoryError, ResumeStore,
    StorageError, SubmissionReceipt,
};
pub use router::{intake_router, PublicApi};
pub use service::{ResumeError, SubmissionError, SubmissionService};
pub use validation::{validate, ValidationReport};
