use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicationId, ApplicationRecord, FileId, InterestField, InterestFieldId};

/// One page of the admin application listing.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationPage {
    pub records: Vec<ApplicationRecord>,
    pub total: usize,
}

/// Storage abstraction over the `applications` collection so the services can
/// be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError>;
    /// The duplicate probe: equality on both fields.
    fn find_by_email_and_target_job(
        &self,
        email: &str,
        target_job: &str,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    /// Records sorted by creation time descending, with the total count.
    fn page(&self, limit: usize, offset: usize) -> Result<ApplicationPage, RepositoryError>;
}

/// Storage abstraction over the `interestFields` collection.
pub trait InterestFieldRepository: Send + Sync {
    fn insert(&self, field: InterestField) -> Result<InterestField, RepositoryError>;
    fn update(&self, field: InterestField) -> Result<(), RepositoryError>;
    fn delete(&self, id: &InterestFieldId) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &InterestFieldId) -> Result<Option<InterestField>, RepositoryError>;
    fn list_all(&self) -> Result<Vec<InterestField>, RepositoryError>;

    /// The subset the public form offers.
    fn list_visible(&self) -> Result<Vec<InterestField>, RepositoryError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|field| field.visible)
            .collect())
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Object-storage abstraction over the `resumes` bucket.
pub trait ResumeStore: Send + Sync {
    fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<FileId, StorageError>;
    fn delete(&self, id: &FileId) -> Result<(), StorageError>;
    /// URL that opens the file inline.
    fn file_view_url(&self, id: &FileId) -> Result<String, StorageError>;
    /// URL that triggers a browser download.
    fn download_url(&self, id: &FileId) -> Result<String, StorageError>;
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized acknowledgment returned to the applicant after a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub application_id: ApplicationId,
    pub created_at: DateTime<Utc>,
    pub message: &'static str,
}

impl ApplicationRecord {
    pub fn receipt(&self) -> SubmissionReceipt {
        SubmissionReceipt {
            application_id: self.id.clone(),
            created_at: self.created_at,
            message: "Application submitted successfully!",
        }
    }
}
