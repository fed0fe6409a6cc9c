use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{DuplicateCheckPolicy, IntakeConfig};
use crate::notify::{render_confirmation, ConfirmationRequest, MailTransport};

use super::captcha::{ChallengeStore, ChallengeView};
use super::domain::{
    ApplicationForm, ApplicationId, ApplicationRecord, Availability, FileId, ResumeUpload,
};
use super::repository::{ApplicationRepository, RepositoryError, ResumeStore, StorageError};
use super::validation::{validate, ValidationReport};

const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Rejections raised by the resume constraints, before any upload happens.
#[derive(Debug, thiserror::Error)]
pub enum ResumeError {
    #[error("resume must be a PDF, DOC, or DOCX file, got '{0}'")]
    UnsupportedType(String),
    #[error("resume is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
    #[error("resume payload is not valid base64")]
    UndecodableData,
}

/// Error raised by the submission workflow.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("security answer did not match; a new question was generated")]
    Captcha { challenge: ChallengeView },
    #[error("submission failed validation")]
    Validation(ValidationReport),
    #[error("an application with this email for this job already exists")]
    Duplicate,
    #[error(transparent)]
    Resume(#[from] ResumeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Orchestrates a public submission end to end: CAPTCHA gate, validation,
/// duplicate probe, resume upload, document creation, and the compensating
/// delete when creation fails after an upload succeeded.
pub struct SubmissionService<R, S, M> {
    repository: Arc<R>,
    resumes: Arc<S>,
    mailer: Arc<M>,
    challenges: Arc<ChallengeStore>,
    config: IntakeConfig,
    email_from: String,
}

impl<R, S, M> SubmissionService<R, S, M>
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
{
    pub fn new(
        repository: Arc<R>,
        resumes: Arc<S>,
        mailer: Arc<M>,
        config: IntakeConfig,
        email_from: String,
    ) -> Self {
        Self {
            repository,
            resumes,
            mailer,
            challenges: Arc::new(ChallengeStore::default()),
            config,
            email_from,
        }
    }

    /// Issue a fresh math challenge for the next submission attempt.
    pub fn challenge(&self) -> ChallengeView {
        self.challenges.issue()
    }

    pub fn submit(&self, form: ApplicationForm) -> Result<ApplicationRecord, SubmissionError> {
        self.submit_on(form, Utc::now().date_naive())
    }

    /// `today` is injected so the age gate is deterministic under test.
    pub fn submit_on(
        &self,
        form: ApplicationForm,
        today: NaiveDate,
    ) -> Result<ApplicationRecord, SubmissionError> {
        if !self.challenges.verify(&form.challenge_id, &form.captcha_answer) {
            return Err(SubmissionError::Captcha {
                challenge: self.challenges.issue(),
            });
        }

        let report = validate(&form, today);
        if !report.is_valid() {
            return Err(SubmissionError::Validation(report));
        }

        // Resume constraints are enforced before any backend call so a
        // rejected file never reaches the bucket.
        let resume = form
            .resume
            .as_ref()
            .map(|upload| self.decode_resume(upload))
            .transpose()?;

        self.check_duplicate(&form)?;

        let resume_file = match resume {
            Some((name, mime_type, bytes)) => {
                Some(self.resumes.upload(&name, &mime_type, &bytes)?)
            }
            None => None,
        };

        let record = build_record(&form, resume_file.clone());
        match self.repository.insert(record) {
            Ok(stored) => {
                info!(application_id = %stored.id.0, "application stored");
                self.send_confirmation(&stored);
                Ok(stored)
            }
            Err(err) => {
                if let Some(file_id) = resume_file {
                    self.rollback_upload(&file_id);
                }
                Err(err.into())
            }
        }
    }

    fn check_duplicate(&self, form: &ApplicationForm) -> Result<(), SubmissionError> {
        match self
            .repository
            .find_by_email_and_target_job(&form.email, &form.target_job)
        {
            Ok(existing) if !existing.is_empty() => Err(SubmissionError::Duplicate),
            Ok(_) => Ok(()),
            Err(err) => match self.config.duplicate_check {
                DuplicateCheckPolicy::FailOpen => {
                    warn!(error = %err, "duplicate probe failed, continuing per fail-open policy");
                    Ok(())
                }
                DuplicateCheckPolicy::FailClosed => Err(err.into()),
            },
        }
    }

    fn decode_resume(
        &self,
        upload: &ResumeUpload,
    ) -> Result<(String, String, Vec<u8>), ResumeError> {
        let mime_type = upload
            .mime_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.essence_str().to_string())
            .map_err(|_| ResumeError::UnsupportedType(upload.mime_type.clone()))?;

        if !ALLOWED_RESUME_TYPES.contains(&mime_type.as_str()) {
            return Err(ResumeError::UnsupportedType(upload.mime_type.clone()));
        }

        let bytes = BASE64
            .decode(upload.data.as_bytes())
            .map_err(|_| ResumeError::UndecodableData)?;

        let size = bytes.len() as u64;
        if size > self.config.resume_max_bytes {
            return Err(ResumeError::TooLarge {
                size,
                limit: self.config.resume_max_bytes,
            });
        }

        Ok((upload.file_name.clone(), mime_type, bytes))
    }

    /// Best-effort compensating delete after a failed document create.
    fn rollback_upload(&self, file_id: &FileId) {
        if let Err(err) = self.resumes.delete(file_id) {
            warn!(file_id = %file_id.0, error = %err, "failed to clean up orphaned resume");
        }
    }

    /// Confirmation mail is best effort; a transport failure never fails the
    /// submission.
    fn send_confirmation(&self, record: &ApplicationRecord) {
        let request = ConfirmationRequest {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            target_job: record.target_job.clone(),
            availability: record.availability.label().to_string(),
        };
        let message = render_confirmation(&request, &self.email_from, record.created_at);
        if let Err(err) = self.mailer.send(&message) {
            warn!(error = %err, "confirmation email was not sent");
        }
    }
}

fn build_record(form: &ApplicationForm, resume_file: Option<FileId>) -> ApplicationRecord {
    // Validation has already vetted the date and availability.
    let birthday = NaiveDate::parse_from_str(form.dob.trim(), "%Y-%m-%d")
        .unwrap_or_else(|_| NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date"));
    let availability = form.availability.unwrap_or(Availability::WithinOneMonth);

    ApplicationRecord {
        id: ApplicationId(Uuid::new_v4().to_string()),
        first_name: form.first_name.trim().to_string(),
        last_name: form.last_name.trim().to_string(),
        email: form.email.trim().to_string(),
        birthday,
        experience: form.experience.clone(),
        diploma: form.diploma,
        french_level: form.french_level,
        english_level: form.english_level,
        target_job: form.target_job.clone(),
        availability,
        phone: form.phone.clone(),
        preferred_country: form.preferred_countries().encode(),
        linkedin_url: form
            .linkedin_url
            .as_ref()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty()),
        resume_file,
        created_at: Utc::now(),
    }
}
