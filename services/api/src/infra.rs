use std::collections::HashMap;
use std::env;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;
use uuid::Uuid;

use horizon_intake::admin::auth::{AccountError, AccountService, AdminSession, SessionToken};
use horizon_intake::config::BackendConfig;
use horizon_intake::intake::domain::{
    ApplicationId, ApplicationRecord, FileId, InterestField, InterestFieldId,
};
use horizon_intake::intake::repository::{
    ApplicationPage, ApplicationRepository, InterestFieldRepository, RepositoryError, ResumeStore,
    StorageError,
};
use horizon_intake::notify::{MailError, MailTransport, OutboundEmail};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applications held in process memory, newest kept by `created_at` ordering.
#[derive(Default)]
pub(crate) struct InMemoryApplicationRepository {
    records: Mutex<Vec<ApplicationRecord>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn delete(&self, id: &ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let before = guard.len();
        guard.retain(|record| &record.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn find_by_email_and_target_job(
        &self,
        email: &str,
        target_job: &str,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| record.email == email && record.target_job == target_job)
            .cloned()
            .collect())
    }

    fn page(&self, limit: usize, offset: usize) -> Result<ApplicationPage, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut sorted: Vec<ApplicationRecord> = guard.clone();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = sorted.len();
        let records = sorted.into_iter().skip(offset).take(limit).collect();
        Ok(ApplicationPage { records, total })
    }
}

/// Resume bucket adapter. Bytes stay in memory, but the view and download
/// URLs follow the managed storage layout so the admin panel links look the
/// same as they would against the real backend.
pub(crate) struct InMemoryResumeStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    endpoint: String,
    project_id: String,
    bucket_id: String,
}

impl InMemoryResumeStore {
    pub(crate) fn from_backend(backend: &BackendConfig) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            endpoint: backend
                .endpoint
                .clone()
                .unwrap_or_else(|| "http://localhost/v1".to_string()),
            project_id: backend
                .project_id
                .clone()
                .unwrap_or_else(|| "horizon-talents".to_string()),
            bucket_id: backend
                .resumes_bucket
                .clone()
                .unwrap_or_else(|| "resumes".to_string()),
        }
    }

    fn file_url(&self, id: &FileId, suffix: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/{}?project={}",
            self.endpoint, self.bucket_id, id.0, suffix, self.project_id
        )
    }
}

impl ResumeStore for InMemoryResumeStore {
    fn upload(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<FileId, StorageError> {
        let id = FileId(Uuid::new_v4().to_string());
        self.files
            .lock()
            .expect("file mutex poisoned")
            .insert(id.0.clone(), bytes.to_vec());
        info!(%file_name, %mime_type, size = bytes.len(), file_id = %id.0, "resume stored");
        Ok(id)
    }

    fn delete(&self, id: &FileId) -> Result<(), StorageError> {
        self.files
            .lock()
            .expect("file mutex poisoned")
            .remove(&id.0)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    fn file_view_url(&self, id: &FileId) -> Result<String, StorageError> {
        Ok(self.file_url(id, "view"))
    }

    fn download_url(&self, id: &FileId) -> Result<String, StorageError> {
        Ok(self.file_url(id, "download"))
    }
}

/// Interest fields held in process memory, seeded with the starter categories
/// so the public form has options on a fresh deployment.
pub(crate) struct InMemoryInterestFieldRepository {
    fields: Mutex<Vec<InterestField>>,
}

impl Default for InMemoryInterestFieldRepository {
    fn default() -> Self {
        let seeded = ["Software Developer", "Healthcare Professional", "Engineer"]
            .into_iter()
            .map(|label| InterestField {
                id: InterestFieldId(Uuid::new_v4().to_string()),
                field: label.to_string(),
                visible: true,
            })
            .collect();
        Self {
            fields: Mutex::new(seeded),
        }
    }
}

impl InterestFieldRepository for InMemoryInterestFieldRepository {
    fn insert(&self, field: InterestField) -> Result<InterestField, RepositoryError> {
        self.fields
            .lock()
            .expect("field mutex poisoned")
            .push(field.clone());
        Ok(field)
    }

    fn update(&self, field: InterestField) -> Result<(), RepositoryError> {
        let mut guard = self.fields.lock().expect("field mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == field.id) {
            Some(existing) => {
                *existing = field;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn delete(&self, id: &InterestFieldId) -> Result<(), RepositoryError> {
        let mut guard = self.fields.lock().expect("field mutex poisoned");
        let before = guard.len();
        guard.retain(|field| &field.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn fetch(&self, id: &InterestFieldId) -> Result<Option<InterestField>, RepositoryError> {
        let guard = self.fields.lock().expect("field mutex poisoned");
        Ok(guard.iter().find(|field| &field.id == id).cloned())
    }

    fn list_all(&self) -> Result<Vec<InterestField>, RepositoryError> {
        Ok(self.fields.lock().expect("field mutex poisoned").clone())
    }
}

/// Single-admin account service. Credentials come from `ADMIN_EMAIL` and
/// `ADMIN_PASSWORD`, sessions are opaque tokens held in memory.
pub(crate) struct EnvAccountService {
    email: Mutex<String>,
    password: Mutex<String>,
    sessions: Mutex<HashMap<String, String>>,
}

impl EnvAccountService {
    pub(crate) fn from_env() -> Self {
        Self {
            email: Mutex::new(
                env::var("ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@horizontalents.example".to_string()),
            ),
            password: Mutex::new(
                env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "change-me-on-first-login".to_string()),
            ),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl AccountService for EnvAccountService {
    fn login(&self, email: &str, password: &str) -> Result<SessionToken, AccountError> {
        let known_email = self.email.lock().expect("account mutex poisoned");
        let known_password = self.password.lock().expect("account mutex poisoned");
        if email != known_email.as_str() || password != known_password.as_str() {
            return Err(AccountError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.clone(), known_email.clone());
        Ok(SessionToken(token))
    }

    fn logout(&self, token: &SessionToken) -> Result<(), AccountError> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(&token.0)
            .map(|_| ())
            .ok_or(AccountError::SessionExpired)
    }

    fn current(&self, token: &SessionToken) -> Result<AdminSession, AccountError> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(&token.0)
            .map(|email| AdminSession {
                email: email.clone(),
            })
            .ok_or(AccountError::SessionExpired)
    }

    fn update_password(
        &self,
        token: &SessionToken,
        current: &str,
        new: &str,
    ) -> Result<(), AccountError> {
        self.current(token)?;
        let mut password = self.password.lock().expect("account mutex poisoned");
        if current != password.as_str() {
            return Err(AccountError::InvalidCredentials);
        }
        *password = new.to_string();
        Ok(())
    }

    fn update_email(&self, token: &SessionToken, email: &str) -> Result<(), AccountError> {
        self.current(token)?;
        *self.email.lock().expect("account mutex poisoned") = email.to_string();
        Ok(())
    }
}

/// Development transport: confirmations are logged rather than sent.
#[derive(Default)]
pub(crate) struct LoggingMailer;

impl MailTransport for LoggingMailer {
    fn send(&self, message: &OutboundEmail) -> Result<(), MailError> {
        info!(to = %message.to, subject = %message.subject, "confirmation email dispatched");
        Ok(())
    }
}
