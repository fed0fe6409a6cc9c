//! End-to-end scenarios for the public submission workflow: the CAPTCHA gate,
//! validation, the duplicate probe, resume constraints, and the compensating
//! delete after a failed document create.

mod common {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use horizon_intake::intake::domain::{ApplicationId, ApplicationRecord, FileId};
    use horizon_intake::intake::repository::{
        ApplicationPage, ApplicationRepository, RepositoryError, ResumeStore, StorageError,
    };
    use horizon_intake::notify::{MailError, MailTransport, OutboundEmail};

    #[derive(Default)]
    pub struct InMemoryApplicationRepository {
        records: Mutex<Vec<ApplicationRecord>>,
        pub fail_insert: AtomicBool,
        pub fail_probe: AtomicBool,
    }

    impl InMemoryApplicationRepository {
        pub fn stored(&self) -> Vec<ApplicationRecord> {
            self.records.lock().expect("repository mutex poisoned").clone()
        }
    }

    impl ApplicationRepository for InMemoryApplicationRepository {
        fn insert(
            &self,
            record: ApplicationRecord,
        ) -> Result<ApplicationRecord, RepositoryError> {
            if self.fail_insert.load(Ordering::Relaxed) {
                return Err(RepositoryError::Unavailable("injected failure".to_string()));
            }
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
            if self.fail_probe.load(Ordering::Relaxed) {
                return Err(RepositoryError::Unavailable("probe offline".to_string()));
            }
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

    #[derive(Default)]
    pub struct InMemoryResumeStore {
        files: Mutex<Vec<FileId>>,
        sequence: AtomicUsize,
        pub delete_calls: AtomicUsize,
        pub fail_upload: AtomicBool,
    }

    impl InMemoryResumeStore {
        pub fn file_count(&self) -> usize {
            self.files.lock().expect("store mutex poisoned").len()
        }
    }

    impl ResumeStore for InMemoryResumeStore {
        fn upload(
            &self,
            _file_name: &str,
            _mime_type: &str,
            _bytes: &[u8],
        ) -> Result<FileId, StorageError> {
            if self.fail_upload.load(Ordering::Relaxed) {
                return Err(StorageError::Unavailable("bucket offline".to_string()));
            }
            let id = FileId(format!(
                "file-{}",
                self.sequence.fetch_add(1, Ordering::Relaxed)
            ));
            self.files
                .lock()
                .expect("store mutex poisoned")
                .push(id.clone());
            Ok(id)
        }

        fn delete(&self, id: &FileId) -> Result<(), StorageError> {
            self.delete_calls.fetch_add(1, Ordering::Relaxed);
            let mut guard = self.files.lock().expect("store mutex poisoned");
            let before = guard.len();
            guard.retain(|stored| stored != id);
            if guard.len() == before {
                return Err(StorageError::NotFound);
            }
            Ok(())
        }

        fn file_view_url(&self, id: &FileId) -> Result<String, StorageError> {
            Ok(format!("https://files.test/view/{}", id.0))
        }

        fn download_url(&self, id: &FileId) -> Result<String, StorageError> {
            Ok(format!("https://files.test/download/{}", id.0))
        }
    }

    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutboundEmail>>,
    }

    impl MailTransport for RecordingMailer {
        fn send(&self, message: &OutboundEmail) -> Result<(), MailError> {
            self.sent
                .lock()
                .expect("mailer mutex poisoned")
                .push(message.clone());
            Ok(())
        }
    }

    pub fn fakes() -> (
        Arc<InMemoryApplicationRepository>,
        Arc<InMemoryResumeStore>,
        Arc<RecordingMailer>,
    ) {
        (
            Arc::new(InMemoryApplicationRepository::default()),
            Arc::new(InMemoryResumeStore::default()),
            Arc::new(RecordingMailer::default()),
        )
    }
}

use std::sync::atomic::Ordering;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use horizon_intake::config::{DuplicateCheckPolicy, IntakeConfig};
use horizon_intake::intake::domain::{ApplicationForm, Availability, ResumeUpload};
use horizon_intake::intake::service::{ResumeError, SubmissionError, SubmissionService};
use horizon_intake::intake::ChallengeView;

use common::{fakes, InMemoryApplicationRepository, InMemoryResumeStore, RecordingMailer};

type Service =
    SubmissionService<InMemoryApplicationRepository, InMemoryResumeStore, RecordingMailer>;

fn service_with_config(
    repository: Arc<InMemoryApplicationRepository>,
    resumes: Arc<InMemoryResumeStore>,
    mailer: Arc<RecordingMailer>,
    config: IntakeConfig,
) -> Service {
    SubmissionService::new(
        repository,
        resumes,
        mailer,
        config,
        "careers@horizontalents.example".to_string(),
    )
}

fn solve(challenge: &ChallengeView) -> String {
    let mut parts = challenge.question.split_whitespace();
    let a: i64 = parts.next().expect("lhs").parse().expect("number");
    let op = parts.next().expect("operator");
    let b: i64 = parts.next().expect("rhs").parse().expect("number");
    let answer = match op {
        "+" => a + b,
        "-" => a - b,
        other => panic!("unexpected operator {other}"),
    };
    answer.to_string()
}

fn form_with_challenge(service: &Service) -> ApplicationForm {
    let challenge = service.challenge();
    ApplicationForm {
        first_name: "Ava".to_string(),
        last_name: "Haddad".to_string(),
        email: "ava@example.com".to_string(),
        dob: "1995-04-12".to_string(),
        experience: vec!["2:frontend work at an agency".to_string()],
        target_job: "developer".to_string(),
        availability: Some(Availability::WithinOneMonth),
        phone: "+21612345678".to_string(),
        preferred_country1: "Germany".to_string(),
        preferred_country2: "France".to_string(),
        preferred_country3: "Belgium".to_string(),
        captcha_answer: solve(&challenge),
        challenge_id: challenge.challenge_id,
        ..Default::default()
    }
}

fn pdf_resume(bytes: usize) -> ResumeUpload {
    ResumeUpload {
        file_name: "resume.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        data: BASE64.encode(vec![0u8; bytes]),
    }
}

#[test]
fn submission_stores_document_and_sends_confirmation() {
    let (repository, resumes, mailer) = fakes();
    let service = service_with_config(
        repository.clone(),
        resumes.clone(),
        mailer.clone(),
        IntakeConfig::default(),
    );

    let mut form = form_with_challenge(&service);
    form.resume = Some(pdf_resume(1024));

    let record = service.submit(form).expect("submission succeeds");

    assert_eq!(record.preferred_country, "Germany:France:Belgium");
    assert!(record.resume_file.is_some());
    assert_eq!(repository.stored().len(), 1);
    assert_eq!(resumes.file_count(), 1);

    let sent = mailer.sent.lock().expect("mailer mutex poisoned");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ava@example.com");
    assert!(sent[0].text.contains("Position Applied For: developer"));
}

#[test]
fn wrong_captcha_answer_aborts_and_regenerates() {
    let (repository, resumes, mailer) = fakes();
    let service =
        service_with_config(repository.clone(), resumes, mailer, IntakeConfig::default());

    let mut form = form_with_challenge(&service);
    let original_id = form.challenge_id.clone();
    form.captcha_answer = "99999".to_string();

    match service.submit(form) {
        Err(SubmissionError::Captcha { challenge }) => {
            assert_ne!(challenge.challenge_id, original_id);
        }
        other => panic!("expected captcha rejection, got {other:?}"),
    }
    assert!(repository.stored().is_empty());
}

#[test]
fn used_challenge_cannot_be_replayed() {
    let (repository, resumes, mailer) = fakes();
    let service =
        service_with_config(repository.clone(), resumes, mailer, IntakeConfig::default());

    let form = form_with_challenge(&service);
    let mut replay = form.clone();
    service.submit(form).expect("first submission succeeds");

    // Same challenge id and answer, different applicant pair.
    replay.email = "other@example.com".to_string();
    assert!(matches!(
        service.submit(replay),
        Err(SubmissionError::Captcha { .. })
    ));
}

#[test]
fn duplicate_pair_aborts_without_creating_anything() {
    let (repository, resumes, mailer) = fakes();
    let service = service_with_config(
        repository.clone(),
        resumes.clone(),
        mailer,
        IntakeConfig::default(),
    );

    let first = form_with_challenge(&service);
    service.submit(first).expect("first submission succeeds");
    assert_eq!(repository.stored().len(), 1);

    let mut second = form_with_challenge(&service);
    second.resume = Some(pdf_resume(1024));
    assert!(matches!(
        service.submit(second),
        Err(SubmissionError::Duplicate)
    ));

    assert_eq!(repository.stored().len(), 1, "no second document");
    assert_eq!(resumes.file_count(), 0, "no file uploaded for the duplicate");
}

#[test]
fn same_email_different_job_is_accepted() {
    let (repository, resumes, mailer) = fakes();
    let service =
        service_with_config(repository.clone(), resumes, mailer, IntakeConfig::default());

    service
        .submit(form_with_challenge(&service))
        .expect("first submission succeeds");

    let mut second = form_with_challenge(&service);
    second.target_job = "qa".to_string();
    service.submit(second).expect("different job accepted");
    assert_eq!(repository.stored().len(), 2);
}

#[test]
fn oversized_resume_is_rejected_before_upload() {
    let (repository, resumes, mailer) = fakes();
    let config = IntakeConfig {
        resume_max_bytes: 512,
        ..IntakeConfig::default()
    };
    let service = service_with_config(repository.clone(), resumes.clone(), mailer, config);

    let mut form = form_with_challenge(&service);
    form.resume = Some(pdf_resume(1024));

    assert!(matches!(
        service.submit(form),
        Err(SubmissionError::Resume(ResumeError::TooLarge { .. }))
    ));
    assert_eq!(resumes.file_count(), 0, "no upload attempted");
    assert!(repository.stored().is_empty());
}

#[test]
fn disallowed_mime_type_is_rejected_before_upload() {
    let (repository, resumes, mailer) = fakes();
    let service =
        service_with_config(repository, resumes.clone(), mailer, IntakeConfig::default());

    let mut form = form_with_challenge(&service);
    form.resume = Some(ResumeUpload {
        file_name: "resume.png".to_string(),
        mime_type: "image/png".to_string(),
        data: BASE64.encode(b"not a resume"),
    });

    assert!(matches!(
        service.submit(form),
        Err(SubmissionError::Resume(ResumeError::UnsupportedType(_)))
    ));
    assert_eq!(resumes.file_count(), 0);
}

#[test]
fn failed_create_after_upload_deletes_the_file_once() {
    let (repository, resumes, mailer) = fakes();
    let service = service_with_config(
        repository.clone(),
        resumes.clone(),
        mailer,
        IntakeConfig::default(),
    );

    let mut form = form_with_challenge(&service);
    form.resume = Some(pdf_resume(1024));
    repository.fail_insert.store(true, Ordering::Relaxed);

    assert!(matches!(
        service.submit(form),
        Err(SubmissionError::Repository(_))
    ));
    assert_eq!(
        resumes.delete_calls.load(Ordering::Relaxed),
        1,
        "compensating delete invoked exactly once"
    );
    assert_eq!(resumes.file_count(), 0, "no orphaned file left behind");
}

#[test]
fn probe_failure_honors_fail_closed_policy() {
    let (repository, resumes, mailer) = fakes();
    let service = service_with_config(
        repository.clone(),
        resumes,
        mailer,
        IntakeConfig::default(),
    );

    repository.fail_probe.store(true, Ordering::Relaxed);
    assert!(matches!(
        service.submit(form_with_challenge(&service)),
        Err(SubmissionError::Repository(_))
    ));
    assert!(repository.stored().is_empty());
}

#[test]
fn probe_failure_honors_fail_open_policy() {
    let (repository, resumes, mailer) = fakes();
    let config = IntakeConfig {
        duplicate_check: DuplicateCheckPolicy::FailOpen,
        ..IntakeConfig::default()
    };
    let service = service_with_config(repository.clone(), resumes, mailer, config);

    repository.fail_probe.store(true, Ordering::Relaxed);
    service
        .submit(form_with_challenge(&service))
        .expect("fail-open proceeds despite the probe outage");
    assert_eq!(repository.stored().len(), 1);
}

#[test]
fn invalid_form_is_reported_field_by_field() {
    let (repository, resumes, mailer) = fakes();
    let service =
        service_with_config(repository.clone(), resumes, mailer, IntakeConfig::default());

    let mut form = form_with_challenge(&service);
    form.first_name = String::new();
    form.preferred_country3 = "Germany".to_string();

    match service.submit(form) {
        Err(SubmissionError::Validation(report)) => {
            assert!(report.errors.contains_key("firstName"));
            assert!(report.errors.contains_key("preferredCountry"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(repository.stored().is_empty());
}
