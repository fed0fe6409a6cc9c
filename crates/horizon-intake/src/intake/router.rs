use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use crate::notify::{render_confirmation, ConfirmationRequest, MailTransport};

use super::domain::ApplicationForm;
use super::repository::{
    ApplicationRepository, InterestFieldRepository, RepositoryError, ResumeStore, StorageError,
};
use super::service::{SubmissionError, SubmissionService};

/// Everything the public surface needs behind one state handle.
pub struct PublicApi<R, S, M, F> {
    pub submissions: SubmissionService<R, S, M>,
    pub interest_fields: Arc<F>,
    pub mailer: Arc<M>,
    pub email_api_key: Option<String>,
    pub email_from: String,
}

/// Router builder exposing the applicant-facing endpoints.
pub fn intake_router<R, S, M, F>(api: Arc<PublicApi<R, S, M, F>>) -> Router
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications/challenge",
            get(challenge_handler::<R, S, M, F>),
        )
        .route("/api/v1/applications", post(submit_handler::<R, S, M, F>))
        .route(
            "/api/v1/interest-fields",
            get(interest_fields_handler::<R, S, M, F>),
        )
        .route("/api/send-email", post(send_email_handler::<R, S, M, F>))
        .with_state(api)
}

pub(crate) async fn challenge_handler<R, S, M, F>(
    State(api): State<Arc<PublicApi<R, S, M, F>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
{
    (StatusCode::OK, Json(api.submissions.challenge())).into_response()
}

pub(crate) async fn submit_handler<R, S, M, F>(
    State(api): State<Arc<PublicApi<R, S, M, F>>>,
    Json(form): Json<ApplicationForm>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
{
    match api.submissions.submit(form) {
        Ok(record) => (StatusCode::CREATED, Json(record.receipt())).into_response(),
        Err(SubmissionError::Captcha { challenge }) => {
            let payload = json!({
                "error": "security answer did not match; a new question was generated",
                "challenge": challenge,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(SubmissionError::Validation(report)) => {
            let payload = json!({
                "error": "submission failed validation",
                "errors": report.errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(SubmissionError::Duplicate) => {
            let payload = json!({
                "error": "an application with this email for this job already exists",
            });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(SubmissionError::Resume(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(other) => backend_error(other).into_response(),
    }
}

pub(crate) async fn interest_fields_handler<R, S, M, F>(
    State(api): State<Arc<PublicApi<R, S, M, F>>>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
{
    match api.interest_fields.list_visible() {
        Ok(fields) => (StatusCode::OK, Json(fields)).into_response(),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn send_email_handler<R, S, M, F>(
    State(api): State<Arc<PublicApi<R, S, M, F>>>,
    Json(request): Json<ConfirmationRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
{
    if api.email_api_key.is_none() {
        let payload = json!({ "success": false, "error": "Email service not configured" });
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
    }

    let message = render_confirmation(&request, &api.email_from, Utc::now());
    match api.mailer.send(&message) {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "data": { "to": message.to, "subject": message.subject },
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "success": false, "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn backend_error(err: SubmissionError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        SubmissionError::Repository(RepositoryError::Unavailable(_))
        | SubmissionError::Storage(StorageError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() })))
}
