use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

use horizon_intake::admin::auth::AccountService;
use horizon_intake::admin::{admin_router, AdminApi};
use horizon_intake::intake::repository::{
    ApplicationRepository, InterestFieldRepository, ResumeStore,
};
use horizon_intake::intake::{intake_router, PublicApi};
use horizon_intake::notify::MailTransport;

use crate::infra::AppState;

/// Assemble the whole HTTP surface: public intake, admin panel, and the
/// operational endpoints.
pub(crate) fn with_api_routes<R, S, M, F, A>(
    public: Arc<PublicApi<R, S, M, F>>,
    admin: Arc<AdminApi<R, S, F, A>>,
) -> Router
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    M: MailTransport + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    intake_router(public)
        .merge(admin_router(admin))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        EnvAccountService, InMemoryApplicationRepository, InMemoryInterestFieldRepository,
        InMemoryResumeStore, LoggingMailer,
    };
    use axum::body::Body;
    use axum::http::Request;
    use horizon_intake::admin::applications::AdminApplicationService;
    use horizon_intake::admin::settings::InterestFieldService;
    use horizon_intake::config::{BackendConfig, IntakeConfig};
    use horizon_intake::intake::SubmissionService;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let backend = BackendConfig::default();
        let config = IntakeConfig::default();

        let repository = Arc::new(InMemoryApplicationRepository::default());
        let resumes = Arc::new(InMemoryResumeStore::from_backend(&backend));
        let interest_fields = Arc::new(InMemoryInterestFieldRepository::default());
        let mailer = Arc::new(LoggingMailer);
        let accounts = Arc::new(EnvAccountService::from_env());

        let public = Arc::new(PublicApi {
            submissions: SubmissionService::new(
                repository.clone(),
                resumes.clone(),
                mailer.clone(),
                config.clone(),
                backend.email_from.clone(),
            ),
            interest_fields: interest_fields.clone(),
            mailer,
            email_api_key: None,
            email_from: backend.email_from.clone(),
        });
        let admin = Arc::new(AdminApi {
            applications: AdminApplicationService::new(repository, resumes, config.page_size),
            settings: InterestFieldService::new(interest_fields),
            accounts,
        });

        with_api_routes(public, admin)
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn challenge_endpoint_issues_a_question() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/applications/challenge")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert!(payload["challengeId"].is_string());
        let question = payload["question"].as_str().expect("question");
        assert!(question.contains('+') || question.contains('-'));
    }

    #[tokio::test]
    async fn interest_fields_endpoint_lists_the_seeded_options() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/interest-fields")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload.as_array().expect("array").len(), 3);
    }

    #[tokio::test]
    async fn admin_listing_requires_a_session() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/admin/applications")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn send_email_without_api_key_reports_not_configured() {
        let app = test_app();
        let body = json!({
            "firstName": "Ava",
            "lastName": "Haddad",
            "email": "ava@example.com",
            "targetJob": "developer",
            "availability": "1-3 months",
        });
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/send-email")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("request succeeds");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["success"], false);
        assert_eq!(payload["error"], "Email service not configured");
    }
}
