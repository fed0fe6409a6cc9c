use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::applications::{AdminApplicationService, AdminError};
use super::auth::{bearer_token, AccountError, AccountService, AdminSession};
use super::settings::{change_password, InterestFieldService, PasswordChangeError, SettingsError};
use crate::intake::domain::{ApplicationId, InterestFieldId};
use crate::intake::repository::{
    ApplicationRepository, InterestFieldRepository, RepositoryError, ResumeStore,
};

/// Everything the admin surface needs behind one state handle.
pub struct AdminApi<R, S, F, A> {
    pub applications: AdminApplicationService<R, S>,
    pub settings: InterestFieldService<F>,
    pub accounts: Arc<A>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordChangeRequest {
    current_password: String,
    new_password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterestFieldUpsert {
    field: String,
    #[serde(default = "default_visible")]
    visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Router builder exposing the admin panel endpoints. Everything except
/// `login` requires a bearer session token.
pub fn admin_router<R, S, F, A>(api: Arc<AdminApi<R, S, F, A>>) -> Router
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    Router::new()
        .route("/api/v1/admin/login", post(login_handler::<R, S, F, A>))
        .route("/api/v1/admin/logout", post(logout_handler::<R, S, F, A>))
        .route(
            "/api/v1/admin/password",
            post(password_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/applications",
            get(list_applications_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/applications/:application_id",
            get(get_application_handler::<R, S, F, A>)
                .delete(delete_application_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/resume",
            get(resume_links_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/interest-fields",
            get(list_fields_handler::<R, S, F, A>).post(create_field_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/interest-fields/:field_id",
            put(update_field_handler::<R, S, F, A>).delete(delete_field_handler::<R, S, F, A>),
        )
        .route(
            "/api/v1/admin/interest-fields/:field_id/toggle",
            post(toggle_field_handler::<R, S, F, A>),
        )
        .with_state(api)
}

fn unauthorized(err: AccountError) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

fn authorize<R, S, F, A>(
    api: &AdminApi<R, S, F, A>,
    headers: &HeaderMap,
) -> Result<AdminSession, Response>
where
    A: AccountService + 'static,
{
    let token = bearer_token(headers)
        .ok_or_else(|| unauthorized(AccountError::SessionExpired))?;
    api.accounts
        .current(&token)
        .map_err(unauthorized)
}

fn admin_error(err: AdminError) -> Response {
    let status = match &err {
        AdminError::NotFound | AdminError::NoResume => StatusCode::NOT_FOUND,
        AdminError::Repository(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

fn settings_error(err: SettingsError) -> Response {
    let status = match &err {
        SettingsError::BlankLabel => StatusCode::UNPROCESSABLE_ENTITY,
        SettingsError::NotFound => StatusCode::NOT_FOUND,
        SettingsError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SettingsError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

pub(crate) async fn login_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    match api.accounts.login(&request.email, &request.password) {
        Ok(token) => (StatusCode::OK, Json(json!({ "token": token.0 }))).into_response(),
        Err(err) => unauthorized(err),
    }
}

pub(crate) async fn logout_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthorized(AccountError::SessionExpired);
    };
    match api.accounts.logout(&token) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => unauthorized(err),
    }
}

pub(crate) async fn password_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Json(request): Json<PasswordChangeRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthorized(AccountError::SessionExpired);
    };
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }

    match change_password(
        api.accounts.as_ref(),
        &token,
        &request.current_password,
        &request.new_password,
        &request.confirm_password,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(PasswordChangeError::Account(err)) => unauthorized(err),
        Err(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": err.to_string() })),
        )
            .into_response(),
    }
}

pub(crate) async fn list_applications_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.applications.page(query.page.unwrap_or(1)) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(err) => admin_error(err),
    }
}

pub(crate) async fn get_application_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.applications.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => admin_error(err),
    }
}

pub(crate) async fn delete_application_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api
        .applications
        .delete(&ApplicationId(application_id), query.page.unwrap_or(1))
    {
        Ok(page) => (StatusCode::OK, Json(json!({ "page": page }))).into_response(),
        Err(err) => admin_error(err),
    }
}

pub(crate) async fn resume_links_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api
        .applications
        .resume_links(&ApplicationId(application_id))
    {
        Ok(links) => (StatusCode::OK, Json(links)).into_response(),
        Err(err) => admin_error(err),
    }
}

pub(crate) async fn list_fields_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.settings.list() {
        Ok(fields) => (StatusCode::OK, Json(fields)).into_response(),
        Err(err) => settings_error(err),
    }
}

pub(crate) async fn create_field_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Json(request): Json<InterestFieldUpsert>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.settings.create(&request.field) {
        Ok(field) => (StatusCode::CREATED, Json(field)).into_response(),
        Err(err) => settings_error(err),
    }
}

pub(crate) async fn update_field_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(field_id): Path<String>,
    Json(request): Json<InterestFieldUpsert>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.settings.update(
        &InterestFieldId(field_id),
        &request.field,
        request.visible,
    ) {
        Ok(field) => (StatusCode::OK, Json(field)).into_response(),
        Err(err) => settings_error(err),
    }
}

pub(crate) async fn delete_field_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(field_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.settings.delete(&InterestFieldId(field_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => settings_error(err),
    }
}

pub(crate) async fn toggle_field_handler<R, S, F, A>(
    State(api): State<Arc<AdminApi<R, S, F, A>>>,
    headers: HeaderMap,
    Path(field_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    S: ResumeStore + 'static,
    F: InterestFieldRepository + 'static,
    A: AccountService + 'static,
{
    if let Err(err) = authorize(&api, &headers) {
        return err;
    }
    match api.settings.toggle_visibility(&InterestFieldId(field_id)) {
        Ok(field) => (StatusCode::OK, Json(field)).into_response(),
        Err(err) => settings_error(err),
    }
}
