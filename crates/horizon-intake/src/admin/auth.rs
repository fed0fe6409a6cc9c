use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::Serialize;

/// Opaque session token issued by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken(pub String);

/// The signed-in admin as reported by the account service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    pub email: String,
}

/// Account/session seam over the managed auth collaborator. The app keeps no
/// local account state beyond the token it is handed.
pub trait AccountService: Send + Sync {
    fn login(&self, email: &str, password: &str) -> Result<SessionToken, AccountError>;
    fn logout(&self, token: &SessionToken) -> Result<(), AccountError>;
    fn current(&self, token: &SessionToken) -> Result<AdminSession, AccountError>;
    fn update_password(
        &self,
        token: &SessionToken,
        current: &str,
        new: &str,
    ) -> Result<(), AccountError>;
    fn update_email(&self, token: &SessionToken, email: &str) -> Result<(), AccountError>;
}

/// Error enumeration for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session expired or unknown")]
    SessionExpired,
    #[error("account service unavailable: {0}")]
    Unavailable(String),
}

/// Pull the bearer token off a request, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| SessionToken(token.trim().to_string()))
        .filter(|token| !token.0.is_empty())
}
