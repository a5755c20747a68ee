use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::AppState;

pub const SESSION_HEADER: &str = "x-riderly-session";

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub role: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

pub fn authorize(header: Option<&str>) -> Result<Session, AppError> {
    let raw = header.ok_or_else(|| AppError::Unauthorized("missing session".to_string()))?;
    let session: Session = serde_json::from_str(raw)
        .map_err(|_| AppError::Unauthorized("malformed session".to_string()))?;

    if session.token.trim().is_empty() {
        return Err(AppError::Unauthorized("missing session token".to_string()));
    }
    if !session.is_admin() {
        return Err(AppError::Forbidden("admin role required".to_string()));
    }

    Ok(session)
}

pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.settings.require_admin {
        return next.run(request).await;
    }

    let header = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    match authorize(header) {
        Ok(_) => next.run(request).await,
        Err(err) => {
            warn!(path = %request.uri().path(), error = %err, "rejected request");
            err.into_response()
        }
    }
}

#[async_trait]
pub trait PasswordResets: Send + Sync {
    async fn request_reset(&self, email: &str) -> Result<(), AppError>;
}

#[derive(Default)]
pub struct MemoryAuth {
    requests: DashMap<String, usize>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests_for(&self, email: &str) -> usize {
        self.requests
            .get(&email.to_lowercase())
            .map(|count| *count)
            .unwrap_or(0)
    }
}

#[async_trait]
impl PasswordResets for MemoryAuth {
    async fn request_reset(&self, email: &str) -> Result<(), AppError> {
        let email = validate_email(email)?;
        *self.requests.entry(email.to_lowercase()).or_insert(0) += 1;
        info!(email = %email, "password reset requested");
        Ok(())
    }
}

pub fn validate_email(raw: &str) -> Result<&str, AppError> {
    let email = raw.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::BadRequest(format!("invalid email address: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{authorize, validate_email, MemoryAuth, PasswordResets};
    use crate::error::AppError;

    #[test]
    fn admin_session_is_admitted() {
        let session = authorize(Some(r#"{"token":"abc","role":"admin"}"#)).unwrap();
        assert_eq!(session.token, "abc");
    }

    #[test]
    fn missing_or_broken_sessions_are_unauthorized() {
        assert!(matches!(authorize(None), Err(AppError::Unauthorized(_))));
        assert!(matches!(
            authorize(Some("not json")),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize(Some(r#"{"token":" ","role":"admin"}"#)),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn other_roles_are_forbidden() {
        assert!(matches!(
            authorize(Some(r#"{"token":"abc","role":"user"}"#)),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            authorize(Some(r#"{"token":"abc","role":"Admin"}"#)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn email_validation() {
        assert_eq!(validate_email(" ops@riderly.ph ").unwrap(), "ops@riderly.ph");
        assert!(validate_email("").is_err());
        assert!(validate_email("ops").is_err());
        assert!(validate_email("@riderly.ph").is_err());
        assert!(validate_email("ops@localhost").is_err());
        assert!(validate_email("a@b@c.ph").is_err());
    }

    #[tokio::test]
    async fn reset_requests_are_counted_per_address() {
        let auth = MemoryAuth::new();
        auth.request_reset("Ops@Riderly.ph").await.unwrap();
        auth.request_reset("ops@riderly.ph").await.unwrap();

        assert_eq!(auth.requests_for("ops@riderly.ph"), 2);
        assert!(auth.request_reset("nope").await.is_err());
        assert_eq!(auth.requests_for("nope"), 0);
    }
}
