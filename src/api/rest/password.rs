use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/auth/password-reset", post(request_reset))
}

#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

async fn request_reset(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    state.auth.request_reset(&payload.email).await?;
    Ok(StatusCode::ACCEPTED)
}
