use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::Json;
use axum::Router;

use crate::api::rest::ListParams;
use crate::engine::search::filter_by_search_term;
use crate::error::AppError;
use crate::models::device::{Device, DeviceRow, NewDevice};
use crate::models::fetched::Fetched;
use crate::state::AppState;

const SEARCH_FIELDS: &[&str] = &["deviceName", "gpsId", "assignedDriver"];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/devices", get(list_devices).post(register_device))
        .route("/devices/:id", delete(delete_device))
}

async fn list_devices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Fetched<Vec<DeviceRow>>> {
    let rows = state.projections.device_rows().await;
    Json(rows.map(|rows| filter_by_search_term(rows, &params.search, SEARCH_FIELDS)))
}

async fn register_device(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewDevice>,
) -> Result<(StatusCode, Json<Device>), AppError> {
    let device = state.admin.register_device(payload).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.admin.delete_device(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
