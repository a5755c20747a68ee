use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Json;
use axum::Router;

use crate::api::rest::ListParams;
use crate::engine::search::filter_by_search_term;
use crate::error::AppError;
use crate::models::employee::{Employee, EmployeeUpdate};
use crate::models::fetched::Fetched;
use crate::models::Record;
use crate::state::AppState;

const SEARCH_FIELDS: &[&str] = &["fname", "lname", "email", "role"];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees/:id", put(update_employee).delete(delete_employee))
}

async fn list_employees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Fetched<Vec<Employee>>> {
    let employees = state.projections.employees().await;
    Json(employees.map(|employees| filter_by_search_term(employees, &params.search, SEARCH_FIELDS)))
}

async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> Result<Json<Employee>, AppError> {
    let doc = state.admin.update_employee(&id, &payload).await?;
    Ok(Json(Employee::from_document(&doc)))
}

async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.admin.delete_employee(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
