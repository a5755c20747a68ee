use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::api::rest::ListParams;
use crate::engine::search::{filter_by_search_term, paginate, Page};
use crate::models::device::AssignedDriver;
use crate::models::driver::{DriverLocation, DriverSummary};
use crate::models::fetched::Fetched;
use crate::state::AppState;

const LOCATION_SEARCH_FIELDS: &[&str] = &["name", "status"];
const SUMMARY_SEARCH_FIELDS: &[&str] = &["name", "franchise_number", "contactNumber", "email", "username"];

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tracking/drivers", get(tracked_drivers))
        .route("/drivers", get(list_drivers))
        .route("/drivers/roster", get(roster))
}

async fn tracked_drivers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Fetched<Page<DriverLocation>>> {
    let locations = state
        .aggregator
        .compute_active_driver_locations(Some(state.settings.driver_location_limit))
        .await;

    let per_page = state.settings.drivers_per_page;
    Json(locations.map(|locations| {
        let matching = filter_by_search_term(locations, &params.search, LOCATION_SEARCH_FIELDS);
        paginate(matching, params.page.unwrap_or(1), per_page)
    }))
}

async fn list_drivers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Fetched<Vec<DriverSummary>>> {
    let summaries = state.projections.driver_summaries().await;
    Json(summaries.map(|summaries| {
        filter_by_search_term(summaries, &params.search, SUMMARY_SEARCH_FIELDS)
    }))
}

async fn roster(State(state): State<Arc<AppState>>) -> Json<Fetched<Vec<AssignedDriver>>> {
    let roster = state.projections.roster().await;
    Json(roster.map(|drivers| drivers.iter().map(AssignedDriver::snapshot_of).collect()))
}
