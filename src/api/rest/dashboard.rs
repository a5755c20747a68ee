use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;

use crate::models::dashboard::{DashboardMetrics, MonthlyDataPoint};
use crate::models::fetched::Fetched;
use crate::models::rating::RatingReport;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard/metrics", get(dashboard_metrics))
        .route("/dashboard/monthly", get(monthly_data))
        .route("/dashboard/ratings", get(ratings))
}

#[derive(Debug, Serialize)]
pub struct MetricsView {
    #[serde(flatten)]
    pub counts: DashboardMetrics,
    pub active_driver_percentage: f64,
    pub active_device_percentage: f64,
}

impl From<DashboardMetrics> for MetricsView {
    fn from(counts: DashboardMetrics) -> Self {
        Self {
            active_driver_percentage: counts.active_driver_percentage(),
            active_device_percentage: counts.active_device_percentage(),
            counts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MonthlyView {
    pub label: String,
    #[serde(flatten)]
    pub point: MonthlyDataPoint,
}

async fn dashboard_metrics(State(state): State<Arc<AppState>>) -> Json<Fetched<MetricsView>> {
    let metrics = state.aggregator.compute_dashboard_metrics().await;
    Json(metrics.map(MetricsView::from))
}

async fn monthly_data(State(state): State<Arc<AppState>>) -> Json<Fetched<Vec<MonthlyView>>> {
    let monthly = state.aggregator.compute_monthly_data().await;
    Json(monthly.map(|points| {
        points
            .into_iter()
            .map(|point| MonthlyView {
                label: point.label(),
                point,
            })
            .collect()
    }))
}

async fn ratings(State(state): State<Arc<AppState>>) -> Json<Fetched<RatingReport>> {
    Json(state.projections.rating_report().await)
}
