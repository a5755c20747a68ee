use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, Stream, StreamExt};
use tracing::{info, warn};

use crate::engine::projection::build_driver_summaries;
use crate::models::decode_all;
use crate::models::driver::{Driver, DriverSummary};
use crate::state::AppState;
use crate::store::collections::DRIVER_USERS;
use crate::store::Subscription;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

pub fn driver_feed(subscription: Subscription) -> impl Stream<Item = Vec<DriverSummary>> + Send {
    subscription.into_stream().map(|snapshot| {
        let drivers: Vec<Driver> = decode_all(&snapshot);
        build_driver_summaries(&drivers, Utc::now())
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let subscription = match state.store.subscribe(DRIVER_USERS).await {
        Ok(subscription) => subscription,
        Err(err) => {
            warn!(error = %err, "failed to subscribe to drivers");
            return;
        }
    };

    let (mut sender, mut receiver) = socket.split();
    let gauge = state.metrics.live_subscribers.clone();
    gauge.inc();
    info!("driver feed client connected");

    let mut send_task = tokio::spawn(async move {
        let mut feed = Box::pin(driver_feed(subscription));
        while let Some(summaries) = feed.next().await {
            let json = match serde_json::to_string(&summaries) {
                Ok(json) => json,
                Err(err) => {
                    warn!(error = %err, "failed to serialize driver snapshot for ws");
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(_msg)) = receiver.next().await {}
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    gauge.dec();
    info!("driver feed client disconnected");
}
