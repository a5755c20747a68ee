use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::StoreError;
use crate::observability::metrics::Metrics;
use crate::store::{Document, Query, RemoteStore};

#[derive(Clone)]
pub struct StoreReader {
    store: Arc<dyn RemoteStore>,
    timeout: Duration,
    metrics: Metrics,
}

impl StoreReader {
    pub fn new(store: Arc<dyn RemoteStore>, timeout: Duration, metrics: Metrics) -> Self {
        Self {
            store,
            timeout,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.timed(collection, self.store.fetch_all(collection))
            .await
    }

    pub async fn fetch_filtered(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        self.timed(collection, self.store.fetch_filtered(collection, query))
            .await
    }

    async fn timed<F>(&self, collection: &str, read: F) -> Result<Vec<Document>, StoreError>
    where
        F: Future<Output = Result<Vec<Document>, StoreError>>,
    {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, read).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(collection.to_string())),
        };

        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .store_read_latency_seconds
            .with_label_values(&[collection])
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .store_reads_total
            .with_label_values(&[collection, outcome])
            .inc();

        result
    }
}
