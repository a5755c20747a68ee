use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

use crate::store::Document;

/// Each item is the whole collection. Dropping the subscription ends delivery.
pub struct Subscription {
    collection: String,
    pending: Option<Vec<Document>>,
    receiver: broadcast::Receiver<Vec<Document>>,
}

impl Subscription {
    pub fn new(
        collection: impl Into<String>,
        initial: Vec<Document>,
        receiver: broadcast::Receiver<Vec<Document>>,
    ) -> Self {
        Self {
            collection: collection.into(),
            pending: Some(initial),
            receiver,
        }
    }

    pub async fn next(&mut self) -> Option<Vec<Document>> {
        if let Some(snapshot) = self.pending.take() {
            return Some(snapshot);
        }

        loop {
            match self.receiver.recv().await {
                Ok(snapshot) => return Some(snapshot),
                // Older snapshots are superseded by the ones still buffered.
                Err(RecvError::Lagged(skipped)) => {
                    debug!(collection = %self.collection, skipped, "subscription lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Document>> + Send {
        let collection = self.collection;
        let live = BroadcastStream::new(self.receiver).filter_map(move |update| match update {
            Ok(snapshot) => Some(snapshot),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                debug!(collection = %collection, skipped, "subscription lagged");
                None
            }
        });

        tokio_stream::iter(self.pending).chain(live)
    }

    pub fn unsubscribe(self) {
        debug!(collection = %self.collection, "unsubscribed");
    }
}
