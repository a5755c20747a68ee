use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{Document, Fields, Query, RemoteStore, Subscription};

pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
    feeds: DashMap<String, broadcast::Sender<Vec<Document>>>,
    event_buffer_size: usize,
}

impl MemoryStore {
    pub fn new(event_buffer_size: usize) -> Self {
        Self {
            collections: DashMap::new(),
            feeds: DashMap::new(),
            event_buffer_size: event_buffer_size.max(1),
        }
    }

    pub fn from_seed(seed: Value, event_buffer_size: usize) -> Result<Self, StoreError> {
        let Value::Object(collections) = seed else {
            return Err(StoreError::Malformed(
                "seed must be an object of collections".to_string(),
            ));
        };

        let store = Self::new(event_buffer_size);
        for (collection, documents) in collections {
            let Value::Array(documents) = documents else {
                return Err(StoreError::Malformed(format!(
                    "seed collection {collection} must be an array"
                )));
            };

            let documents = documents
                .into_iter()
                .map(|raw| {
                    let mut doc = Document::from_value(String::new(), raw);
                    doc.id = match doc.fields.remove("id") {
                        Some(Value::String(id)) if !id.is_empty() => id,
                        _ => new_document_id(),
                    };
                    doc
                })
                .collect();
            store.seed(&collection, documents);
        }

        Ok(store)
    }

    pub async fn from_seed_file(path: &Path, event_buffer_size: usize) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", path.display())))?;
        let seed: Value = serde_json::from_str(&raw)
            .map_err(|err| StoreError::Malformed(format!("{}: {err}", path.display())))?;

        let store = Self::from_seed(seed, event_buffer_size)?;
        info!(
            path = %path.display(),
            collections = store.collections.len(),
            "memory store seeded"
        );
        Ok(store)
    }

    pub fn seed(&self, collection: &str, documents: Vec<Document>) {
        let mut stored = self.collections.entry(collection.to_string()).or_default();
        stored.extend(documents);
        self.publish(collection, &stored);
    }

    fn snapshot(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default()
    }

    // Called with the collection's write guard held so snapshots go out in
    // write order.
    fn publish(&self, collection: &str, documents: &[Document]) {
        let Some(feed) = self.feeds.get(collection) else {
            return;
        };
        if feed.receiver_count() == 0 {
            return;
        }

        debug!(collection, documents = documents.len(), "publishing snapshot");
        let _ = feed.send(documents.to_vec());
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(64)
    }
}

fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        Ok(self.snapshot(collection))
    }

    async fn fetch_filtered(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError> {
        let matching = self
            .snapshot(collection)
            .into_iter()
            .filter(|doc| query.matches(doc))
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(matching)
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        let id = new_document_id();
        let mut documents = self.collections.entry(collection.to_string()).or_default();
        documents.push(Document::new(id.clone(), fields));
        self.publish(collection, &documents);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| not_found(collection, id))?
            .fields
            .extend(fields);

        self.publish(collection, &documents);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut documents = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| not_found(collection, id))?;
        let before = documents.len();
        documents.retain(|doc| doc.id != id);
        if documents.len() == before {
            return Err(not_found(collection, id));
        }

        self.publish(collection, &documents);
        Ok(())
    }

    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        let receiver = self
            .feeds
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.event_buffer_size).0)
            .subscribe();

        Ok(Subscription::new(
            collection,
            self.snapshot(collection),
            receiver,
        ))
    }
}
