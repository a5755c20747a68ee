pub mod filter;
pub mod memory;
pub mod subscription;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use filter::{Filter, Op, Query};
pub use memory::MemoryStore;
pub use subscription::Subscription;

pub type Fields = Map<String, Value>;

pub mod collections {
    pub const DRIVERS: &str = "drivers";
    pub const DEVICES: &str = "devices";
    pub const DRIVER_USERS: &str = "driver_users";
    pub const EMPLOYEES: &str = "employee";
    pub const APP_RATINGS: &str = "app_ratings";
    pub const TRIPS: &str = "trips";

    const FRANCHISE_ROSTER: &str = "Actual_Franchise_Owner";

    pub fn franchise_roster(owner_id: &str) -> String {
        format!("{DRIVER_USERS}/{owner_id}/{FRANCHISE_ROSTER}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Fields::new(),
        };
        Self::new(id, fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    async fn fetch_filtered(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, StoreError>;

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Merges `fields` into an existing document. Last writer wins.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Opens a live feed of full collection snapshots, starting with the
    /// current one.
    async fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{collections, Document};

    #[test]
    fn roster_path_nests_under_owner() {
        assert_eq!(
            collections::franchise_roster("owner-1"),
            "driver_users/owner-1/Actual_Franchise_Owner"
        );
    }

    #[test]
    fn non_object_values_become_empty_documents() {
        let doc = Document::from_value("x", json!([1, 2, 3]));
        assert!(doc.fields.is_empty());

        let doc = Document::from_value("y", json!({ "status": "active" }));
        assert_eq!(doc.str_field("status"), Some("active"));
    }
}
