use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::driver::Driver;
use crate::models::{lenient, lenient_timestamp, Record};
use crate::store::Fields;

/// Captured when the assignment is written; never re-resolved against the roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssignedDriver {
    #[serde(deserialize_with = "lenient")]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: String,
}

impl AssignedDriver {
    pub fn snapshot_of(driver: &Driver) -> Self {
        Self {
            id: driver.id.clone(),
            name: format!("{} {}", driver.first_name, driver.last_name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Device {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(rename = "deviceName", deserialize_with = "lenient")]
    pub device_name: String,
    #[serde(rename = "gpsId", deserialize_with = "lenient")]
    pub gps_id: String,
    #[serde(rename = "assignedDriver", deserialize_with = "lenient")]
    pub assigned_driver: Option<AssignedDriver>,
    #[serde(deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
}

impl Record for Device {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn to_fields(&self) -> Fields {
        let value = json!({
            "deviceName": self.device_name,
            "gpsId": self.gps_id,
            "assignedDriver": self.assigned_driver,
            "timestamp": self.timestamp.map(|ts| ts.to_rfc3339()),
        });

        match value {
            serde_json::Value::Object(map) => map,
            _ => Fields::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDevice {
    #[serde(rename = "deviceName")]
    pub device_name: String,
    #[serde(rename = "gpsId")]
    pub gps_id: String,
    #[serde(rename = "driverId", default)]
    pub driver_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceRow {
    pub id: String,
    pub device_name: String,
    pub gps_id: String,
    pub assigned_driver_id: Option<String>,
    pub assigned_driver_name: Option<String>,
    pub driver_on_roster: bool,
    pub registered_at: Option<DateTime<Utc>>,
}
