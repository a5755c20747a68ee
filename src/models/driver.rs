use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{format_date, lenient, parse_loose_date, Record};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Driver {
    #[serde(skip_deserializing)]
    pub id: String,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient")]
    pub middle_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient")]
    pub email: String,
    #[serde(rename = "contactNumber", deserialize_with = "lenient")]
    pub contact_number: String,
    #[serde(deserialize_with = "lenient")]
    pub address: String,
    #[serde(deserialize_with = "lenient")]
    pub age: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub franchise_number: String,
    #[serde(deserialize_with = "lenient")]
    pub franchise_expiration_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub license_expiration_date: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub license_front_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub license_back_url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub profile_picture: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub username: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub user_type: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub last_login_location: Option<GeoPoint>,
}

impl Record for Driver {
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Driver {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some("active")
    }

    pub fn driver_status(&self) -> DriverStatus {
        if self.is_active() {
            DriverStatus::Active
        } else {
            DriverStatus::Inactive
        }
    }

    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let joined = joined.trim();
        if !joined.is_empty() {
            return joined.to_string();
        }
        self.name.as_deref().unwrap_or_default().trim().to_string()
    }

    pub fn display_name(&self) -> String {
        match self.middle_name.as_deref().map(str::trim) {
            Some(middle) if !middle.is_empty() && !self.first_name.trim().is_empty() => format!(
                "{} {} {}",
                self.first_name.trim(),
                middle,
                self.last_name.trim()
            ),
            _ => self.full_name(),
        }
    }

    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => self.last_login_location,
        }
    }

    pub fn license_status(&self, now: DateTime<Utc>) -> LicenseStatus {
        match self
            .license_expiration_date
            .as_deref()
            .and_then(parse_loose_date)
        {
            Some(expires) if expires > now => LicenseStatus::Valid,
            _ => LicenseStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LicenseStatus {
    Valid,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: DriverStatus,
}

impl From<&Driver> for DriverLocation {
    fn from(driver: &Driver) -> Self {
        let position = driver.position().unwrap_or_default();
        Self {
            id: driver.id.clone(),
            name: driver.full_name(),
            latitude: position.latitude,
            longitude: position.longitude,
            status: driver.driver_status(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverSummary {
    pub id: String,
    pub full_name: String,
    pub display_name: String,
    pub franchise_number: String,
    pub contact_number: String,
    pub email: String,
    pub age: Option<u32>,
    pub username: Option<String>,
    pub user_type: Option<String>,
    pub profile_picture: Option<String>,
    pub license_status: LicenseStatus,
    pub license_expires: String,
    pub franchise_expires: String,
    pub last_known_location: Option<GeoPoint>,
}

impl DriverSummary {
    pub fn from_driver(driver: &Driver, now: DateTime<Utc>) -> Self {
        Self {
            id: driver.id.clone(),
            full_name: driver.full_name(),
            display_name: driver.display_name(),
            franchise_number: driver.franchise_number.clone(),
            contact_number: driver.contact_number.clone(),
            email: driver.email.clone(),
            age: driver.age,
            username: driver.username.clone(),
            user_type: driver.user_type.clone(),
            profile_picture: driver.profile_picture.clone(),
            license_status: driver.license_status(now),
            license_expires: format_date(driver.license_expiration_date.as_deref()),
            franchise_expires: format_date(driver.franchise_expiration_date.as_deref()),
            last_known_location: driver.last_login_location,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{Driver, DriverStatus, LicenseStatus};
    use crate::models::Record;
    use crate::store::Document;

    fn driver(value: serde_json::Value) -> Driver {
        Driver::from_document(&Document::from_value("d1", value))
    }

    #[test]
    fn mistyped_fields_fall_back_to_defaults() {
        let d = driver(json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "age": "thirty",
            "latitude": "north",
            "status": 7
        }));

        assert_eq!(d.id, "d1");
        assert_eq!(d.full_name(), "Jane Doe");
        assert_eq!(d.age, None);
        assert_eq!(d.latitude, None);
        assert!(!d.is_active());
    }

    #[test]
    fn single_name_field_is_used_when_parts_are_missing() {
        let d = driver(json!({ "name": "Juan Cruz", "status": "active" }));
        assert_eq!(d.full_name(), "Juan Cruz");
        assert_eq!(d.driver_status(), DriverStatus::Active);
    }

    #[test]
    fn middle_name_only_appears_in_display_name() {
        let d = driver(json!({
            "first_name": "Jane",
            "middle_name": "Q",
            "last_name": "Doe"
        }));
        assert_eq!(d.full_name(), "Jane Doe");
        assert_eq!(d.display_name(), "Jane Q Doe");
    }

    #[test]
    fn position_prefers_top_level_coordinates() {
        let d = driver(json!({
            "latitude": 8.48,
            "longitude": 123.81,
            "last_login_location": { "latitude": 1.0, "longitude": 2.0 }
        }));
        assert_eq!(d.position().unwrap().latitude, 8.48);

        let d = driver(json!({ "last_login_location": { "lat": 1.0, "lng": 2.0 } }));
        assert_eq!(d.position().unwrap().longitude, 2.0);

        assert!(driver(json!({ "latitude": 1.0 })).position().is_none());
    }

    #[test]
    fn license_expiry_is_compared_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let valid = driver(json!({ "license_expiration_date": "2026-01-01" }));
        let expired = driver(json!({ "license_expiration_date": "2024-12-31" }));
        let unknown = driver(json!({}));

        assert_eq!(valid.license_status(now), LicenseStatus::Valid);
        assert_eq!(expired.license_status(now), LicenseStatus::Expired);
        assert_eq!(unknown.license_status(now), LicenseStatus::Expired);
    }
}
