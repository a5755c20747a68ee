pub mod dashboard;
pub mod device;
pub mod driver;
pub mod employee;
pub mod fetched;
pub mod rating;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::store::filter::timestamp_of;
use crate::store::Document;

pub trait Record: DeserializeOwned + Default {
    fn set_id(&mut self, id: String);

    fn from_document(doc: &Document) -> Self {
        let mut record: Self = serde_json::from_value(Value::Object(doc.fields.clone()))
            .unwrap_or_else(|err| {
                warn!(id = %doc.id, error = %err, "undecodable document; using defaults");
                Self::default()
            });
        record.set_id(doc.id.clone());
        record
    }
}

pub fn decode_all<T: Record>(docs: &[Document]) -> Vec<T> {
    docs.iter().map(T::from_document).collect()
}

pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(timestamp_of(&value))
}

pub fn parse_loose_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(parsed) = timestamp_of(&Value::String(raw.to_string())) {
        return Some(parsed);
    }

    ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn format_date(raw: Option<&str>) -> String {
    raw.and_then(parse_loose_date)
        .map(|date| date.format("%B %d, %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_loose_date};

    #[test]
    fn loose_dates_accept_common_shapes() {
        assert!(parse_loose_date("2025-06-30").is_some());
        assert!(parse_loose_date("06/30/2025").is_some());
        assert!(parse_loose_date("2025-06-30T10:00:00Z").is_some());
        assert!(parse_loose_date("someday").is_none());
        assert!(parse_loose_date("  ").is_none());
    }

    #[test]
    fn formatting_falls_back_to_na() {
        assert_eq!(format_date(Some("2025-03-05")), "March 05, 2025");
        assert_eq!(format_date(Some("garbage")), "N/A");
        assert_eq!(format_date(None), "N/A");
    }
}
