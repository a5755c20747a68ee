use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::engine::reader::StoreReader;
use crate::models::device::{Device, DeviceRow};
use crate::models::driver::{Driver, DriverSummary};
use crate::models::employee::Employee;
use crate::models::fetched::Fetched;
use crate::models::rating::{Rating, RatingDistribution, RatingReport, StarBucket};
use crate::models::{decode_all, Record};
use crate::store::collections::{self, APP_RATINGS, DEVICES, DRIVER_USERS, EMPLOYEES};

const RECENT_REVIEWS: usize = 3;

#[derive(Clone)]
pub struct ProjectionBuilder {
    reader: StoreReader,
    franchise_owner_id: String,
}

impl ProjectionBuilder {
    pub fn new(reader: StoreReader, franchise_owner_id: impl Into<String>) -> Self {
        Self {
            reader,
            franchise_owner_id: franchise_owner_id.into(),
        }
    }

    pub fn roster_collection(&self) -> String {
        collections::franchise_roster(&self.franchise_owner_id)
    }

    pub async fn rating_report(&self) -> Fetched<RatingReport> {
        self.read_records::<Rating>(APP_RATINGS, "rating_report")
            .await
            .map(|ratings| RatingReport {
                distribution: build_rating_distribution(&ratings),
                recent: recent_reviews(&ratings, RECENT_REVIEWS),
            })
    }

    pub async fn device_rows(&self) -> Fetched<Vec<DeviceRow>> {
        let roster_collection = self.roster_collection();
        let (devices, roster) = tokio::join!(
            self.reader.fetch_all(DEVICES),
            self.reader.fetch_all(&roster_collection)
        );

        let devices: Vec<Device> = match devices {
            Ok(docs) => decode_all(&docs),
            Err(err) => {
                error!(error = %err, "failed to fetch devices");
                self.reader.metrics().record_degraded("device_rows");
                return Fetched::fallback();
            }
        };

        let (roster, roster_failed) = match roster {
            Ok(docs) => (decode_all::<Driver>(&docs), false),
            Err(err) => {
                warn!(error = %err, collection = %roster_collection, "failed to fetch driver roster");
                self.reader.metrics().record_degraded("device_roster");
                (Vec::new(), true)
            }
        };

        let rows = build_device_driver_join(&devices, &roster);
        if roster_failed {
            Fetched::degraded(rows)
        } else {
            Fetched::fresh(rows)
        }
    }

    pub async fn roster(&self) -> Fetched<Vec<Driver>> {
        self.read_records(&self.roster_collection(), "driver_roster")
            .await
    }

    pub async fn driver_summaries(&self) -> Fetched<Vec<DriverSummary>> {
        self.read_records::<Driver>(DRIVER_USERS, "driver_summaries")
            .await
            .map(|drivers| build_driver_summaries(&drivers, Utc::now()))
    }

    pub async fn employees(&self) -> Fetched<Vec<Employee>> {
        self.read_records(EMPLOYEES, "employees").await
    }

    async fn read_records<T: Record>(&self, collection: &str, operation: &str) -> Fetched<Vec<T>> {
        match self.reader.fetch_all(collection).await {
            Ok(docs) => Fetched::fresh(decode_all(&docs)),
            Err(err) => {
                error!(error = %err, collection, operation, "failed to fetch records");
                self.reader.metrics().record_degraded(operation);
                Fetched::fallback()
            }
        }
    }
}

pub fn build_rating_distribution(ratings: &[Rating]) -> RatingDistribution {
    let mut counts = [0usize; 5];
    let mut sum = 0.0;
    let mut excluded = 0;

    for rating in ratings {
        match rating.stars() {
            Some(stars) => {
                counts[usize::from(stars - 1)] += 1;
                sum += rating.rating;
            }
            None => excluded += 1,
        }
    }

    let total = ratings.len() - excluded;
    if total == 0 {
        return RatingDistribution {
            excluded,
            ..RatingDistribution::default()
        };
    }

    let buckets = (1..=5u8)
        .rev()
        .map(|stars| {
            let count = counts[usize::from(stars - 1)];
            StarBucket {
                stars,
                count,
                percentage: count as f64 / total as f64 * 100.0,
            }
        })
        .collect();

    RatingDistribution {
        total,
        excluded,
        average: format!("{:.1}", sum / total as f64),
        buckets,
    }
}

pub fn recent_reviews(ratings: &[Rating], count: usize) -> Vec<Rating> {
    let mut sorted = ratings.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted.truncate(count);
    sorted
}

pub fn build_device_driver_join(devices: &[Device], drivers: &[Driver]) -> Vec<DeviceRow> {
    let roster: HashSet<&str> = drivers.iter().map(|driver| driver.id.as_str()).collect();

    devices
        .iter()
        .map(|device| {
            let assigned = device.assigned_driver.as_ref();
            DeviceRow {
                id: device.id.clone(),
                device_name: device.device_name.clone(),
                gps_id: device.gps_id.clone(),
                assigned_driver_id: assigned.map(|driver| driver.id.clone()),
                assigned_driver_name: assigned.map(|driver| driver.name.clone()),
                driver_on_roster: assigned
                    .is_some_and(|driver| roster.contains(driver.id.as_str())),
                registered_at: device.timestamp,
            }
        })
        .collect()
}

pub fn build_driver_summaries(drivers: &[Driver], now: DateTime<Utc>) -> Vec<DriverSummary> {
    drivers
        .iter()
        .map(|driver| DriverSummary::from_driver(driver, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{build_device_driver_join, build_rating_distribution, recent_reviews, ProjectionBuilder};
    use crate::engine::reader::StoreReader;
    use crate::models::device::{AssignedDriver, Device};
    use crate::models::driver::Driver;
    use crate::models::rating::Rating;
    use crate::observability::metrics::Metrics;
    use crate::store::{Document, MemoryStore};

    fn ratings(values: &[f64]) -> Vec<Rating> {
        values
            .iter()
            .map(|&rating| Rating {
                rating,
                ..Rating::default()
            })
            .collect()
    }

    fn percentage(distribution: &crate::models::rating::RatingDistribution, stars: u8) -> f64 {
        distribution.bucket(stars).map(|b| b.percentage).unwrap_or(f64::NAN)
    }

    #[test]
    fn mixed_ratings_scenario() {
        let distribution = build_rating_distribution(&ratings(&[5.0, 5.0, 3.0, 1.0]));

        assert_eq!(distribution.average, "3.5");
        assert_eq!(distribution.total, 4);
        assert_eq!(percentage(&distribution, 5), 50.0);
        assert_eq!(percentage(&distribution, 4), 0.0);
        assert_eq!(percentage(&distribution, 3), 25.0);
        assert_eq!(percentage(&distribution, 2), 0.0);
        assert_eq!(percentage(&distribution, 1), 25.0);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let samples: [&[f64]; 4] = [
            &[1.0],
            &[1.0, 2.0, 3.0],
            &[5.0, 4.0, 4.0, 2.0, 2.0, 2.0, 1.0],
            &[3.0, 3.0, 3.0, 5.0, 1.0, 4.0, 4.0, 2.0, 5.0, 5.0, 5.0],
        ];

        for sample in samples {
            let distribution = build_rating_distribution(&ratings(sample));
            let sum: f64 = distribution.buckets.iter().map(|b| b.percentage).sum();
            assert!((sum - 100.0).abs() < 1e-9, "sum was {sum} for {sample:?}");

            for bucket in &distribution.buckets {
                let share = bucket.count as f64 / distribution.total as f64 * 100.0;
                assert!((bucket.percentage - share).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn empty_ratings_average_zero() {
        let distribution = build_rating_distribution(&[]);
        assert_eq!(distribution.average, "0.0");
        assert_eq!(distribution.total, 0);
        assert_eq!(distribution.buckets.len(), 5);
        assert!(distribution.buckets.iter().all(|b| b.percentage == 0.0));
    }

    #[test]
    fn out_of_range_ratings_are_excluded_everywhere() {
        let distribution = build_rating_distribution(&ratings(&[5.0, 0.0, 7.0, 4.5, 3.0]));

        assert_eq!(distribution.total, 2);
        assert_eq!(distribution.excluded, 3);
        assert_eq!(distribution.average, "4.0");
        assert_eq!(percentage(&distribution, 5), 50.0);
        assert_eq!(percentage(&distribution, 3), 50.0);

        let only_invalid = build_rating_distribution(&ratings(&[9.0]));
        assert_eq!(only_invalid.average, "0.0");
        assert_eq!(only_invalid.excluded, 1);
    }

    #[test]
    fn recent_reviews_are_newest_first() {
        let mut reviews = ratings(&[1.0, 2.0, 3.0, 4.0]);
        reviews[0].timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        reviews[1].timestamp = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).single();
        reviews[3].timestamp = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).single();

        let recent = recent_reviews(&reviews, 3);
        let stars: Vec<f64> = recent.iter().map(|r| r.rating).collect();
        assert_eq!(stars, vec![2.0, 4.0, 1.0]);
    }

    #[test]
    fn stored_driver_name_survives_rename() {
        let device = Device {
            id: "dev1".to_string(),
            device_name: "GPS1".to_string(),
            assigned_driver: Some(AssignedDriver {
                id: "d1".to_string(),
                name: "Jane Doe".to_string(),
            }),
            ..Device::default()
        };
        let renamed = Driver {
            id: "d1".to_string(),
            first_name: "Janet".to_string(),
            last_name: "Smith".to_string(),
            ..Driver::default()
        };

        let rows = build_device_driver_join(&[device], &[renamed]);
        assert_eq!(rows[0].assigned_driver_name.as_deref(), Some("Jane Doe"));
        assert!(rows[0].driver_on_roster);
    }

    #[test]
    fn unassigned_and_departed_drivers() {
        let unassigned = Device {
            id: "dev1".to_string(),
            ..Device::default()
        };
        let departed = Device {
            id: "dev2".to_string(),
            assigned_driver: Some(AssignedDriver {
                id: "gone".to_string(),
                name: "Old Driver".to_string(),
            }),
            ..Device::default()
        };

        let rows = build_device_driver_join(&[unassigned, departed], &[]);
        assert!(rows[0].assigned_driver_name.is_none());
        assert!(!rows[0].driver_on_roster);
        assert_eq!(rows[1].assigned_driver_name.as_deref(), Some("Old Driver"));
        assert!(!rows[1].driver_on_roster);
    }

    #[tokio::test]
    async fn device_rows_read_devices_and_roster() {
        let store = MemoryStore::default();
        store.seed(
            "devices",
            vec![Document::from_value(
                "dev1",
                json!({
                    "deviceName": "GPS1",
                    "gpsId": "G-1",
                    "assignedDriver": { "id": "d1", "name": "Jane Doe" }
                }),
            )],
        );
        store.seed(
            "driver_users/owner/Actual_Franchise_Owner",
            vec![Document::from_value(
                "d1",
                json!({ "first_name": "Jane", "last_name": "Doe" }),
            )],
        );

        let reader = StoreReader::new(Arc::new(store), Duration::from_secs(5), Metrics::new());
        let builder = ProjectionBuilder::new(reader, "owner");

        let rows = builder.device_rows().await;
        assert!(!rows.degraded);
        assert_eq!(rows.data.len(), 1);
        assert!(rows.data[0].driver_on_roster);

        let roster = builder.roster().await.into_inner();
        assert_eq!(roster[0].full_name(), "Jane Doe");
    }
}
