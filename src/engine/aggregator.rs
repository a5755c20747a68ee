use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use tracing::error;

use crate::engine::calendar::{trailing_months, MonthWindow};
use crate::engine::reader::StoreReader;
use crate::models::dashboard::{DashboardMetrics, MonthlyDataPoint};
use crate::models::decode_all;
use crate::models::device::Device;
use crate::models::driver::{Driver, DriverLocation};
use crate::models::fetched::Fetched;
use crate::store::collections::{DEVICES, DRIVERS, TRIPS};
use crate::store::{Op, Query};

pub const DEFAULT_LOCATION_LIMIT: usize = 10;
const TRAILING_MONTHS: usize = 12;

#[derive(Clone)]
pub struct Aggregator {
    reader: StoreReader,
}

impl Aggregator {
    pub fn new(reader: StoreReader) -> Self {
        Self { reader }
    }

    pub async fn compute_dashboard_metrics(&self) -> Fetched<DashboardMetrics> {
        let fetched = tokio::try_join!(
            self.reader.fetch_all(DRIVERS),
            self.reader.fetch_all(DEVICES)
        );

        match fetched {
            Ok((drivers, devices)) => {
                let drivers: Vec<Driver> = decode_all(&drivers);
                let devices: Vec<Device> = decode_all(&devices);

                Fetched::fresh(DashboardMetrics {
                    total_drivers: drivers.len(),
                    total_devices: devices.len(),
                    active_drivers: drivers.iter().filter(|d| d.is_active()).count(),
                    active_devices: devices.iter().filter(|d| d.is_active()).count(),
                })
            }
            Err(err) => {
                error!(error = %err, "failed to fetch dashboard metrics");
                self.reader.metrics().record_degraded("dashboard_metrics");
                Fetched::fallback()
            }
        }
    }

    pub async fn compute_monthly_data(&self) -> Fetched<Vec<MonthlyDataPoint>> {
        self.compute_monthly_data_at(Utc::now().date_naive()).await
    }

    pub async fn compute_monthly_data_at(&self, today: NaiveDate) -> Fetched<Vec<MonthlyDataPoint>> {
        let windows = trailing_months(today, TRAILING_MONTHS);
        let reader = &self.reader;

        let counts = try_join_all(windows.iter().map(|window| {
            let query = month_query(window);
            async move {
                reader
                    .fetch_filtered(TRIPS, &query)
                    .await
                    .map(|trips| trips.len())
            }
        }))
        .await;

        match counts {
            Ok(counts) => Fetched::fresh(
                windows
                    .iter()
                    .zip(counts)
                    .map(|(window, value)| MonthlyDataPoint {
                        month: window.abbreviation().to_string(),
                        year: window.year,
                        value,
                    })
                    .collect(),
            ),
            Err(err) => {
                error!(error = %err, "failed to fetch monthly data");
                self.reader.metrics().record_degraded("monthly_data");
                Fetched::fallback()
            }
        }
    }

    pub async fn compute_active_driver_locations(
        &self,
        max_count: Option<usize>,
    ) -> Fetched<Vec<DriverLocation>> {
        let query = Query::new()
            .filter("status", Op::Eq, "active")
            .limit(max_count.unwrap_or(DEFAULT_LOCATION_LIMIT));

        match self.reader.fetch_filtered(DRIVERS, &query).await {
            Ok(docs) => {
                let drivers: Vec<Driver> = decode_all(&docs);
                Fetched::fresh(drivers.iter().map(DriverLocation::from).collect())
            }
            Err(err) => {
                error!(error = %err, "failed to fetch driver locations");
                self.reader.metrics().record_degraded("driver_locations");
                Fetched::fallback()
            }
        }
    }
}

fn month_query(window: &MonthWindow) -> Query {
    Query::new()
        .filter("date", Op::Gte, window.start.to_rfc3339())
        .filter("date", Op::Lt, window.end.to_rfc3339())
}
