use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::engine::reader::StoreReader;
use crate::error::{AppError, StoreError};
use crate::models::device::{AssignedDriver, Device, NewDevice};
use crate::models::driver::Driver;
use crate::models::employee::EmployeeUpdate;
use crate::models::{decode_all, Record};
use crate::store::collections::{self, DEVICES, EMPLOYEES};
use crate::store::{Document, RemoteStore};

#[derive(Clone)]
pub struct AdminActions {
    store: Arc<dyn RemoteStore>,
    reader: StoreReader,
    roster_collection: String,
}

impl AdminActions {
    pub fn new(store: Arc<dyn RemoteStore>, reader: StoreReader, franchise_owner_id: &str) -> Self {
        Self {
            store,
            reader,
            roster_collection: collections::franchise_roster(franchise_owner_id),
        }
    }

    pub async fn register_device(&self, request: NewDevice) -> Result<Device, AppError> {
        let device_name = request.device_name.trim();
        let gps_id = request.gps_id.trim();
        if device_name.is_empty() {
            return Err(AppError::BadRequest("deviceName is required".to_string()));
        }
        if gps_id.is_empty() {
            return Err(AppError::BadRequest("gpsId is required".to_string()));
        }

        let assigned_driver = match request.driver_id.as_deref().map(str::trim) {
            Some(driver_id) if !driver_id.is_empty() => {
                let roster: Vec<Driver> =
                    decode_all(&self.reader.fetch_all(&self.roster_collection).await?);
                Some(resolve_assignment(driver_id, &roster)?)
            }
            _ => None,
        };

        let mut device = Device {
            device_name: device_name.to_string(),
            gps_id: gps_id.to_string(),
            assigned_driver,
            timestamp: Some(Utc::now()),
            ..Device::default()
        };

        let id = self
            .write("register_device", self.store.insert(DEVICES, device.to_fields()))
            .await?;
        info!(device_id = %id, gps_id = %device.gps_id, "device registered");
        device.set_id(id);

        Ok(device)
    }

    pub async fn delete_device(&self, id: &str) -> Result<(), AppError> {
        self.write("delete_device", self.store.delete(DEVICES, id))
            .await?;
        info!(device_id = %id, "device deleted");
        Ok(())
    }

    pub async fn update_employee(
        &self,
        id: &str,
        update: &EmployeeUpdate,
    ) -> Result<Document, AppError> {
        if update.is_empty() {
            return Err(AppError::BadRequest("no fields to update".to_string()));
        }

        self.write("update_employee", self.store.update(EMPLOYEES, id, update.to_fields()))
            .await?;
        info!(employee_id = %id, "employee updated");

        let docs = self.reader.fetch_all(EMPLOYEES).await?;
        docs.into_iter()
            .find(|doc| doc.id == id)
            .ok_or_else(|| AppError::NotFound(format!("employee {id} not found")))
    }

    pub async fn delete_employee(&self, id: &str) -> Result<(), AppError> {
        self.write("delete_employee", self.store.delete(EMPLOYEES, id))
            .await?;
        info!(employee_id = %id, "employee deleted");
        Ok(())
    }

    async fn write<T, F>(&self, operation: &str, action: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let result = action.await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => {
                error!(error = %err, operation, "store write failed");
                "error"
            }
        };

        self.reader
            .metrics()
            .store_writes_total
            .with_label_values(&[operation, outcome])
            .inc();

        result
    }
}

pub fn resolve_assignment(driver_id: &str, roster: &[Driver]) -> Result<AssignedDriver, AppError> {
    roster
        .iter()
        .find(|driver| driver.id == driver_id)
        .map(AssignedDriver::snapshot_of)
        .ok_or_else(|| AppError::BadRequest(format!("driver {driver_id} is not on the roster")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::{resolve_assignment, AdminActions};
    use crate::engine::reader::StoreReader;
    use crate::error::AppError;
    use crate::models::device::NewDevice;
    use crate::models::driver::Driver;
    use crate::models::employee::{EmployeeUpdate, Role};
    use crate::observability::metrics::Metrics;
    use crate::store::{Document, MemoryStore, RemoteStore};

    const ROSTER: &str = "driver_users/owner/Actual_Franchise_Owner";

    fn actions(store: Arc<MemoryStore>) -> AdminActions {
        let reader = StoreReader::new(store.clone(), Duration::from_secs(5), Metrics::new());
        AdminActions::new(store, reader, "owner")
    }

    fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::default();
        store.seed(
            ROSTER,
            vec![Document::from_value(
                "d1",
                json!({ "first_name": "Jane", "last_name": "Doe" }),
            )],
        );
        store.seed(
            "employee",
            vec![Document::from_value(
                "e1",
                json!({ "fname": "Ana", "lname": "Reyes", "role": "user" }),
            )],
        );
        Arc::new(store)
    }

    fn new_device(name: &str, gps: &str, driver: Option<&str>) -> NewDevice {
        NewDevice {
            device_name: name.to_string(),
            gps_id: gps.to_string(),
            driver_id: driver.map(str::to_string),
        }
    }

    #[test]
    fn assignment_requires_roster_driver() {
        let roster = vec![Driver {
            id: "d1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            ..Driver::default()
        }];

        let assigned = resolve_assignment("d1", &roster).unwrap();
        assert_eq!(assigned.name, "Jane Doe");
        assert!(matches!(
            resolve_assignment("d9", &roster),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn registered_device_keeps_driver_snapshot() {
        let store = seeded();
        let device = actions(store.clone())
            .register_device(new_device("GPS1", "G-1", Some("d1")))
            .await
            .unwrap();

        assert!(!device.id.is_empty());
        assert!(device.timestamp.is_some());

        store
            .update(ROSTER, "d1", json!({ "first_name": "Janet" }).as_object().cloned().unwrap())
            .await
            .unwrap();

        let stored = store.fetch_all("devices").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].fields["assignedDriver"]["name"], "Jane Doe");
        assert_eq!(stored[0].fields["gpsId"], "G-1");
    }

    #[tokio::test]
    async fn device_without_driver_is_unassigned() {
        let device = actions(seeded())
            .register_device(new_device("GPS2", "G-2", Some("  ")))
            .await
            .unwrap();
        assert!(device.assigned_driver.is_none());
    }

    #[tokio::test]
    async fn invalid_registrations_are_rejected() {
        let actions = actions(seeded());

        let blank = actions.register_device(new_device(" ", "G-1", None)).await;
        assert!(matches!(blank, Err(AppError::BadRequest(_))));

        let no_gps = actions.register_device(new_device("GPS1", "", None)).await;
        assert!(matches!(no_gps, Err(AppError::BadRequest(_))));

        let unknown = actions
            .register_device(new_device("GPS1", "G-1", Some("nobody")))
            .await;
        assert!(matches!(unknown, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn deleting_missing_device_is_not_found() {
        let result = actions(seeded()).delete_device("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn employee_update_merges_fields() {
        let store = seeded();
        let actions = actions(store.clone());

        let update = EmployeeUpdate {
            role: Some(Role::Admin),
            ..EmployeeUpdate::default()
        };
        let doc = actions.update_employee("e1", &update).await.unwrap();
        assert_eq!(doc.fields["role"], "admin");
        assert_eq!(doc.fields["fname"], "Ana");

        let empty = actions
            .update_employee("e1", &EmployeeUpdate::default())
            .await;
        assert!(matches!(empty, Err(AppError::BadRequest(_))));

        actions.delete_employee("e1").await.unwrap();
        assert!(store.fetch_all("employee").await.unwrap().is_empty());
    }
}
