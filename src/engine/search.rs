use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::models::device::DeviceRow;
use crate::models::driver::{DriverLocation, DriverStatus, DriverSummary};
use crate::models::employee::Employee;
use crate::store::Document;

pub trait Searchable {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>>;
}

pub fn filter_by_search_term<T: Searchable>(records: Vec<T>, term: &str, fields: &[&str]) -> Vec<T> {
    if term.is_empty() {
        return records;
    }

    let needle = term.to_lowercase();
    records
        .into_iter()
        .filter(|record| {
            fields.iter().any(|field| {
                record
                    .search_field(field)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

pub fn paginate<T>(records: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = records.len();
    let total_pages = total_items.div_ceil(per_page);
    let page = page.clamp(1, total_pages.max(1));

    let items = records
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    }
}

impl Searchable for Document {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.get(field)? {
            Value::String(text) => Some(Cow::Borrowed(text.as_str())),
            Value::Number(number) => Some(Cow::Owned(number.to_string())),
            _ => None,
        }
    }
}

impl Searchable for DeviceRow {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "deviceName" => Some(Cow::Borrowed(self.device_name.as_str())),
            "gpsId" => Some(Cow::Borrowed(self.gps_id.as_str())),
            "assignedDriver" => self.assigned_driver_name.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }
}

impl Searchable for Employee {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "fname" => Some(Cow::Borrowed(self.fname.as_str())),
            "lname" => Some(Cow::Borrowed(self.lname.as_str())),
            "email" => Some(Cow::Borrowed(self.email.as_str())),
            "username" => Some(Cow::Borrowed(self.username.as_str())),
            "role" => Some(Cow::Borrowed(self.role.as_str())),
            _ => None,
        }
    }
}

impl Searchable for DriverLocation {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "name" => Some(Cow::Borrowed(self.name.as_str())),
            "status" => Some(Cow::Borrowed(match self.status {
                DriverStatus::Active => "active",
                DriverStatus::Inactive => "inactive",
            })),
            _ => None,
        }
    }
}

impl Searchable for DriverSummary {
    fn search_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match field {
            "name" => Some(Cow::Borrowed(self.display_name.as_str())),
            "franchise_number" => Some(Cow::Borrowed(self.franchise_number.as_str())),
            "contactNumber" => Some(Cow::Borrowed(self.contact_number.as_str())),
            "email" => Some(Cow::Borrowed(self.email.as_str())),
            "username" => self.username.as_deref().map(Cow::Borrowed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{filter_by_search_term, paginate};
    use crate::models::employee::{Employee, Role};
    use crate::store::Document;

    fn employee(fname: &str, lname: &str, role: Role) -> Employee {
        Employee {
            id: fname.to_lowercase(),
            fname: fname.to_string(),
            lname: lname.to_string(),
            email: format!("{}@riderly.ph", fname.to_lowercase()),
            username: fname.to_lowercase(),
            role,
        }
    }

    fn staff() -> Vec<Employee> {
        vec![
            employee("Ana", "Reyes", Role::Admin),
            employee("Ben", "Santos", Role::User),
            employee("Carla", "Anacta", Role::User),
        ]
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let result = filter_by_search_term(staff(), "", &["fname"]);
        let ids: Vec<_> = result.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ana", "ben", "carla"]);
    }

    #[test]
    fn match_is_case_insensitive_across_fields() {
        let result = filter_by_search_term(staff(), "ANA", &["fname", "lname"]);
        let ids: Vec<_> = result.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["ana", "carla"]);
    }

    #[test]
    fn only_listed_fields_are_searched() {
        let result = filter_by_search_term(staff(), "admin", &["fname", "lname"]);
        assert!(result.is_empty());

        let result = filter_by_search_term(staff(), "admin", &["role"]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn documents_search_string_and_number_fields() {
        let docs = vec![
            Document::from_value("a", json!({ "gpsId": "GPS-77" })),
            Document::from_value("b", json!({ "gpsId": 77 })),
            Document::from_value("c", json!({ "gpsId": null })),
        ];
        let result = filter_by_search_term(docs, "77", &["gpsId"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn pagination_clamps_pages() {
        let records: Vec<u32> = (1..=12).collect();

        let first = paginate(records.clone(), 1, 5);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(first.total_pages, 3);

        let last = paginate(records.clone(), 99, 5);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![11, 12]);

        let zero = paginate(records, 0, 5);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn empty_pagination_has_page_one_of_zero() {
        let page = paginate(Vec::<u32>::new(), 3, 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }
}
