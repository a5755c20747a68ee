use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub total_drivers: usize,
    pub total_devices: usize,
    pub active_drivers: usize,
    pub active_devices: usize,
}

impl DashboardMetrics {
    pub fn active_driver_percentage(&self) -> f64 {
        percentage(self.active_drivers, self.total_drivers)
    }

    pub fn active_device_percentage(&self) -> f64 {
        percentage(self.active_devices, self.total_devices)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthlyDataPoint {
    pub month: String,
    pub year: i32,
    pub value: usize,
}

impl MonthlyDataPoint {
    pub fn label(&self) -> String {
        format!("{} {}", self.month, self.year)
    }
}
