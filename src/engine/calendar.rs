use chrono::{DateTime, Datelike, NaiveDate, Utc};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// One calendar month in UTC: `start` is midnight of the first day, `end` is
/// midnight of the first day of the following month (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let start = month_start(year, month)?;
        let end = if month == 12 {
            month_start(year + 1, 1)?
        } else {
            month_start(year, month + 1)?
        };

        Some(Self {
            year,
            month,
            start,
            end,
        })
    }

    pub fn abbreviation(&self) -> &'static str {
        month_abbreviation(self.month)
    }
}

pub fn month_abbreviation(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| MONTH_ABBREVIATIONS.get(index as usize))
        .copied()
        .unwrap_or("")
}

pub fn trailing_months(today: NaiveDate, count: usize) -> Vec<MonthWindow> {
    let current = today.year() * 12 + today.month0() as i32;

    (0..count as i32)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            MonthWindow::new(index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}
