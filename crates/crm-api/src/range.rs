//! Date range shared by all dashboard queries.

use chrono::{Months, NaiveDate, Utc};

use crate::error::{CrmError, Result};

/// Inclusive date range sent as `start_date` / `end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(CrmError::Config(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `months` months ending at `today`.
    pub fn last_months(today: NaiveDate, months: u32) -> Self {
        let start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Query parameters in `YYYY-MM-DD` form.
    pub fn query(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format("%Y-%m-%d").to_string()),
            ("end_date", self.end.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl Default for DateRange {
    /// Last six months, matching the dashboard's initial view.
    fn default() -> Self {
        Self::last_months(Utc::now().date_naive(), 6)
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} – {}",
            self.start.format("%d %b %Y"),
            self.end.format("%d %b %Y")
        )
    }
}
