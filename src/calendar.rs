//! Shared business-day calendar.
//!
//! Every rolling or trend computation that filters to business days goes
//! through one [`HolidayCalendar`] so the definition cannot drift between
//! chart sections. The holiday list is data, not code: the default carries
//! the US federal bank holidays for the years the dataset covers, and a JSON
//! file of `YYYY-MM-DD` strings can replace it without touching any
//! computation.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// US federal bank holidays, 2024-2025.
static FEDERAL_HOLIDAYS: &[(i32, u32, u32)] = &[
    (2024, 1, 1),   // New Year's Day
    (2024, 1, 15),  // Martin Luther King Jr. Day
    (2024, 2, 19),  // Presidents' Day
    (2024, 5, 27),  // Memorial Day
    (2024, 6, 19),  // Juneteenth
    (2024, 7, 4),   // Independence Day
    (2024, 9, 2),   // Labor Day
    (2024, 10, 14), // Columbus Day
    (2024, 11, 11), // Veterans Day
    (2024, 11, 28), // Thanksgiving
    (2024, 12, 25), // Christmas
    (2025, 1, 1),
    (2025, 1, 20),
    (2025, 2, 17),
    (2025, 5, 26),
    (2025, 6, 19),
    (2025, 7, 4),
    (2025, 9, 1),
    (2025, 10, 13),
    (2025, 11, 11),
    (2025, 11, 27),
    (2025, 12, 25),
];

/// A set of non-business calendar dates plus the weekday rule.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        let holidays = FEDERAL_HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();
        Self { holidays }
    }
}

impl HolidayCalendar {
    /// Builds a calendar from an explicit set of holiday dates.
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    /// Loads a holiday list from a JSON array of `YYYY-MM-DD` strings.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read holiday calendar '{path}'"))?;
        let entries: Vec<String> = serde_json::from_str(&content)
            .with_context(|| format!("holiday calendar '{path}' is not a JSON string array"))?;

        let mut holidays = HashSet::new();
        for entry in &entries {
            let date = NaiveDate::parse_from_str(entry, "%Y-%m-%d")
                .with_context(|| format!("bad holiday date '{entry}' in '{path}'"))?;
            holidays.insert(date);
        }
        Ok(Self { holidays })
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Monday through Friday, excluding listed holidays.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        date.weekday().number_from_monday() <= 5 && !self.is_holiday(date)
    }
}
