//! Data-quality summary for a fetched batch of observation rows.
//!
//! One [`SampleStats`] row is recorded per fetch so gaps in the upstream
//! dataset (missing durations, unparseable dates, rows without a time key)
//! are visible instead of silently shrinking the charts. Fetch failures
//! are recorded as error rows rather than lost.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::analyzers::grouping;
use crate::model::CommuteObservation;
use crate::timeparse;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SampleStats {
    pub timestamp: DateTime<Utc>,
    pub source: Option<String>,
    pub period: Option<String>,

    // row counts
    pub total_rows: usize,
    pub eligible: usize,
    pub non_commuting: usize,
    pub missing_duration: usize,
    pub missing_time_key: usize,
    pub unparseable_date: usize,

    // policy split over eligible rows
    pub pre_policy: usize,
    pub post_policy: usize,

    pub routes: usize,

    // error tracking
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl SampleStats {
    pub fn from_rows(rows: &[CommuteObservation]) -> Self {
        let mut s = SampleStats {
            timestamp: Utc::now(),
            ..Default::default()
        };

        s.total_rows = rows.len();

        let mut routes = HashSet::new();

        for row in rows {
            if row.is_commuting_day != Some(true) {
                s.non_commuting += 1;
                continue;
            }

            if row.duration_minutes.is_none() {
                s.missing_duration += 1;
                continue;
            }

            s.eligible += 1;
            routes.insert(grouping::route_key(row));

            if row.congestion_pricing == Some(true) {
                s.post_policy += 1;
            } else {
                s.pre_policy += 1;
            }

            if grouping::time_bucket_key(row).is_none() {
                s.missing_time_key += 1;
            }

            let date_parses = row
                .date
                .as_deref()
                .is_some_and(|d| timeparse::try_parse_calendar_date(d).is_some());
            if !date_parses {
                s.unparseable_date += 1;
            }
        }

        s.routes = routes.len();
        s
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(error_type: &str, error_message: &str) -> Self {
        SampleStats {
            timestamp: Utc::now(),
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }

    /// Set fetch metadata (source and morning/afternoon period)
    pub fn with_source_info(mut self, source: &str, period: &str) -> Self {
        self.source = Some(source.to_string());
        self.period = Some(period.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(route: &str, duration: Option<f64>, commuting: bool) -> CommuteObservation {
        CommuteObservation {
            route_name: Some(route.to_string()),
            date: Some("2025-01-06".to_string()),
            rounded_time: Some("7:30 AM".to_string()),
            is_commuting_day: Some(commuting),
            duration_minutes: duration,
            congestion_pricing: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_rows_empty() {
        let stats = SampleStats::from_rows(&[]);
        assert_eq!(stats.total_rows, 0);
        assert_eq!(stats.eligible, 0);
        assert_eq!(stats.routes, 0);
    }

    #[test]
    fn test_eligibility_breakdown_sums_to_total() {
        let rows = vec![
            row("New Jersey", Some(40.0), true),
            row("New Jersey", None, true),
            row("Connecticut", Some(55.0), false),
        ];
        let stats = SampleStats::from_rows(&rows);

        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.eligible, 1);
        assert_eq!(stats.missing_duration, 1);
        assert_eq!(stats.non_commuting, 1);
        assert_eq!(
            stats.eligible + stats.missing_duration + stats.non_commuting,
            stats.total_rows
        );
        assert_eq!(stats.routes, 1);
    }

    #[test]
    fn test_policy_split_counts_eligible_rows_only() {
        let mut post = row("New Jersey", Some(38.0), true);
        post.congestion_pricing = Some(true);
        let rows = vec![row("New Jersey", Some(40.0), true), post];
        let stats = SampleStats::from_rows(&rows);

        assert_eq!(stats.pre_policy, 1);
        assert_eq!(stats.post_policy, 1);
    }

    #[test]
    fn test_quality_counters() {
        let mut bad_date = row("New Jersey", Some(40.0), true);
        bad_date.date = Some("someday".to_string());

        let mut no_time = row("New Jersey", Some(40.0), true);
        no_time.rounded_time = None;
        no_time.time = None;
        no_time.date = None;

        let stats = SampleStats::from_rows(&[bad_date, no_time]);

        assert_eq!(stats.unparseable_date, 2); // missing date counts too
        assert_eq!(stats.missing_time_key, 1);
    }

    #[test]
    fn test_error_record_with_source_info() {
        let stats =
            SampleStats::from_error("fetch_error", "timeout").with_source_info("api", "morning");

        assert_eq!(stats.error_type.as_deref(), Some("fetch_error"));
        assert_eq!(stats.source.as_deref(), Some("api"));
        assert_eq!(stats.period.as_deref(), Some("morning"));
        assert_eq!(stats.total_rows, 0);
    }
}
