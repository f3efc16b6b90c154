//! Trailing rolling averages over business-day observations.
//!
//! The window covers records, not calendar positions: after filtering to
//! business days and sorting by date, each record's average spans the
//! trailing up-to-`window_size` records ending at itself, growing from one
//! at the start of the series. Output stays keyed by the original date
//! strings so callers can re-join display labels.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::analyzers::grouping;
use crate::analyzers::types::{RollingPoint, RouteRollingSeries};
use crate::analyzers::utility::{mean, round_minutes};
use crate::calendar::HolidayCalendar;
use crate::model::CommuteObservation;
use crate::timeparse;

pub const DEFAULT_WINDOW: usize = 7;

/// Computes the trailing rolling average per record, keyed by the record's
/// original date string. Later records on the same date overwrite earlier
/// ones.
pub fn rolling_average(
    records: &[&CommuteObservation],
    calendar: &HolidayCalendar,
    window_size: usize,
) -> HashMap<String, i64> {
    let mut eligible: Vec<(&str, NaiveDate, f64)> = records
        .iter()
        .filter_map(|row| {
            let date_text = row.date.as_deref().filter(|d| !d.is_empty())?;
            let date = timeparse::try_parse_calendar_date(date_text)?;
            let duration = row.duration_minutes?;
            calendar.is_business_day(date).then_some((date_text, date, duration))
        })
        .collect();
    eligible.sort_by_key(|&(_, date, _)| date);

    let mut averages = HashMap::new();
    for (index, &(date_text, _, _)) in eligible.iter().enumerate() {
        let start = index.saturating_sub(window_size.saturating_sub(1));
        let window: Vec<f64> = eligible[start..=index]
            .iter()
            .map(|&(_, _, duration)| duration)
            .collect();
        averages.insert(date_text.to_string(), round_minutes(mean(&window)));
    }

    averages
}

/// Merged pre/post rolling series over the union of dates, chronologically
/// sorted.
pub fn rolling_series(
    records: &[&CommuteObservation],
    calendar: &HolidayCalendar,
    window_size: usize,
) -> Vec<RollingPoint> {
    let (pre, post): (Vec<&CommuteObservation>, Vec<&CommuteObservation>) = records
        .iter()
        .copied()
        .partition(|row| row.congestion_pricing != Some(true));

    let pre_averages = rolling_average(&pre, calendar, window_size);
    let post_averages = rolling_average(&post, calendar, window_size);

    let mut dates: Vec<&String> = pre_averages.keys().chain(post_averages.keys()).collect();
    dates.sort();
    dates.dedup();
    dates.sort_by_key(|date| timeparse::parse_calendar_date(date));

    dates
        .into_iter()
        .map(|date| RollingPoint {
            date: date.clone(),
            pre_rolling: pre_averages.get(date).copied(),
            post_rolling: post_averages.get(date).copied(),
        })
        .collect()
}

/// Rolling series for every route in the input, in route-name order.
pub fn route_rolling_series(
    rows: &[CommuteObservation],
    calendar: &HolidayCalendar,
    window_size: usize,
) -> Vec<RouteRollingSeries> {
    grouping::group_by_route(rows)
        .iter()
        .map(|(route_name, group)| RouteRollingSeries {
            route_name: route_name.clone(),
            starting_point: group.endpoints.starting_point.clone(),
            finish_point: group.endpoints.finish_point.clone(),
            points: rolling_series(&group.records, calendar, window_size),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, duration: f64, policy: bool) -> CommuteObservation {
        CommuteObservation {
            route_name: Some("New Jersey".to_string()),
            date: Some(date.to_string()),
            is_commuting_day: Some(true),
            duration_minutes: Some(duration),
            congestion_pricing: Some(policy),
            ..Default::default()
        }
    }

    #[test]
    fn test_window_grows_then_caps() {
        // Mon 2025-02-03 .. Fri 2025-02-07, then Mon 2025-02-10 .. Fri 2025-02-14
        let dates = [
            "2025-02-03",
            "2025-02-04",
            "2025-02-05",
            "2025-02-06",
            "2025-02-07",
            "2025-02-10",
            "2025-02-11",
            "2025-02-12",
            "2025-02-13",
            "2025-02-14",
        ];
        let rows: Vec<CommuteObservation> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| row(date, (i as f64 + 1.0) * 10.0, false))
            .collect();
        let refs: Vec<&CommuteObservation> = rows.iter().collect();

        let averages = rolling_average(&refs, &HolidayCalendar::default(), 7);

        // k-th record averages min(k+1, 7) records
        assert_eq!(averages["2025-02-03"], 10); // window of 1
        assert_eq!(averages["2025-02-04"], 15); // (10+20)/2
        assert_eq!(averages["2025-02-07"], 30); // (10..50)/5
        assert_eq!(averages["2025-02-11"], 40); // (10..70)/7, first full window
        assert_eq!(averages["2025-02-12"], 50); // (20..80)/7, window slid
        assert_eq!(averages["2025-02-14"], 70); // (40..100)/7
    }

    #[test]
    fn test_weekends_and_holidays_excluded() {
        let rows = vec![
            row("2025-01-01", 99.0, false), // New Year's Day
            row("2025-01-04", 99.0, false), // Saturday
            row("2025-01-06", 40.0, false),
            row("2025-01-07", 44.0, false),
        ];
        let refs: Vec<&CommuteObservation> = rows.iter().collect();
        let averages = rolling_average(&refs, &HolidayCalendar::default(), 7);

        assert!(!averages.contains_key("2025-01-01"));
        assert!(!averages.contains_key("2025-01-04"));
        assert_eq!(averages["2025-01-06"], 40);
        assert_eq!(averages["2025-01-07"], 42);
    }

    #[test]
    fn test_unparseable_dates_dropped() {
        let rows = vec![row("someday", 40.0, false), row("2025-01-06", 44.0, false)];
        let refs: Vec<&CommuteObservation> = rows.iter().collect();
        let averages = rolling_average(&refs, &HolidayCalendar::default(), 7);

        assert_eq!(averages.len(), 1);
        assert_eq!(averages["2025-01-06"], 44);
    }

    #[test]
    fn test_series_merges_policy_sides_chronologically() {
        let rows = vec![
            row("2025-01-06", 40.0, false),
            row("2025-01-07", 44.0, false),
            row("2025-01-08", 38.0, true),
        ];
        let refs: Vec<&CommuteObservation> = rows.iter().collect();
        let points = rolling_series(&refs, &HolidayCalendar::default(), 7);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].date, "2025-01-06");
        assert_eq!(points[0].pre_rolling, Some(40));
        assert_eq!(points[0].post_rolling, None);
        assert_eq!(points[2].pre_rolling, None);
        assert_eq!(points[2].post_rolling, Some(38));
    }

    #[test]
    fn test_keys_keep_original_date_strings() {
        let rows = vec![row("1/6/25", 40.0, false)];
        let refs: Vec<&CommuteObservation> = rows.iter().collect();
        let averages = rolling_average(&refs, &HolidayCalendar::default(), 7);

        assert_eq!(averages["1/6/25"], 40);
    }
}
