//! Per-route daily and weekday series.
//!
//! Daily series bucket eligible rows by calendar date, average each side of
//! the policy split to whole minutes, sort chronologically, and attach an
//! OLS trend overlay per side. Weekday series bucket by time of day within
//! each weekday.

use std::collections::HashMap;

use crate::analyzers::grouping::{self, RouteGroup};
use crate::analyzers::trend;
use crate::analyzers::types::{
    PolicyBucket, RouteSeries, RouteWeekdaySeries, SeriesPoint, TimeOfDayPoint, WeekdaySeries,
};
use crate::analyzers::utility::{mean, round_minutes};
use crate::model::CommuteObservation;
use crate::timeparse;

/// Weekday enumeration order for the weekday series.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

fn policy_active(row: &CommuteObservation) -> bool {
    row.congestion_pricing == Some(true)
}

/// Whole-percent change from pre to post, defined only when both averages
/// exist and the pre side is positive.
fn change_percent(pre: Option<i64>, post: Option<i64>) -> Option<i64> {
    match (pre, post) {
        (Some(pre), Some(post)) if pre > 0 => {
            Some((((post - pre) as f64 / pre as f64) * 100.0).round() as i64)
        }
        _ => None,
    }
}

fn side_average(values: impl Iterator<Item = i64>) -> Option<i64> {
    let values: Vec<f64> = values.map(|v| v as f64).collect();
    (!values.is_empty()).then(|| round_minutes(mean(&values)))
}

/// Builds the chronological daily series for one route group, trend overlay
/// included.
pub fn daily_series(records: &[&CommuteObservation]) -> Vec<SeriesPoint> {
    let mut buckets: HashMap<String, PolicyBucket> = HashMap::new();

    for row in records {
        let Some(date) = row.date.as_deref().filter(|d| !d.is_empty()) else {
            continue;
        };
        let Some(duration) = row.duration_minutes else {
            continue;
        };
        buckets
            .entry(date.to_string())
            .or_default()
            .push(duration, policy_active(row));
    }

    let mut points: Vec<SeriesPoint> = buckets
        .into_iter()
        .map(|(date, bucket)| SeriesPoint {
            date,
            pre_duration: bucket.pre_average().map(round_minutes),
            post_duration: bucket.post_average().map(round_minutes),
            pre_trend: None,
            post_trend: None,
        })
        .collect();

    // tie-break on the raw text so equal parsed dates never depend on
    // bucket iteration order
    points.sort_by(|a, b| {
        timeparse::parse_calendar_date(&a.date)
            .cmp(&timeparse::parse_calendar_date(&b.date))
            .then_with(|| a.date.cmp(&b.date))
    });
    attach_trends(&mut points);
    points
}

/// Fits one OLS line per policy side over (index, duration) and writes the
/// prediction back onto the indices that had a real observation. Gaps keep
/// a null trend; nothing is extrapolated.
fn attach_trends(points: &mut [SeriesPoint]) {
    let pre_points: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.pre_duration.map(|v| (i as f64, v as f64)))
        .collect();
    if let Some(fit) = trend::fit_line(&pre_points) {
        for (i, point) in points.iter_mut().enumerate() {
            if point.pre_duration.is_some() {
                point.pre_trend = Some(fit.predict(i as f64));
            }
        }
    }

    let post_points: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.post_duration.map(|v| (i as f64, v as f64)))
        .collect();
    if let Some(fit) = trend::fit_line(&post_points) {
        for (i, point) in points.iter_mut().enumerate() {
            if point.post_duration.is_some() {
                point.post_trend = Some(fit.predict(i as f64));
            }
        }
    }
}

fn route_series_from_group(route_name: &str, group: &RouteGroup<'_>) -> RouteSeries {
    let points = daily_series(&group.records);

    let pre_average = side_average(points.iter().filter_map(|p| p.pre_duration));
    let post_average = side_average(points.iter().filter_map(|p| p.post_duration));

    RouteSeries {
        route_name: route_name.to_string(),
        starting_point: group.endpoints.starting_point.clone(),
        finish_point: group.endpoints.finish_point.clone(),
        points,
        pre_average,
        post_average,
        change_percent: change_percent(pre_average, post_average),
    }
}

/// Daily series for every route in the input, in route-name order.
pub fn route_daily_series(rows: &[CommuteObservation]) -> Vec<RouteSeries> {
    grouping::group_by_route(rows)
        .iter()
        .map(|(route_name, group)| route_series_from_group(route_name, group))
        .collect()
}

fn weekday_series_from_records(weekday: &str, records: &[&CommuteObservation]) -> WeekdaySeries {
    let mut buckets: HashMap<String, PolicyBucket> = HashMap::new();

    for row in records {
        let Some(time_key) = grouping::time_bucket_key(row) else {
            continue;
        };
        let Some(duration) = row.duration_minutes else {
            continue;
        };
        buckets
            .entry(time_key.to_string())
            .or_default()
            .push(duration, policy_active(row));
    }

    let mut points: Vec<TimeOfDayPoint> = buckets
        .into_iter()
        .map(|(time, bucket)| TimeOfDayPoint {
            time,
            pre_duration: bucket.pre_average().map(round_minutes),
            post_duration: bucket.post_average().map(round_minutes),
        })
        .collect();
    points.sort_by(|a, b| {
        timeparse::parse_clock_minutes(&a.time)
            .cmp(&timeparse::parse_clock_minutes(&b.time))
            .then_with(|| a.time.cmp(&b.time))
    });

    let pre_average = side_average(points.iter().filter_map(|p| p.pre_duration));
    let post_average = side_average(points.iter().filter_map(|p| p.post_duration));

    WeekdaySeries {
        weekday: weekday.to_string(),
        points,
        pre_average,
        post_average,
        change_percent: change_percent(pre_average, post_average),
    }
}

/// Time-of-day series per weekday for every route in the input.
pub fn route_weekday_series(rows: &[CommuteObservation]) -> Vec<RouteWeekdaySeries> {
    grouping::group_by_route(rows)
        .iter()
        .map(|(route_name, group)| {
            let mut by_weekday: HashMap<&str, Vec<&CommuteObservation>> = HashMap::new();
            for row in &group.records {
                by_weekday.entry(grouping::weekday_key(row)).or_default().push(*row);
            }

            let weekdays = WEEKDAYS
                .iter()
                .map(|day| {
                    let records = by_weekday.get(day).map(Vec::as_slice).unwrap_or(&[]);
                    weekday_series_from_records(day, records)
                })
                .collect();

            RouteWeekdaySeries {
                route_name: route_name.clone(),
                starting_point: group.endpoints.starting_point.clone(),
                finish_point: group.endpoints.finish_point.clone(),
                weekdays,
            }
        })
        .collect()
}
