//! Eligibility filtering and route grouping.
//!
//! Every aggregation starts here: rows are filtered down to eligible
//! observations, partitioned by route, and the route's descriptive endpoints
//! are merged with a single first-non-null-wins rule so no chart section can
//! drift from another.

use std::collections::BTreeMap;

use crate::model::CommuteObservation;

/// Route key used when a row carries no usable route name.
pub const UNKNOWN_ROUTE: &str = "Unknown Route";

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// A row contributes to aggregate statistics only when it is flagged as a
/// commuting day and carries an observed duration.
pub fn is_eligible(row: &CommuteObservation) -> bool {
    row.is_commuting_day == Some(true) && row.duration_minutes.is_some()
}

/// Route grouping key, with the unknown-route fallback applied.
pub fn route_key(row: &CommuteObservation) -> &str {
    non_empty(&row.route_name).unwrap_or(UNKNOWN_ROUTE)
}

/// Weekday grouping key. Rows keep a weekday slot even when the time-bucket
/// key is missing.
pub fn weekday_key(row: &CommuteObservation) -> &str {
    non_empty(&row.weekday).unwrap_or("Unknown")
}

/// Ordered-candidate time-bucket key: `rounded_time`, then `time`, then
/// `date`. A row with none of them has no place on a time axis and is
/// dropped from time-keyed grouping only.
pub fn time_bucket_key(row: &CommuteObservation) -> Option<&str> {
    non_empty(&row.rounded_time)
        .or_else(|| non_empty(&row.time))
        .or_else(|| non_empty(&row.date))
}

/// Descriptive endpoints for a route, merged across its rows.
///
/// First non-null wins: once an endpoint is known for a route, later rows
/// with null endpoints must not erase it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RouteEndpoints {
    pub starting_point: Option<String>,
    pub finish_point: Option<String>,
}

impl RouteEndpoints {
    pub fn absorb(&mut self, row: &CommuteObservation) {
        if self.starting_point.is_none() {
            self.starting_point = non_empty(&row.starting_point).map(str::to_string);
        }
        if self.finish_point.is_none() {
            self.finish_point = non_empty(&row.finish_point).map(str::to_string);
        }
    }
}

/// All eligible rows for one route, plus its merged endpoints.
#[derive(Debug, Default)]
pub struct RouteGroup<'a> {
    pub endpoints: RouteEndpoints,
    pub records: Vec<&'a CommuteObservation>,
}

/// Partitions eligible rows by route name. The map is ordered so every
/// downstream enumeration is deterministic without leaning on insertion
/// order.
pub fn group_by_route(rows: &[CommuteObservation]) -> BTreeMap<String, RouteGroup<'_>> {
    let mut groups: BTreeMap<String, RouteGroup<'_>> = BTreeMap::new();

    for row in rows.iter().filter(|row| is_eligible(row)) {
        let group = groups.entry(route_key(row).to_string()).or_default();
        group.endpoints.absorb(row);
        group.records.push(row);
    }

    groups
}
