//! Weekday-by-time heat map of the congestion-pricing duration change.
//!
//! Each cell is the post-minus-pre change in average duration for one
//! route, period, time of day, and weekday. A cell exists only when both
//! policy sides have observations; anything else is "no data".

use std::collections::{BTreeMap, HashMap};

use crate::analyzers::grouping::{self, RouteEndpoints};
use crate::analyzers::types::{HeatmapRoute, HeatmapRow, HeatmapSection, PolicyBucket};
use crate::model::CommuteObservation;
use crate::timeparse;

/// Column order for heat-map cells. Weekends carry too little commute data
/// to chart.
pub const HEATMAP_WEEKDAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

const PERIOD_LABELS: [&str; 2] = ["Morning", "Afternoon"];

#[derive(Default)]
struct RouteAccumulator {
    endpoints: RouteEndpoints,
    // period label -> time key -> weekday -> bucket
    periods: HashMap<&'static str, HashMap<String, HashMap<String, PolicyBucket>>>,
}

/// Builds the heat map across all routes from morning and afternoon rows
/// combined.
pub fn build_heatmap(rows: &[CommuteObservation]) -> Vec<HeatmapRoute> {
    let mut routes: BTreeMap<String, RouteAccumulator> = BTreeMap::new();

    for row in rows.iter().filter(|row| grouping::is_eligible(row)) {
        let accumulator = routes
            .entry(grouping::route_key(row).to_string())
            .or_default();
        accumulator.endpoints.absorb(row);

        let Some(time_key) = grouping::time_bucket_key(row) else {
            continue;
        };
        let Some(duration) = row.duration_minutes else {
            continue;
        };

        let period_label = if row.is_morning == Some(true) {
            "Morning"
        } else {
            "Afternoon"
        };

        accumulator
            .periods
            .entry(period_label)
            .or_default()
            .entry(time_key.to_string())
            .or_default()
            .entry(grouping::weekday_key(row).to_string())
            .or_default()
            .push(duration, row.congestion_pricing == Some(true));
    }

    routes
        .into_iter()
        .map(|(route_name, accumulator)| {
            let sections = PERIOD_LABELS
                .iter()
                .filter_map(|&label| {
                    let times = accumulator.periods.get(label)?;
                    if times.is_empty() {
                        return None;
                    }
                    Some(build_section(label, times))
                })
                .collect();

            HeatmapRoute {
                route_name,
                starting_point: accumulator.endpoints.starting_point,
                finish_point: accumulator.endpoints.finish_point,
                sections,
            }
        })
        .collect()
}

fn build_section(
    label: &str,
    times: &HashMap<String, HashMap<String, PolicyBucket>>,
) -> HeatmapSection {
    let mut keys: Vec<&String> = times.keys().collect();
    keys.sort_by(|a, b| {
        timeparse::parse_clock_minutes(a)
            .cmp(&timeparse::parse_clock_minutes(b))
            .then_with(|| a.cmp(b))
    });

    let rows = keys
        .into_iter()
        .map(|time_key| {
            let day_buckets = &times[time_key];
            let values = HEATMAP_WEEKDAYS
                .iter()
                .map(|day| day_buckets.get(*day).and_then(PolicyBucket::delta))
                .collect();

            HeatmapRow {
                time: timeparse::format_clock_label(time_key),
                values,
            }
        })
        .collect();

    HeatmapSection {
        label: label.to_string(),
        rows,
    }
}
