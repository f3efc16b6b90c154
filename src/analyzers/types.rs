//! Derived series types produced by the aggregation pipeline.

use serde::Serialize;

use crate::analyzers::utility::round2;

/// Accumulator for one grouping key, split by the congestion-pricing flag.
///
/// Averages exist only when the matching side has records; an empty side is
/// `None`, never zero.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PolicyBucket {
    pre_total: f64,
    pre_count: u32,
    post_total: f64,
    post_count: u32,
}

impl PolicyBucket {
    pub fn push(&mut self, duration_minutes: f64, policy_active: bool) {
        if policy_active {
            self.post_total += duration_minutes;
            self.post_count += 1;
        } else {
            self.pre_total += duration_minutes;
            self.pre_count += 1;
        }
    }

    pub fn pre_count(&self) -> u32 {
        self.pre_count
    }

    pub fn post_count(&self) -> u32 {
        self.post_count
    }

    pub fn pre_average(&self) -> Option<f64> {
        (self.pre_count > 0).then(|| self.pre_total / self.pre_count as f64)
    }

    pub fn post_average(&self) -> Option<f64> {
        (self.post_count > 0).then(|| self.post_total / self.post_count as f64)
    }

    /// Post-minus-pre change at 2-decimal precision, defined only when both
    /// sides have data. A one-sided bucket is "no data", not a partial
    /// comparison.
    pub fn delta(&self) -> Option<f64> {
        match (self.pre_average(), self.post_average()) {
            (Some(pre), Some(post)) => Some(round2(post - pre)),
            _ => None,
        }
    }
}

/// One date on a route's daily series. Durations are whole minutes; trend
/// values are the OLS overlay and stay absent at dates with no observation
/// on that side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: String,
    pub pre_duration: Option<i64>,
    pub post_duration: Option<i64>,
    pub pre_trend: Option<f64>,
    pub post_trend: Option<f64>,
}

/// One time-of-day bucket on a weekday series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayPoint {
    pub time: String,
    pub pre_duration: Option<i64>,
    pub post_duration: Option<i64>,
}

/// A route's chronological daily series plus headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSeries {
    pub route_name: String,
    pub starting_point: Option<String>,
    pub finish_point: Option<String>,
    pub points: Vec<SeriesPoint>,
    pub pre_average: Option<i64>,
    pub post_average: Option<i64>,
    pub change_percent: Option<i64>,
}

/// Time-of-day buckets for a single weekday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySeries {
    pub weekday: String,
    pub points: Vec<TimeOfDayPoint>,
    pub pre_average: Option<i64>,
    pub post_average: Option<i64>,
    pub change_percent: Option<i64>,
}

/// All weekday series for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteWeekdaySeries {
    pub route_name: String,
    pub starting_point: Option<String>,
    pub finish_point: Option<String>,
    pub weekdays: Vec<WeekdaySeries>,
}

/// One heat-map row: a time of day with a delta cell per weekday column.
/// `values` is aligned with [`crate::analyzers::heatmap::HEATMAP_WEEKDAYS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub time: String,
    pub values: Vec<Option<f64>>,
}

/// A morning or afternoon block of heat-map rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapSection {
    pub label: String,
    pub rows: Vec<HeatmapRow>,
}

/// Heat map for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapRoute {
    pub route_name: String,
    pub starting_point: Option<String>,
    pub finish_point: Option<String>,
    pub sections: Vec<HeatmapSection>,
}

/// One date on the merged pre/post rolling-average series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingPoint {
    pub date: String,
    pub pre_rolling: Option<i64>,
    pub post_rolling: Option<i64>,
}

/// Rolling-average series for one route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRollingSeries {
    pub route_name: String,
    pub starting_point: Option<String>,
    pub finish_point: Option<String>,
    pub points: Vec<RollingPoint>,
}
