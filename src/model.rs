//! Row types fetched from the commute data store.

use serde::{Deserialize, Serialize};

/// A single commute observation row.
///
/// Every field mirrors a nullable store column; the aggregation core decides
/// eligibility and fallbacks, not the deserializer.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CommuteObservation {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub rounded_time: Option<String>,
    #[serde(default)]
    pub route_name: Option<String>,
    #[serde(default)]
    pub weekday: Option<String>,
    #[serde(default)]
    pub is_morning: Option<bool>,
    #[serde(default)]
    pub is_commuting_day: Option<bool>,
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub congestion_pricing: Option<bool>,
    #[serde(default)]
    pub starting_point: Option<String>,
    #[serde(default)]
    pub finish_point: Option<String>,
}

/// Rail fare table row, keyed by origin station.
///
/// Weekly and monthly are independent reference figures from the fare table,
/// not derived from the daily figure.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TransitFare {
    pub station: String,
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub daily_round_trip: Option<f64>,
    #[serde(default)]
    pub weekly: Option<f64>,
    #[serde(default)]
    pub monthly: Option<f64>,
    /// One-way distance to the destination, in miles. The baseline for all
    /// driving-mode cost figures.
    #[serde(default)]
    pub distance_miles: Option<f64>,
}

/// Shuttle bus fare table row. Not every origin is served, so lookups may
/// legitimately come back empty.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ShuttleFare {
    pub station: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub standard_round_trip: Option<f64>,
    #[serde(default)]
    pub member_round_trip: Option<f64>,
    #[serde(default)]
    pub monthly_membership: Option<f64>,
}

/// Driving cost reference figures, shared by every car-based mode.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct DrivingReference {
    pub mpg: f64,
    pub gas_price_per_gallon: f64,
    pub tolls: f64,
    pub parking: f64,
    pub congestion_fee: f64,
}
