//! Per-mode daily, weekly, and monthly commuting cost figures.
//!
//! All driving-based modes share one fuel term derived from the round-trip
//! distance; only the additive surcharges differ per mode. Transit figures
//! come straight from the fare table. Shuttle service is optional at many
//! origins, so its absence is a typed "not available" state rather than an
//! error or a zero.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::model::{DrivingReference, ShuttleFare, TransitFare};

/// Business days per month used for monthly projections.
pub const BUSINESS_DAYS_PER_MONTH: f64 = 21.0;

/// Assumed average speed used to convert luxury-rideshare distance into a
/// billable time surcharge.
const LUXURY_SPEED_MPH: f64 = 30.0;

/// Rideshare pricing rules. Reference constants, injectable so a fare
/// revision never touches the computation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RideshareRates {
    pub base_fare: f64,
    pub standard_per_mile: f64,
    pub luxury_per_mile: f64,
    pub luxury_per_minute: f64,
}

impl Default for RideshareRates {
    fn default() -> Self {
        Self {
            base_fare: 3.50,
            standard_per_mile: 2.15,
            luxury_per_mile: 3.80,
            luxury_per_minute: 0.95,
        }
    }
}

/// A cost figure for one mode and cadence. `NotAvailable` marks a mode not
/// offered at the origin; it is never collapsed to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModeCost {
    Available(f64),
    NotAvailable,
}

impl ModeCost {
    fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => ModeCost::Available(v),
            None => ModeCost::NotAvailable,
        }
    }

    fn scale(self, factor: f64) -> Self {
        match self {
            ModeCost::Available(v) => ModeCost::Available(v * factor),
            ModeCost::NotAvailable => ModeCost::NotAvailable,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            ModeCost::Available(v) => Some(v),
            ModeCost::NotAvailable => None,
        }
    }
}

/// Daily, weekly, and monthly figures for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeSchedule {
    pub daily: ModeCost,
    pub weekly: ModeCost,
    pub monthly: ModeCost,
}

impl ModeSchedule {
    /// Weekly = daily x commuting days; monthly = daily x 21 business days.
    /// Transit does not use this: its weekly/monthly are table values.
    fn projected(daily: ModeCost, days_per_week: f64) -> Self {
        Self {
            daily,
            weekly: daily.scale(days_per_week),
            monthly: daily.scale(BUSINESS_DAYS_PER_MONTH),
        }
    }

    fn not_available() -> Self {
        Self {
            daily: ModeCost::NotAvailable,
            weekly: ModeCost::NotAvailable,
            monthly: ModeCost::NotAvailable,
        }
    }
}

/// Shared per-day driving cost components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub fuel: f64,
    pub tolls: f64,
    pub parking: f64,
    pub congestion: f64,
}

/// Full cost comparison across every mode for one origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    pub origin: String,
    pub days_per_week: u32,
    pub self_drive: ModeSchedule,
    pub rideshare_standard: ModeSchedule,
    pub rideshare_luxury: ModeSchedule,
    pub transit: ModeSchedule,
    pub shuttle: ModeSchedule,
    pub shuttle_member: ModeSchedule,
    pub breakdown: CostBreakdown,
}

/// Prices every mode for the origin described by `fare`.
///
/// # Errors
///
/// Fails when the fare row carries no one-way distance or the driving
/// reference has a non-positive mpg; without those there is no baseline for
/// any driving-based figure. A missing shuttle row is not an error.
pub fn compute_costs(
    fare: &TransitFare,
    shuttle: Option<&ShuttleFare>,
    driving: &DrivingReference,
    rates: &RideshareRates,
    days_per_week: u32,
) -> Result<CostResult> {
    let Some(distance) = fare.distance_miles else {
        bail!("fare table has no distance for station '{}'", fare.station);
    };
    if driving.mpg <= 0.0 {
        bail!("driving reference mpg must be positive, got {}", driving.mpg);
    }

    let round_trip_distance = distance * 2.0;
    // One fuel term shared by every car-based mode
    let fuel = round_trip_distance / driving.mpg * driving.gas_price_per_gallon;
    let days = f64::from(days_per_week);

    let self_drive_daily = fuel + driving.tolls + driving.parking + driving.congestion_fee;

    // Round trip is charged as two one-way trips; tolls and the congestion
    // fee are charged once per day
    let standard_daily = 2.0 * (rates.base_fare + distance * rates.standard_per_mile + fuel)
        + driving.tolls
        + driving.congestion_fee;
    let luxury_daily = 2.0
        * (rates.base_fare
            + distance * rates.luxury_per_mile
            + distance / LUXURY_SPEED_MPH * rates.luxury_per_minute
            + fuel)
        + driving.tolls
        + driving.congestion_fee;

    let transit = ModeSchedule {
        daily: ModeCost::from_option(fare.daily_round_trip),
        weekly: ModeCost::from_option(fare.weekly),
        monthly: ModeCost::from_option(fare.monthly),
    };

    let (shuttle_schedule, member_schedule) = match shuttle {
        Some(row) => shuttle_schedules(row, days),
        None => (ModeSchedule::not_available(), ModeSchedule::not_available()),
    };

    Ok(CostResult {
        origin: fare.station.clone(),
        days_per_week,
        self_drive: ModeSchedule::projected(ModeCost::Available(self_drive_daily), days),
        rideshare_standard: ModeSchedule::projected(ModeCost::Available(standard_daily), days),
        rideshare_luxury: ModeSchedule::projected(ModeCost::Available(luxury_daily), days),
        transit,
        shuttle: shuttle_schedule,
        shuttle_member: member_schedule,
        breakdown: CostBreakdown {
            fuel,
            tolls: driving.tolls,
            parking: driving.parking,
            congestion: driving.congestion_fee,
        },
    })
}

fn shuttle_schedules(row: &ShuttleFare, days: f64) -> (ModeSchedule, ModeSchedule) {
    let standard = ModeSchedule::projected(ModeCost::from_option(row.standard_round_trip), days);

    // Member monthly adds the flat membership fee on top of the projected
    // per-day member rate
    let member = match (row.member_round_trip, row.monthly_membership) {
        (Some(daily), Some(membership)) => ModeSchedule {
            daily: ModeCost::Available(daily),
            weekly: ModeCost::Available(daily * days),
            monthly: ModeCost::Available(daily * BUSINESS_DAYS_PER_MONTH + membership),
        },
        _ => ModeSchedule::not_available(),
    };

    (standard, member)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fare() -> TransitFare {
        TransitFare {
            station: "Summit Station".to_string(),
            line: Some("Morris & Essex".to_string()),
            daily_round_trip: Some(22.75),
            weekly: Some(98.0),
            monthly: Some(310.0),
            distance_miles: Some(20.0),
        }
    }

    fn driving() -> DrivingReference {
        DrivingReference {
            mpg: 25.0,
            gas_price_per_gallon: 3.50,
            tolls: 10.0,
            parking: 15.0,
            congestion_fee: 9.0,
        }
    }

    fn shuttle() -> ShuttleFare {
        ShuttleFare {
            station: "Summit Station".to_string(),
            route: Some("Summit - Midtown".to_string()),
            standard_round_trip: Some(15.0),
            member_round_trip: Some(12.0),
            monthly_membership: Some(30.0),
        }
    }

    fn assert_cost(cost: ModeCost, expected: f64) {
        let value = cost.value().expect("cost available");
        assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
    }

    #[test]
    fn test_self_drive_scenario() {
        // 20 mi one way -> 40 round trip; fuel (40/25)*3.50 = 5.60;
        // daily 5.60 + 10 + 15 + 9 = 39.60
        let result = compute_costs(&fare(), None, &driving(), &RideshareRates::default(), 5)
            .expect("costs");

        assert!((result.breakdown.fuel - 5.60).abs() < 1e-9);
        assert_cost(result.self_drive.daily, 39.60);
        assert_cost(result.self_drive.weekly, 39.60 * 5.0);
        assert_cost(result.self_drive.monthly, 39.60 * 21.0);
    }

    #[test]
    fn test_rideshare_doubles_trip_but_not_tolls() {
        let rates = RideshareRates::default();
        let result = compute_costs(&fare(), None, &driving(), &rates, 5).expect("costs");

        let fuel = 5.60;
        let expected_standard = 2.0 * (3.50 + 20.0 * 2.15 + fuel) + 10.0 + 9.0;
        assert_cost(result.rideshare_standard.daily, expected_standard);

        let expected_luxury =
            2.0 * (3.50 + 20.0 * 3.80 + 20.0 / 30.0 * 0.95 + fuel) + 10.0 + 9.0;
        assert_cost(result.rideshare_luxury.daily, expected_luxury);
    }

    #[test]
    fn test_transit_figures_come_from_the_table() {
        let result = compute_costs(&fare(), None, &driving(), &RideshareRates::default(), 3)
            .expect("costs");

        assert_cost(result.transit.daily, 22.75);
        // weekly/monthly are independent table values, not daily x days
        assert_cost(result.transit.weekly, 98.0);
        assert_cost(result.transit.monthly, 310.0);
    }

    #[test]
    fn test_missing_shuttle_row_is_not_available() {
        let result = compute_costs(&fare(), None, &driving(), &RideshareRates::default(), 5)
            .expect("costs");

        assert_eq!(result.shuttle.daily, ModeCost::NotAvailable);
        assert_eq!(result.shuttle_member.monthly, ModeCost::NotAvailable);
    }

    #[test]
    fn test_shuttle_member_monthly_adds_membership() {
        let shuttle = shuttle();
        let result = compute_costs(
            &fare(),
            Some(&shuttle),
            &driving(),
            &RideshareRates::default(),
            4,
        )
        .expect("costs");

        assert_cost(result.shuttle.daily, 15.0);
        assert_cost(result.shuttle.weekly, 60.0);
        assert_cost(result.shuttle.monthly, 15.0 * 21.0);
        assert_cost(result.shuttle_member.daily, 12.0);
        assert_cost(result.shuttle_member.monthly, 12.0 * 21.0 + 30.0);
    }

    #[test]
    fn test_missing_distance_is_a_hard_error() {
        let mut no_distance = fare();
        no_distance.distance_miles = None;

        let result = compute_costs(
            &no_distance,
            None,
            &driving(),
            &RideshareRates::default(),
            5,
        );
        assert!(result.is_err());
    }
}
