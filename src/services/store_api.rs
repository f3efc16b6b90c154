//! Trait for the hosted commute data store.

use anyhow::Result;

use commute_pulse::model::{CommuteObservation, DrivingReference, ShuttleFare, TransitFare};

/// Abstraction over the hosted relational store's query interface.
///
/// Implementations page through results internally; callers always get one
/// flat, date-ordered list.
#[async_trait::async_trait]
pub trait CommuteStore {
    /// Returns every commuting-day observation for one period.
    async fn fetch_observations(&self, is_morning: bool) -> Result<Vec<CommuteObservation>>;

    /// Looks up the rail fare row for an origin station. `None` means the
    /// origin is unknown to the fare table — the caller decides whether
    /// that is fatal.
    async fn fetch_transit_fare(&self, station: &str) -> Result<Option<TransitFare>>;

    /// Looks up the shuttle fare row for an origin station. `None` is a
    /// valid "not offered here" state, not an error.
    async fn fetch_shuttle_fare(&self, station: &str) -> Result<Option<ShuttleFare>>;

    /// Returns the latest driving cost reference figures.
    async fn fetch_driving_reference(&self) -> Result<Option<DrivingReference>>;
}
