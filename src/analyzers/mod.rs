//! Commute observation aggregation.
//!
//! Turns flat observation rows into the derived series the dashboard charts
//! consume: per-route daily series with trend overlays, weekday time-of-day
//! series, a pre/post delta heat map, and business-day rolling averages.

pub mod grouping;
pub mod heatmap;
pub mod rolling;
pub mod series;
pub mod trend;
pub mod types;
pub mod utility;
