//! Commuting cost comparison and mode recommendation.
//!
//! [`model`] prices each commuting mode from fare-table rows and driving
//! reference figures; [`recommend`] scores the modes against a user's
//! priority ranking.

pub mod model;
pub mod recommend;

use std::fmt;

use serde::Serialize;

/// A commuting method. The enumeration order here is the deterministic
/// tie-break order for recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    SelfDrive,
    RideshareStandard,
    RideshareLuxury,
    Transit,
    Shuttle,
    ShuttleMember,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::SelfDrive,
        Mode::RideshareStandard,
        Mode::RideshareLuxury,
        Mode::Transit,
        Mode::Shuttle,
        Mode::ShuttleMember,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::SelfDrive => "Self Drive",
            Mode::RideshareStandard => "Rideshare",
            Mode::RideshareLuxury => "Luxury Rideshare",
            Mode::Transit => "Rail Transit",
            Mode::Shuttle => "Shuttle Bus",
            Mode::ShuttleMember => "Shuttle Bus (Member)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
