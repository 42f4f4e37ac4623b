//! Link-budget mathematics: Friis free-space calculations and the
//! planning-grade realistic model layered on top of them.
//!
//! The free-space core is closed-form. The realistic model composes
//! additive dB losses (environment and atmospheric) on top of free-space
//! path loss; because every component is non-decreasing in distance, the
//! maximum range is recovered by bisection rather than algebra.
//!
//! Numeric functions never fail. Degenerate inputs produce sentinel
//! values: zero or negative power yields `-inf` dBm, zero distance yields
//! `+inf` path loss. Callers decide what to do with them.

pub mod core;
pub mod losses;
pub mod recommend;
pub mod region;
pub mod solver;
pub mod weather;

pub use crate::core::{
    dbm_from_watts, eirp_watts, free_space_path_loss_db, max_distance_km, received_power_dbm,
    watts_from_dbm,
};
pub use losses::{atmospheric_loss_db, environment_loss_db, total_path_loss_db};
pub use recommend::{recommendations, Recommendation};
pub use region::Region;
pub use solver::{realistic_max_distance_km, realistic_received_power_dbm, range_reduction};
pub use weather::Weather;
