//! Max-range inversion for the realistic model.

use crate::core::{dbm_from_watts, max_distance_km, received_power_dbm};
use crate::losses::{atmospheric_loss_db, environment_loss_db, total_path_loss_db};
use crate::region::Region;
use crate::weather::Weather;
use tracing::trace;

/// Bisection iteration cap.
const MAX_ITERATIONS: u32 = 50;
/// Convergence tolerance in dB.
const TOLERANCE_DB: f64 = 0.01;
/// Lower search bound: one metre.
const MIN_DISTANCE_KM: f64 = 0.001;

/// Maximum distance in km under the realistic model.
///
/// The total path loss is monotone non-decreasing in distance, so the
/// link budget is inverted by bisection on `[1 m, 2 * d_free_space]` with
/// at most 50 iterations, stopping early once the loss at the midpoint is
/// within 0.01 dB of the budget. The bisection midpoint is returned on
/// termination, so the result is always strictly positive.
pub fn realistic_max_distance_km(
    power_watts: f64,
    gain_tx_dbi: f64,
    gain_rx_dbi: f64,
    freq_mhz: f64,
    sensitivity_dbm: f64,
    region: &Region,
    weather: &Weather,
) -> f64 {
    let budget = dbm_from_watts(power_watts) + gain_tx_dbi + gain_rx_dbi - sensitivity_dbm;
    if !budget.is_finite() || freq_mhz <= 0.0 {
        return 0.0;
    }

    let free_space = max_distance_km(power_watts, gain_tx_dbi, gain_rx_dbi, freq_mhz, sensitivity_dbm);
    let mut lo = MIN_DISTANCE_KM;
    let mut hi = (2.0 * free_space).max(MIN_DISTANCE_KM * 2.0);
    let mut mid = (lo + hi) / 2.0;

    for iteration in 0..MAX_ITERATIONS {
        let loss = total_path_loss_db(region, weather, freq_mhz, mid);
        let diff = loss - budget;

        if diff.abs() < TOLERANCE_DB {
            trace!(iteration, distance_km = mid, "bisection converged");
            break;
        }
        if diff > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        mid = (lo + hi) / 2.0;
    }

    mid
}

/// Received power in dBm at a fixed distance under the realistic model:
/// the free-space result minus the summed environment and atmospheric
/// losses at that distance.
pub fn realistic_received_power_dbm(
    power_watts: f64,
    gain_tx_dbi: f64,
    gain_rx_dbi: f64,
    freq_mhz: f64,
    distance_km: f64,
    region: &Region,
    weather: &Weather,
) -> f64 {
    received_power_dbm(power_watts, gain_tx_dbi, gain_rx_dbi, freq_mhz, distance_km)
        - environment_loss_db(region, freq_mhz, distance_km)
        - atmospheric_loss_db(region, weather, freq_mhz, distance_km)
}

/// Fractional range reduction of the realistic model against free space,
/// in `[0, 1]`. Drives the margin recommendation.
pub fn range_reduction(free_space_km: f64, realistic_km: f64) -> f64 {
    if free_space_km <= 0.0 {
        return 0.0;
    }
    (1.0 - realistic_km / free_space_km).clamp(0.0, 1.0)
}
