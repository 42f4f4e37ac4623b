//! Free-space link-budget formulae.
//!
//! All logarithms are base 10. Distances are kilometres, frequencies
//! megahertz, powers watts or dBm as named.

/// The FSPL constant for km/MHz units.
const FSPL_CONST_DB: f64 = 32.44;

/// Convert watts to dBm. Zero or negative power yields `-inf`.
pub fn dbm_from_watts(watts: f64) -> f64 {
    if watts <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * (watts * 1000.0).log10()
}

/// Convert dBm to watts.
pub fn watts_from_dbm(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0) / 1000.0
}

/// Effective isotropic radiated power in watts.
pub fn eirp_watts(power_watts: f64, gain_dbi: f64) -> f64 {
    power_watts * 10f64.powf(gain_dbi / 10.0)
}

/// Free-space path loss in dB for a distance in km and frequency in MHz.
///
/// Zero distance (or frequency) yields `+inf`; the caller must handle it.
pub fn free_space_path_loss_db(distance_km: f64, freq_mhz: f64) -> f64 {
    if distance_km <= 0.0 || freq_mhz <= 0.0 {
        return f64::INFINITY;
    }
    20.0 * distance_km.log10() + 20.0 * freq_mhz.log10() + FSPL_CONST_DB
}

/// Maximum free-space distance in km for a transmit power, antenna gains,
/// frequency and receiver sensitivity.
///
/// Inverts the Friis equation: the link budget
/// `L = dBm(P) + G_tx + G_rx - S` is spent entirely on free-space path
/// loss.
pub fn max_distance_km(
    power_watts: f64,
    gain_tx_dbi: f64,
    gain_rx_dbi: f64,
    freq_mhz: f64,
    sensitivity_dbm: f64,
) -> f64 {
    let budget = dbm_from_watts(power_watts) + gain_tx_dbi + gain_rx_dbi - sensitivity_dbm;
    if !budget.is_finite() || freq_mhz <= 0.0 {
        return 0.0;
    }
    10f64.powf((budget - 20.0 * freq_mhz.log10() - FSPL_CONST_DB) / 20.0)
}

/// Received power in dBm at a fixed distance under free-space conditions.
pub fn received_power_dbm(
    power_watts: f64,
    gain_tx_dbi: f64,
    gain_rx_dbi: f64,
    freq_mhz: f64,
    distance_km: f64,
) -> f64 {
    dbm_from_watts(power_watts) + gain_tx_dbi + gain_rx_dbi
        - free_space_path_loss_db(distance_km, freq_mhz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbm_watts_roundtrip() {
        let mut p = 1e-6;
        while p <= 1e6 {
            let back = watts_from_dbm(dbm_from_watts(p));
            assert!((back - p).abs() / p < 1e-9, "p={}", p);
            p *= 10.0;
        }
    }

    #[test]
    fn test_dbm_of_one_watt() {
        assert!((dbm_from_watts(1.0) - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_power_is_neg_infinity() {
        assert_eq!(dbm_from_watts(0.0), f64::NEG_INFINITY);
        assert_eq!(dbm_from_watts(-2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_fspl_table_value() {
        // 1 km at 2400 MHz
        let fspl = free_space_path_loss_db(1.0, 2400.0);
        assert!((fspl - 100.05).abs() < 0.01, "got {}", fspl);
    }

    #[test]
    fn test_fspl_zero_distance() {
        assert_eq!(free_space_path_loss_db(0.0, 2400.0), f64::INFINITY);
    }

    #[test]
    fn test_eirp() {
        // 1 W with 6 dBi is ~3.98 W EIRP
        assert!((eirp_watts(1.0, 6.0) - 3.981).abs() < 0.001);
    }

    #[test]
    fn test_max_distance_closed_form() {
        // 1 W, 6 dBi both ends, 2400 MHz, -90 dBm sensitivity:
        // budget = 30 + 6 + 6 + 90 = 132 dB, and back-solving the FSPL
        // formula gives 10^((132 - 67.604 - 32.44) / 20) = 39.61 km.
        let d = max_distance_km(1.0, 6.0, 6.0, 2400.0, -90.0);
        assert!((d - 39.61).abs() / 39.61 < 0.01, "got {}", d);

        // Consistency: the loss at the returned distance equals the budget
        let loss = free_space_path_loss_db(d, 2400.0);
        assert!((loss - 132.0).abs() < 1e-6);
    }

    #[test]
    fn test_received_power_at_range() {
        // Same antennas at 10 km: 42 dBm EIRP+gain minus FSPL(10, 2400)
        let p = received_power_dbm(1.0, 6.0, 6.0, 2400.0, 10.0);
        let expected = 42.0 - free_space_path_loss_db(10.0, 2400.0);
        assert!((p - expected).abs() < 1e-9);
        assert!((p - -78.04).abs() < 0.01, "got {}", p);
    }
}
