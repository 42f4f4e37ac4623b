//! Additive dB loss components for the realistic model.
//!
//! Every component is non-decreasing in distance, which is what lets the
//! max-range solver bisect the total loss. Frequency breakpoints follow
//! planning-grade tables, not authoritative ITU-R curves.

use crate::core::free_space_path_loss_db;
use crate::region::Region;
use crate::weather::Weather;

/// Vegetation specific attenuation in dB/km by frequency band.
fn vegetation_alpha_db_per_km(freq_mhz: f64) -> f64 {
    if freq_mhz < 200.0 {
        0.5
    } else if freq_mhz < 1_000.0 {
        1.5
    } else if freq_mhz < 5_000.0 {
        3.0
    } else if freq_mhz < 10_000.0 {
        5.0
    } else {
        8.0
    }
}

/// Rain specific attenuation in dB/km per mm/h by frequency band.
fn rain_k_db_per_km(freq_mhz: f64) -> f64 {
    if freq_mhz < 1_000.0 {
        0.01
    } else if freq_mhz < 5_000.0 {
        0.03
    } else if freq_mhz < 10_000.0 {
        0.05
    } else if freq_mhz < 30_000.0 {
        0.15
    } else {
        0.3
    }
}

/// Fog frequency scaling.
fn fog_freq_factor(freq_mhz: f64) -> f64 {
    if freq_mhz > 10_000.0 {
        2.0
    } else if freq_mhz > 3_000.0 {
        1.0
    } else {
        0.3
    }
}

/// Humidity absorption coefficient by frequency band.
fn humidity_k(freq_mhz: f64) -> f64 {
    if freq_mhz < 2_000.0 {
        0.01
    } else if freq_mhz < 10_000.0 {
        0.03
    } else if freq_mhz < 30_000.0 {
        0.08
    } else {
        0.15
    }
}

/// Dust frequency scaling.
fn dust_freq_factor(freq_mhz: f64) -> f64 {
    if freq_mhz > 10_000.0 {
        1.5
    } else if freq_mhz > 3_000.0 {
        1.0
    } else {
        0.5
    }
}

/// Environment losses in dB: excess path loss over free space, vegetation,
/// urban clutter and terrain diffraction, plus the region's flat clutter
/// attenuation.
pub fn environment_loss_db(region: &Region, freq_mhz: f64, distance_km: f64) -> f64 {
    let n = region.path_loss_exponent;

    // Excess over the free-space exponent; clamped so short links never
    // go below free space.
    let excess = (10.0 * (n - 2.0) * distance_km.max(0.01).log10()).max(0.0);

    let vegetation = region.vegetation_factor
        * vegetation_alpha_db_per_km(freq_mhz)
        * distance_km.min(10.0);

    // Distance-independent clutter around the antennas.
    let urban = if region.urban_density < 0.05 {
        0.0
    } else {
        let freq_scale = (1.0 + 0.5 * (freq_mhz.max(100.0) / 100.0).log10()).min(2.5);
        region.urban_density * 15.0 * freq_scale
    };

    let terrain = if region.terrain_variation < 0.05 {
        0.0
    } else {
        region.terrain_variation * 6.0 * distance_km.max(0.1).sqrt()
    };

    region.base_attenuation_db + excess + vegetation + urban + terrain
}

/// Atmospheric losses in dB: rain, fog, humidity and dust.
pub fn atmospheric_loss_db(
    region: &Region,
    weather: &Weather,
    freq_mhz: f64,
    distance_km: f64,
) -> f64 {
    // Rain over an effective path length that saturates on long links
    let effective_km = distance_km / (1.0 + distance_km / 35.0);
    let rain = rain_k_db_per_km(freq_mhz) * weather.rain_mm_h * effective_km;

    let fog = if weather.visibility_m >= 10_000.0 {
        0.0
    } else {
        let vis_km = weather.visibility_m / 1000.0;
        fog_freq_factor(freq_mhz) * (1.0 - vis_km / 10.0) * distance_km.min(20.0)
    };

    let humidity = if weather.humidity_pct <= 50.0 {
        0.0
    } else {
        (weather.humidity_pct - 50.0) / 100.0 * humidity_k(freq_mhz) * distance_km * 10.0
    };

    let dust = if region.dust_probability >= 0.1 && weather.visibility_m < 8_000.0 {
        region.dust_probability
            * dust_freq_factor(freq_mhz)
            * ((8_000.0 - weather.visibility_m) / 8_000.0)
            * distance_km.min(15.0)
    } else {
        0.0
    };

    rain + fog + humidity + dust
}

/// Total path loss: free space plus environment plus atmosphere.
///
/// Monotone non-decreasing in distance, which the max-range solver relies
/// on.
pub fn total_path_loss_db(
    region: &Region,
    weather: &Weather,
    freq_mhz: f64,
    distance_km: f64,
) -> f64 {
    free_space_path_loss_db(distance_km, freq_mhz)
        + environment_loss_db(region, freq_mhz, distance_km)
        + atmospheric_loss_db(region, weather, freq_mhz, distance_km)
}
