//! Planning recommendations derived from the environment and weather.

use crate::region::Region;
use crate::weather::Weather;
use serde::{Deserialize, Serialize};

/// An opaque recommendation key. Translation to user-facing text is the
/// UI layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Heavy rain is eating into the link budget.
    Rain,
    /// Fog is degrading the link.
    Fog,
    /// Dense build-up; raising the antennas clears local clutter.
    ElevateAntennas,
    /// Heavy vegetation at a high frequency; a lower band penetrates better.
    LowerFrequency,
    /// Dust conditions are likely to attenuate the link.
    Dust,
    /// Rough terrain; expect diffraction losses.
    Terrain,
    /// Overall reduction is large; plan extra margin.
    AddMargin,
}

/// Evaluate the recommendation rules for a region, weather and operating
/// frequency. `reduction` is the fractional range loss against free space
/// as computed by `range_reduction`.
pub fn recommendations(
    region: &Region,
    weather: &Weather,
    freq_mhz: f64,
    reduction: f64,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if weather.rain_mm_h > 2.0 {
        out.push(Recommendation::Rain);
    }
    if weather.visibility_m < 3_000.0 {
        out.push(Recommendation::Fog);
    }
    if region.urban_density > 0.5 {
        out.push(Recommendation::ElevateAntennas);
    }
    if region.vegetation_factor > 0.4 && freq_mhz > 2_000.0 {
        out.push(Recommendation::LowerFrequency);
    }
    if region.dust_probability > 0.3 && weather.visibility_m < 8_000.0 {
        out.push(Recommendation::Dust);
    }
    if region.terrain_variation > 0.6 {
        out.push(Recommendation::Terrain);
    }
    if reduction > 0.3 {
        out.push(Recommendation::AddMargin);
    }

    out
}
