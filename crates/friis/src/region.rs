//! Propagation environment descriptions.

use serde::{Deserialize, Serialize};

/// A propagation environment for the realistic model.
///
/// The fields feed the additive environment losses: the path-loss exponent
/// drives the excess over free space, the density/factor fields scale the
/// clutter terms, and the dust/humidity climatology feeds the atmospheric
/// model alongside live weather.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Stable identifier, also the translation key for UI layers.
    pub key: String,
    /// Path-loss exponent n (2.0 = free space).
    pub path_loss_exponent: f64,
    /// Flat clutter attenuation for the environment, dB.
    pub base_attenuation_db: f64,
    /// Vegetation cover factor in `[0, 1]`.
    pub vegetation_factor: f64,
    /// Urban build-up density in `[0, 1]`.
    pub urban_density: f64,
    /// Terrain roughness in `[0, 1]`.
    pub terrain_variation: f64,
    /// Climatological probability of dust events in `[0, 1]`.
    pub dust_probability: f64,
    /// Average relative humidity, percent.
    pub avg_humidity: f64,
}

impl Region {
    /// Ideal free-space environment; the realistic model degenerates to
    /// plain Friis under it (modulo weather).
    pub fn free_space() -> Self {
        Self {
            key: "free_space".into(),
            path_loss_exponent: 2.0,
            base_attenuation_db: 0.0,
            vegetation_factor: 0.0,
            urban_density: 0.0,
            terrain_variation: 0.0,
            dust_probability: 0.0,
            avg_humidity: 50.0,
        }
    }

    /// The densely built central coastal plain.
    pub fn central_coastal_plain() -> Self {
        Self {
            key: "central_coastal_plain".into(),
            path_loss_exponent: 3.8,
            base_attenuation_db: 12.0,
            vegetation_factor: 0.3,
            urban_density: 0.9,
            terrain_variation: 0.2,
            dust_probability: 0.1,
            avg_humidity: 70.0,
        }
    }

    /// Sparse desert in the south: near-free-space propagation with a high
    /// dust climatology.
    pub fn negev_desert() -> Self {
        Self {
            key: "negev_desert".into(),
            path_loss_exponent: 2.3,
            base_attenuation_db: 3.0,
            vegetation_factor: 0.05,
            urban_density: 0.05,
            terrain_variation: 0.3,
            dust_probability: 0.5,
            avg_humidity: 30.0,
        }
    }

    /// Rocky highland terrain with moderate build-up.
    pub fn judean_hills() -> Self {
        Self {
            key: "judean_hills".into(),
            path_loss_exponent: 3.2,
            base_attenuation_db: 8.0,
            vegetation_factor: 0.35,
            urban_density: 0.5,
            terrain_variation: 0.7,
            dust_probability: 0.15,
            avg_humidity: 55.0,
        }
    }

    /// Wooded northern highlands.
    pub fn galilee_highlands() -> Self {
        Self {
            key: "galilee_highlands".into(),
            path_loss_exponent: 3.0,
            base_attenuation_db: 6.0,
            vegetation_factor: 0.6,
            urban_density: 0.2,
            terrain_variation: 0.8,
            dust_probability: 0.1,
            avg_humidity: 65.0,
        }
    }

    /// All named presets, for configuration UIs.
    pub fn presets() -> Vec<Region> {
        vec![
            Region::free_space(),
            Region::central_coastal_plain(),
            Region::negev_desert(),
            Region::judean_hills(),
            Region::galilee_highlands(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_have_unique_keys() {
        let presets = Region::presets();
        for (i, a) in presets.iter().enumerate() {
            for b in &presets[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_factors_in_range() {
        for r in Region::presets() {
            assert!(r.path_loss_exponent >= 2.0);
            assert!((0.0..=1.0).contains(&r.vegetation_factor));
            assert!((0.0..=1.0).contains(&r.urban_density));
            assert!((0.0..=1.0).contains(&r.terrain_variation));
            assert!((0.0..=1.0).contains(&r.dust_probability));
        }
    }

    #[test]
    fn test_serde_roundtrip() {
        let r = Region::central_coastal_plain();
        let json = serde_json::to_string(&r).unwrap();
        let back: Region = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
