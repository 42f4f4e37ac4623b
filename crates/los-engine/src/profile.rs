//! Point-to-point line-of-sight kernel.
//!
//! Samples terrain along the great-circle segment between two antennas
//! and tests the straight sight-line between their absolute heights for
//! optical and first-Fresnel-zone clearance. Earth curvature is not added
//! to the sight-line; at planning ranges the error stays inside the
//! resolution of the surface model.

use dsm_store::DsmRegistry;
use geodesy::{destination_point, great_circle_distance, initial_bearing};
use rf_common::{CellState, GeoPoint};

/// Fewest samples along a ray, regardless of length.
const MIN_SAMPLES: usize = 32;
/// Most samples along a ray.
const MAX_SAMPLES: usize = 1024;
/// Fraction of the first Fresnel radius that must stay clear.
const FRESNEL_CLEARANCE: f64 = 0.6;

/// One sample along an evaluated path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSample {
    /// Distance from the origin, metres.
    pub distance_m: f64,
    /// Terrain elevation, metres.
    pub terrain_m: f64,
    /// Sight-line elevation, metres.
    pub line_m: f64,
    /// Sight-line height above terrain, metres (negative when blocked).
    pub clearance_m: f64,
    /// First Fresnel zone radius, metres (zero without a frequency).
    pub fresnel_radius_m: f64,
}

/// Clearance verdict for a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LosOutcome {
    /// Terrain data was missing somewhere along the ray.
    NoData,
    /// Every sample had terrain data.
    Evaluated {
        /// Sight-line never dips below terrain.
        optical_clear: bool,
        /// 60 % of the first Fresnel zone stays clear; `None` when no
        /// frequency was given.
        fresnel_clear: Option<bool>,
        /// Smallest clearance along the ray, metres.
        min_clearance_m: f64,
    },
}

/// Result of evaluating one path.
#[derive(Debug, Clone)]
pub struct PathEvaluation {
    pub outcome: LosOutcome,
    /// Initial bearing origin -> target, degrees from true north.
    pub bearing_deg: f64,
    /// Great-circle distance, metres.
    pub distance_m: f64,
    /// Per-sample profile, when requested.
    pub profile: Option<Vec<ProfileSample>>,
}

impl PathEvaluation {
    /// Fold the verdict into the raster cell state. Fresnel mode decides
    /// by Fresnel clearance, optical mode by optical clearance.
    pub fn cell_state(&self) -> CellState {
        match self.outcome {
            LosOutcome::NoData => CellState::NoData,
            LosOutcome::Evaluated {
                optical_clear,
                fresnel_clear,
                ..
            } => {
                let clear = fresnel_clear.unwrap_or(optical_clear);
                if clear {
                    CellState::Clear
                } else {
                    CellState::Blocked
                }
            }
        }
    }
}

/// Evaluate the line of sight between two antennas over the registered
/// terrain.
///
/// `sample_step_m` sets the target spacing between terrain samples; the
/// actual count is clamped to `[32, 1024]`. A missing terrain sample
/// anywhere on the ray makes the whole ray no-data.
pub fn evaluate_path(
    registry: &DsmRegistry,
    origin: GeoPoint,
    target: GeoPoint,
    freq_mhz: Option<f64>,
    sample_step_m: f64,
    want_profile: bool,
) -> PathEvaluation {
    let distance_m = great_circle_distance(origin.lat, origin.lon, target.lat, target.lon);
    let bearing_deg = initial_bearing(origin.lat, origin.lon, target.lat, target.lon);

    let samples = ((distance_m / sample_step_m.max(1.0)).ceil() as usize)
        .clamp(MIN_SAMPLES, MAX_SAMPLES);

    // One registry snapshot per ray; samples then read the immutable
    // layers lock-free
    let layers = registry.layers();

    // Terrain pass: any hole fails the whole ray
    let mut terrain = Vec::with_capacity(samples + 1);
    for i in 0..=samples {
        let d = distance_m * i as f64 / samples as f64;
        let (lat, lon) = destination_point(origin.lat, origin.lon, bearing_deg, d);
        match layers.iter().find_map(|layer| layer.sample(lat, lon)) {
            Some(z) => terrain.push((d, z)),
            None => {
                return PathEvaluation {
                    outcome: LosOutcome::NoData,
                    bearing_deg,
                    distance_m,
                    profile: None,
                }
            }
        }
    }

    let line_start = terrain[0].1 + origin.height_agl();
    let line_end = terrain[samples].1 + target.height_agl();

    let d_km = distance_m / 1000.0;
    let f_ghz = freq_mhz.map(|f| f / 1000.0);

    let mut min_clearance = f64::INFINITY;
    let mut fresnel_ok = true;
    let mut profile = want_profile.then(|| Vec::with_capacity(samples + 1));

    for (i, &(d, z)) in terrain.iter().enumerate() {
        let t = i as f64 / samples as f64;
        let line = line_start + (line_end - line_start) * t;
        let clearance = line - z;
        min_clearance = min_clearance.min(clearance);

        let fresnel_radius = match f_ghz {
            Some(f_ghz) if d_km > 0.0 => {
                let d1 = d / 1000.0;
                let d2 = d_km - d1;
                if d1 > 0.0 && d2 > 0.0 {
                    17.3 * ((d1 * d2) / (f_ghz * d_km)).sqrt()
                } else {
                    0.0
                }
            }
            _ => 0.0,
        };
        if clearance < FRESNEL_CLEARANCE * fresnel_radius {
            fresnel_ok = false;
        }

        if let Some(profile) = profile.as_mut() {
            profile.push(ProfileSample {
                distance_m: d,
                terrain_m: z,
                line_m: line,
                clearance_m: clearance,
                fresnel_radius_m: fresnel_radius,
            });
        }
    }

    PathEvaluation {
        outcome: LosOutcome::Evaluated {
            optical_clear: min_clearance >= 0.0,
            fresnel_clear: freq_mhz.map(|_| fresnel_ok && min_clearance >= 0.0),
            min_clearance_m: min_clearance,
        },
        bearing_deg,
        distance_m,
        profile,
    }
}
