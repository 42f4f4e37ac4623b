//! Synthetic terrain generators.
//!
//! Each builder produces a predictable, verifiable elevation pattern:
//! assertions in consuming tests can compute the expected value for any
//! coordinate without reading files from disk.

use dsm_store::{DsmLayer, DsmRegistry};
use rf_common::GeoBounds;

/// A one-degree test area over the central part of the country.
pub const AREA_CENTRAL: GeoBounds = GeoBounds {
    west: 34.5,
    south: 31.5,
    east: 35.5,
    north: 32.5,
};

const NO_DATA: f32 = -9999.0;

/// A layer of constant elevation over the given bounds.
pub fn constant_layer(name: &str, bounds: GeoBounds, elevation: f32, side: usize) -> DsmLayer {
    DsmLayer::new(
        name,
        side,
        side,
        vec![elevation; side * side],
        NO_DATA,
        bounds,
        None,
    )
    .expect("constant layer")
}

/// A flat plain with a north-south ridge wall through the middle third of
/// the longitude span.
///
/// Any east-west path across the layer centre crosses the ridge; paths
/// hugging the west or east edge stay on the plain.
pub fn ridge_layer(
    name: &str,
    bounds: GeoBounds,
    plain_elevation: f32,
    ridge_elevation: f32,
    side: usize,
) -> DsmLayer {
    let mut data = vec![plain_elevation; side * side];
    let ridge_start = side / 3;
    let ridge_end = 2 * side / 3;
    for row in data.chunks_exact_mut(side) {
        for x in ridge_start..ridge_end {
            row[x] = ridge_elevation;
        }
    }
    DsmLayer::new(name, side, side, data, NO_DATA, bounds, None).expect("ridge layer")
}

/// A west-to-east linear gradient from `low` to `high` metres.
pub fn gradient_layer(
    name: &str,
    bounds: GeoBounds,
    low: f32,
    high: f32,
    side: usize,
) -> DsmLayer {
    let mut data = Vec::with_capacity(side * side);
    for _y in 0..side {
        for x in 0..side {
            let t = x as f32 / (side - 1) as f32;
            data.push(low + (high - low) * t);
        }
    }
    DsmLayer::new(name, side, side, data, NO_DATA, bounds, None).expect("gradient layer")
}

/// A constant plain with a square no-data hole in the middle third of
/// both axes.
pub fn holed_layer(name: &str, bounds: GeoBounds, elevation: f32, side: usize) -> DsmLayer {
    let mut data = vec![elevation; side * side];
    let start = side / 3;
    let end = 2 * side / 3;
    for y in start..end {
        for x in start..end {
            data[y * side + x] = NO_DATA;
        }
    }
    DsmLayer::new(name, side, side, data, NO_DATA, bounds, None).expect("holed layer")
}

/// A registry preloaded with the given layers, in order.
pub fn registry_with(layers: Vec<DsmLayer>) -> DsmRegistry {
    let registry = DsmRegistry::new();
    for layer in layers {
        registry.add(layer);
    }
    registry
}
