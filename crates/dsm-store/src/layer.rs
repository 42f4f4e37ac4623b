//! The uniform elevation-layer shape every parser produces.

use crate::{DsmError, DsmResult};
use chrono::{DateTime, Utc};
use geodesy::TransverseMercator;
use rf_common::{Crs, GeoBounds, ProjectedBounds};
use std::sync::OnceLock;
use uuid::Uuid;

fn itm() -> &'static TransverseMercator {
    static ITM: OnceLock<TransverseMercator> = OnceLock::new();
    ITM.get_or_init(TransverseMercator::itm)
}

/// Native-grid description for layers whose source raster is projected.
///
/// Pixel lookups on such layers run against these axes; the WGS84 bounds
/// on the layer are only the coverage gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeGrid {
    pub crs: Crs,
    pub bounds: ProjectedBounds,
}

/// An immutable snapshot of one ingested elevation raster.
#[derive(Debug, Clone)]
pub struct DsmLayer {
    pub id: Uuid,
    /// Display name, usually the uploaded file name.
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Pixel width.
    pub width: usize,
    /// Pixel height.
    pub height: usize,
    /// Row-major elevation samples, metres, north row first.
    pub data: Vec<f32>,
    /// Sentinel marking missing samples.
    pub no_data: f32,
    /// Lowest valid elevation observed.
    pub min_elevation: f32,
    /// Highest valid elevation observed.
    pub max_elevation: f32,
    /// Coverage in WGS84 degrees.
    pub bounds: GeoBounds,
    /// Present when the source raster is in a projected grid.
    pub native: Option<NativeGrid>,
}

impl DsmLayer {
    /// Build a layer from parsed raster content, computing the observed
    /// elevation range (sentinel and non-finite samples excluded).
    pub fn new(
        name: impl Into<String>,
        width: usize,
        height: usize,
        data: Vec<f32>,
        no_data: f32,
        bounds: GeoBounds,
        native: Option<NativeGrid>,
    ) -> DsmResult<Self> {
        if width == 0 || height == 0 {
            return Err(DsmError::bad_format("layer", "zero-sized raster"));
        }
        if data.len() != width * height {
            return Err(DsmError::Truncated {
                expected: width * height,
                actual: data.len(),
            });
        }
        if !bounds.is_valid() {
            return Err(DsmError::UnknownCrs(format!(
                "degenerate bounds {:?}",
                bounds
            )));
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in &data {
            if v != no_data && v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            width,
            height,
            data,
            no_data,
            min_elevation: min,
            max_elevation: max,
            bounds,
            native,
        })
    }

    /// Whether any valid sample exists.
    pub fn has_valid_samples(&self) -> bool {
        self.min_elevation.is_finite()
    }

    /// Sample the elevation at a WGS84 point.
    ///
    /// Returns `None` when the point is outside the layer, or when the
    /// nearest sample is the no-data sentinel or non-finite. Nearest
    /// neighbour is the contract; no interpolation.
    pub fn sample(&self, lat: f64, lon: f64) -> Option<f64> {
        if !self.bounds.contains(lat, lon) {
            return None;
        }

        // Projected layers index against their native axes
        let (x_axis, y_axis, w, s, e, n) = match &self.native {
            Some(native) => {
                let (x, y) = match native.crs {
                    Crs::Itm => itm().forward(lat, lon),
                    Crs::Ics => {
                        let (e, n) = itm().forward(lat, lon);
                        (
                            e + geodesy::itm::ICS_EASTING_SHIFT,
                            n + geodesy::itm::ICS_NORTHING_SHIFT,
                        )
                    }
                    Crs::Wgs84 => (lon, lat),
                };
                let b = native.bounds;
                (x, y, b.west, b.south, b.east, b.north)
            }
            None => (
                lon,
                lat,
                self.bounds.west,
                self.bounds.south,
                self.bounds.east,
                self.bounds.north,
            ),
        };

        let px = ((x_axis - w) / (e - w) * self.width as f64).floor();
        let py = ((n - y_axis) / (n - s) * self.height as f64).floor();

        let px = (px as isize).clamp(0, self.width as isize - 1) as usize;
        let py = (py as isize).clamp(0, self.height as isize - 1) as usize;

        let v = self.data[py * self.width + px];
        if v == self.no_data || !v.is_finite() {
            None
        } else {
            Some(v as f64)
        }
    }
}
