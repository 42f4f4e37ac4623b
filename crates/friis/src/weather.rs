//! Live weather observations consumed by the atmospheric model.

use serde::{Deserialize, Serialize};

/// A weather observation at a point, as delivered by an external weather
/// provider. Only the precipitation, humidity and visibility fields feed
/// the loss model; the remainder ride along for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Air temperature, degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
    /// Wind speed, metres per second.
    pub wind_speed_ms: f64,
    /// Rain rate, millimetres per hour.
    pub rain_mm_h: f64,
    /// Meteorological visibility, metres.
    pub visibility_m: f64,
    /// Free-text conditions description from the provider.
    #[serde(default)]
    pub description: String,
}

impl Weather {
    /// Clear-sky defaults: no rain, 10 km visibility, moderate humidity.
    pub fn clear() -> Self {
        Self {
            temperature_c: 20.0,
            humidity_pct: 50.0,
            wind_speed_ms: 2.0,
            rain_mm_h: 0.0,
            visibility_m: 10_000.0,
            description: String::new(),
        }
    }

    /// Builder-style override for the rain rate.
    pub fn with_rain(mut self, mm_h: f64) -> Self {
        self.rain_mm_h = mm_h;
        self
    }

    /// Builder-style override for visibility.
    pub fn with_visibility(mut self, metres: f64) -> Self {
        self.visibility_m = metres;
        self
    }

    /// Builder-style override for humidity.
    pub fn with_humidity(mut self, pct: f64) -> Self {
        self.humidity_pct = pct;
        self
    }
}

impl Default for Weather {
    fn default() -> Self {
        Self::clear()
    }
}
