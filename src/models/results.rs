//! Aggregated results produced once per refresh cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Afternoon temperature and dewpoint maxima for the temperature station
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TemperatureWindowResult {
    /// Highest temperature in the window, `None` when nothing qualified
    pub max_temp_f: Option<f64>,
    /// Highest dewpoint in the window, `None` when nothing qualified
    pub max_dewpoint_f: Option<f64>,
    /// Where the values came from, e.g. `"KSFO 20-23Z hourly (3 reports)"`
    pub data_source: String,
    /// When the result was computed
    pub timestamp: DateTime<Utc>,
}

impl TemperatureWindowResult {
    /// Stratus index (temperature minus dewpoint), if both maxima are known.
    #[must_use]
    pub fn stratus_index(&self) -> Option<f64> {
        Some(self.max_temp_f? - self.max_dewpoint_f?)
    }
}

/// Pressure gradients between the coastal, bay and inland stations
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PressureGradientResult {
    /// Upwind coastal minus bay, mb
    pub offshore_gradient_mb: f64,
    /// Bay minus inland, mb
    pub onshore_gradient_mb: f64,
    /// Change in offshore gradient over 24 hours
    pub offshore_24h_trend_mb: Option<f64>,
    /// Change in onshore gradient over 24 hours
    pub onshore_24h_trend_mb: Option<f64>,
    pub timestamp: DateTime<Utc>,
}
