//! Station observation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One METAR report as delivered by the observation source
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawReport {
    /// ICAO station identifier
    pub station_id: String,
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Full report text including the remarks section
    pub raw_text: String,
    /// Primary temperature in Celsius, when the source provides it
    pub temperature_c: Option<f64>,
    /// Primary dewpoint in Celsius, when the source provides it
    pub dewpoint_c: Option<f64>,
}

impl RawReport {
    #[must_use]
    pub fn new(station_id: impl Into<String>, timestamp: DateTime<Utc>, raw_text: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            timestamp,
            raw_text: raw_text.into(),
            temperature_c: None,
            dewpoint_c: None,
        }
    }

    #[must_use]
    pub fn with_primary(mut self, temperature_c: Option<f64>, dewpoint_c: Option<f64>) -> Self {
        self.temperature_c = temperature_c;
        self.dewpoint_c = dewpoint_c;
        self
    }
}

/// Values decoded from the remarks section of one report.
///
/// `None` means the group was not present, never zero.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
pub struct DecodedRemarks {
    /// Temperature from the T group, whole degrees Fahrenheit
    pub max_temp_f: Option<f64>,
    /// Dewpoint from the T group, whole degrees Fahrenheit
    pub max_dewpoint_f: Option<f64>,
    /// Sea-level pressure in millibars
    pub sea_level_pressure_mb: Option<f64>,
    /// Altimeter setting converted to millibars
    pub altimeter_mb: Option<f64>,
}

impl DecodedRemarks {
    /// Sea-level pressure when reported, otherwise the altimeter setting.
    #[must_use]
    pub fn best_pressure_mb(&self) -> Option<f64> {
        self.sea_level_pressure_mb.or(self.altimeter_mb)
    }
}

/// A report annotated with its window classification
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct WindowedObservation<'a> {
    pub report: &'a RawReport,
    pub in_window: bool,
    pub is_hourly: bool,
}

/// Pressure reading nearest to a target instant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StationSample {
    pub station_id: String,
    pub pressure_mb: f64,
    pub timestamp: DateTime<Utc>,
}
