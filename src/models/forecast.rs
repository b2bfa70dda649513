//! Forecast model inputs and results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind at the 2000 ft level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct WindObservation {
    /// Direction the wind blows from, degrees
    pub direction_deg: f64,
    /// Speed in knots
    pub speed_kt: f64,
}

/// Single selected synoptic trigger. At most one applies per forecast.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynopticTrigger {
    DeepeningTrough,
    ShortwaveTrough,
    LongwaveTrough,
    ShallowFront,
}

impl fmt::Display for SynopticTrigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SynopticTrigger::DeepeningTrough => "deepening trough",
            SynopticTrigger::ShortwaveTrough => "shortwave trough",
            SynopticTrigger::LongwaveTrough => "long-wave trough",
            SynopticTrigger::ShallowFront => "shallow front",
        };
        write!(f, "{name}")
    }
}

/// Independently toggleable synoptic patterns
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynopticPattern {
    ThermalLow,
    SurfaceHigh,
    UpperRidge,
    UpperTrough,
    CutoffLow,
}

impl fmt::Display for SynopticPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SynopticPattern::ThermalLow => "thermal low",
            SynopticPattern::SurfaceHigh => "surface high",
            SynopticPattern::UpperRidge => "upper ridge",
            SynopticPattern::UpperTrough => "upper trough",
            SynopticPattern::CutoffLow => "cutoff low",
        };
        write!(f, "{name}")
    }
}

/// Set of active synoptic patterns
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynopticPatterns {
    pub thermal_low: bool,
    pub surface_high: bool,
    pub upper_ridge: bool,
    pub upper_trough: bool,
    pub cutoff_low: bool,
}

impl SynopticPatterns {
    #[must_use]
    pub fn with(mut self, pattern: SynopticPattern) -> Self {
        match pattern {
            SynopticPattern::ThermalLow => self.thermal_low = true,
            SynopticPattern::SurfaceHigh => self.surface_high = true,
            SynopticPattern::UpperRidge => self.upper_ridge = true,
            SynopticPattern::UpperTrough => self.upper_trough = true,
            SynopticPattern::CutoffLow => self.cutoff_low = true,
        }
        self
    }

    #[must_use]
    pub fn is_active(&self, pattern: SynopticPattern) -> bool {
        match pattern {
            SynopticPattern::ThermalLow => self.thermal_low,
            SynopticPattern::SurfaceHigh => self.surface_high,
            SynopticPattern::UpperRidge => self.upper_ridge,
            SynopticPattern::UpperTrough => self.upper_trough,
            SynopticPattern::CutoffLow => self.cutoff_low,
        }
    }
}

impl FromIterator<SynopticPattern> for SynopticPatterns {
    fn from_iter<I: IntoIterator<Item = SynopticPattern>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), Self::with)
    }
}

/// Everything the forecast model consumes.
///
/// Automated values come from the aggregator; the rest are entered by the forecaster.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastInputs {
    /// Afternoon maximum temperature, °F
    pub max_temp_f: f64,
    /// Afternoon maximum dewpoint, °F
    pub max_dewpoint_f: f64,
    /// Bay minus inland pressure, mb
    pub onshore_gradient_mb: f64,
    /// Upwind coastal minus bay pressure, mb
    pub offshore_gradient_mb: f64,
    pub onshore_trend_mb: Option<f64>,
    pub offshore_trend_mb: Option<f64>,
    /// Base of the marine inversion, ft
    pub inversion_base_ft: f64,
    /// Stratus cloud base, ft
    pub cloud_base_ft: f64,
    pub wind_2000ft: WindObservation,
    /// Minimum afternoon dewpoint, °F
    pub min_afternoon_dewpoint_f: f64,
    /// Calendar month, 1-12
    pub month: u32,
    pub trigger: Option<SynopticTrigger>,
    pub patterns: SynopticPatterns,
    /// Notes about automated fetch steps that failed before the model ran
    pub data_caveats: Vec<String>,
}

impl ForecastInputs {
    /// Stratus index, `max_temp_f - max_dewpoint_f`
    #[must_use]
    pub fn stratus_index(&self) -> f64 {
        self.max_temp_f - self.max_dewpoint_f
    }
}

impl Default for ForecastInputs {
    fn default() -> Self {
        Self {
            max_temp_f: 75.0,
            max_dewpoint_f: 58.0,
            onshore_gradient_mb: 3.0,
            offshore_gradient_mb: -3.0,
            onshore_trend_mb: None,
            offshore_trend_mb: None,
            inversion_base_ft: 1500.0,
            cloud_base_ft: 800.0,
            wind_2000ft: WindObservation {
                direction_deg: 180.0,
                speed_kt: 5.0,
            },
            min_afternoon_dewpoint_f: 55.0,
            month: 7,
            trigger: None,
            patterns: SynopticPatterns::default(),
            data_caveats: Vec::new(),
        }
    }
}

/// Forecast confidence levels
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "Low"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::High => write!(f, "High"),
        }
    }
}

/// A window of UTC hours-of-day, normalised into `[0, 24)`
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub earliest: f64,
    pub latest: f64,
    pub most_probable: f64,
}

impl TimeWindow {
    /// Format an hour-of-day such as `9.5` as `"0930Z"`.
    #[must_use]
    pub fn format_hour(hour: f64) -> String {
        let total_minutes = (hour * 60.0).round() as i64;
        let total_minutes = total_minutes.rem_euclid(24 * 60);
        format!("{:02}{:02}Z", total_minutes / 60, total_minutes % 60)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (window {} - {})",
            Self::format_hour(self.most_probable),
            Self::format_hour(self.earliest),
            Self::format_hour(self.latest)
        )
    }
}

/// Result of one forecast model evaluation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastResult {
    /// Stratus index the timing row was selected with
    pub stratus_index: f64,
    /// Probability before any adjustment, percent
    pub base_probability_pct: f64,
    /// `None` when the model exited early with a no-event result
    pub onset_window: Option<TimeWindow>,
    pub end_window: Option<TimeWindow>,
    /// Hours after sunrise until the deck burns off
    pub burn_off_hours: f64,
    /// Final probability, percent
    pub probability_pct: f64,
    pub confidence: Confidence,
    /// Ordered, human-readable warnings
    pub warnings: Vec<String>,
    /// One description per active synoptic pattern
    pub pattern_effects: Vec<String>,
    /// Summary of how the probability was reached
    pub reasoning: String,
}
