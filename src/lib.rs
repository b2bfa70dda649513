//! `stratus-forecast` - Marine stratus forecasting for the San Francisco Bay
//!
//! This library fetches and decodes METAR reports, reduces them to the
//! afternoon temperature/dewpoint and coastal pressure gradients, and turns
//! those plus forecaster inputs into an overnight stratus forecast.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metar;
pub mod models;
pub mod refresh;
pub mod solar;
pub mod stratus;
pub mod telemetry;
pub mod units;

// Re-export core types for public API
pub use config::StratusConfig;
pub use error::StratusError;
pub use metar::{CachedSource, MetarClient, ObservationSource, WindowDefinition};
pub use models::{Confidence, ForecastInputs, ForecastResult, RawReport, TimeWindow};
pub use refresh::{ForecastBoard, ManualInputs, RefreshOutcome, RefreshService};
pub use solar::SolarTimeCalculator;
pub use stratus::forecast;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StratusError>;
