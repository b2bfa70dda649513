//! Data models for the stratus forecaster
//!
//! This module contains the plain data passed between stages, organized by concern:
//! - Observation: raw station reports and values decoded or sampled from them
//! - Results: aggregated temperature and pressure-gradient results per refresh
//! - Forecast: model inputs and the forecast it produces

pub mod forecast;
pub mod observation;
pub mod results;

// Re-export all public types for convenient access
pub use forecast::{
    Confidence, ForecastInputs, ForecastResult, SynopticPattern, SynopticPatterns,
    SynopticTrigger, TimeWindow, WindObservation,
};
pub use observation::{DecodedRemarks, RawReport, StationSample, WindowedObservation};
pub use results::{PressureGradientResult, TemperatureWindowResult};
