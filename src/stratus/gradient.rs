//! Offshore and onshore pressure gradients and their 24 hour trends

use crate::models::{PressureGradientResult, StationSample};
use crate::units::round_to;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One value per gradient station role
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct StationTriple<T> {
    /// Upwind coastal station
    pub upwind: T,
    /// Bay station
    pub bay: T,
    /// Inland station
    pub inland: T,
}

impl<T> StationTriple<T> {
    pub fn new(upwind: T, bay: T, inland: T) -> Self {
        Self { upwind, bay, inland }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> StationTriple<U> {
        StationTriple::new(f(self.upwind), f(self.bay), f(self.inland))
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        [&self.upwind, &self.bay, &self.inland].into_iter()
    }
}

/// Upwind coastal minus bay pressure, 0.1 mb.
#[must_use]
pub fn offshore(upwind_mb: f64, bay_mb: f64) -> f64 {
    round_to(upwind_mb - bay_mb, 1)
}

/// Bay minus inland pressure, 0.1 mb.
#[must_use]
pub fn onshore(bay_mb: f64, inland_mb: f64) -> f64 {
    round_to(bay_mb - inland_mb, 1)
}

/// `(offshore, onshore)` when all three samples are present.
#[must_use]
pub fn gradients(samples: &StationTriple<Option<StationSample>>) -> Option<(f64, f64)> {
    let upwind = samples.upwind.as_ref()?.pressure_mb;
    let bay = samples.bay.as_ref()?.pressure_mb;
    let inland = samples.inland.as_ref()?.pressure_mb;
    Some((offshore(upwind, bay), onshore(bay, inland)))
}

/// Combine current and 24 hour old samples.
///
/// `None` when any current sample is missing; trends are `None` unless all six exist.
#[must_use]
pub fn compute(
    current: &StationTriple<Option<StationSample>>,
    past: &StationTriple<Option<StationSample>>,
    timestamp: DateTime<Utc>,
) -> Option<PressureGradientResult> {
    let (offshore_now, onshore_now) = gradients(current)?;
    let past = gradients(past);

    Some(PressureGradientResult {
        offshore_gradient_mb: offshore_now,
        onshore_gradient_mb: onshore_now,
        offshore_24h_trend_mb: past.map(|(offshore_then, _)| round_to(offshore_now - offshore_then, 1)),
        onshore_24h_trend_mb: past.map(|(_, onshore_then)| round_to(onshore_now - onshore_then, 1)),
        timestamp,
    })
}
