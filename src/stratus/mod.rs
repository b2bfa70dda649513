//! Stratus forecasting: station aggregation, gradients and the forecast model

pub mod aggregator;
pub mod gradient;
pub mod model;
pub mod patterns;
pub mod timing;

pub use aggregator::{PressureSnapshot, StationReports, WindowExtrema};
pub use gradient::StationTriple;
pub use model::forecast;
