//! METAR ingestion: decoding, windowing and the observation source seam

use crate::Result;
use crate::models::RawReport;

pub mod cached;
pub mod client;
pub mod remarks;
pub mod window;

pub use cached::CachedSource;
pub use client::MetarClient;
pub use window::WindowDefinition;

/// Anything that can supply recent reports for one station.
// Sources are only driven from the caller's own task, so the futures need no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait ObservationSource {
    /// Reports for `station` covering the last `hours` hours, in any order.
    ///
    /// A failure here means the station is unavailable for this cycle only.
    async fn fetch_reports(&self, station: &str, hours: u32) -> Result<Vec<RawReport>>;
}

impl<S: ObservationSource> ObservationSource for &S {
    async fn fetch_reports(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        (**self).fetch_reports(station, hours).await
    }
}
