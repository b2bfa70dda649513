//! Cache-through decorator for observation sources

use crate::Result;
use crate::cache::PersistentCache;
use crate::metar::ObservationSource;
use crate::models::RawReport;
use std::time::Duration;
use tracing::{debug, warn};

/// Serves recent fetches from the persistent cache and fills it on a miss.
pub struct CachedSource<S> {
    inner: S,
    cache: PersistentCache,
    ttl: Duration,
}

impl<S: ObservationSource> CachedSource<S> {
    #[must_use]
    pub fn new(inner: S, cache: PersistentCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(station: &str, hours: u32) -> String {
        format!("metar:{station}:{hours}")
    }
}

impl<S: ObservationSource> ObservationSource for CachedSource<S> {
    async fn fetch_reports(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        let key = Self::key(station, hours);
        match self.cache.get::<Vec<RawReport>>(&key).await {
            Ok(Some(reports)) => {
                debug!(station, count = reports.len(), "Serving reports from cache");
                return Ok(reports);
            }
            Ok(None) => {}
            Err(e) => warn!(station, "Cache read failed, fetching directly: {e:#}"),
        }

        let reports = self.inner.fetch_reports(station, hours).await?;
        if let Err(e) = self.cache.put(&key, reports.clone(), self.ttl).await {
            warn!(station, "Failed to cache reports: {e:#}");
        }
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StratusError;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ObservationSource for CountingSource {
        async fn fetch_reports(&self, station: &str, _hours: u32) -> Result<Vec<RawReport>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StratusError::source_unavailable(station, "offline"));
            }
            let ts = Utc.with_ymd_and_hms(2025, 7, 1, 21, 56, 0).unwrap();
            Ok(vec![RawReport::new(station, ts, "KSFO 012156Z RMK AO2 SLP146")])
        }
    }

    #[tokio::test]
    async fn test_second_fetch_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let source = CachedSource::new(
            CountingSource { calls: AtomicUsize::new(0), fail: false },
            cache,
            Duration::from_secs(600),
        );

        let first = source.fetch_reports("KSFO", 30).await.unwrap();
        let second = source.fetch_reports("KSFO", 30).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let source = CachedSource::new(
            CountingSource { calls: AtomicUsize::new(0), fail: true },
            cache,
            Duration::from_secs(600),
        );

        assert!(source.fetch_reports("KSMF", 30).await.is_err());
        assert!(source.fetch_reports("KSMF", 30).await.is_err());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }
}
