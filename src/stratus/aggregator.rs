//! Multi-station fetch and reduction
//!
//! Stations are fetched concurrently and independently: one failing station
//! only removes its own samples. Reductions start from "no value" and are
//! only ever updated by observed values.

use crate::metar::window::{self, WindowDefinition};
use crate::metar::{ObservationSource, remarks};
use crate::models::{RawReport, StationSample, TemperatureWindowResult};
use crate::stratus::gradient::StationTriple;
use crate::units::celsius_to_fahrenheit_rounded;
use crate::{Result, StratusError};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Per-station fetch outcome, keyed by station id
pub type StationReports = BTreeMap<String, Result<Vec<RawReport>>>;

/// Fetch every distinct station concurrently. Failures are logged and kept per station.
pub async fn fetch_all<S: ObservationSource>(source: &S, stations: &[&str], hours: u32) -> StationReports {
    let mut distinct: Vec<&str> = Vec::with_capacity(stations.len());
    for station in stations {
        if !distinct.contains(station) {
            distinct.push(station);
        }
    }

    let results = futures::future::join_all(distinct.iter().map(async |station| {
        let result = source.fetch_reports(station, hours).await;
        if let Err(err) = &result {
            warn!("Fetch failed for station {}. Error {}", station, err);
        }
        (station.to_string(), result)
    }))
    .await;

    let failed = results.iter().filter(|(_, r)| r.is_err()).count();
    info!(stations = results.len(), failed, "Station fetch complete");
    results.into_iter().collect()
}

/// Larger of two optional values; `None` only when both are.
fn max_known(current: Option<f64>, candidate: Option<f64>) -> Option<f64> {
    match (current, candidate) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Temperature and dewpoint maxima over a set of reports
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowExtrema {
    pub max_temp_f: Option<f64>,
    pub max_dewpoint_f: Option<f64>,
    /// Reports that contributed at least one value
    pub contributing_reports: usize,
}

/// Reduce reports to temperature/dewpoint maxima, preferring the precise remarks group.
#[must_use]
pub fn window_extrema<'a, I>(reports: I) -> WindowExtrema
where
    I: IntoIterator<Item = &'a RawReport>,
{
    reports.into_iter().fold(WindowExtrema::default(), |acc, report| {
        let decoded = remarks::decode(&report.raw_text);
        let temp = decoded
            .max_temp_f
            .or_else(|| report.temperature_c.map(celsius_to_fahrenheit_rounded));
        let dewpoint = decoded
            .max_dewpoint_f
            .or_else(|| report.dewpoint_c.map(celsius_to_fahrenheit_rounded));

        WindowExtrema {
            max_temp_f: max_known(acc.max_temp_f, temp),
            max_dewpoint_f: max_known(acc.max_dewpoint_f, dewpoint),
            contributing_reports: acc.contributing_reports
                + usize::from(temp.is_some() || dewpoint.is_some()),
        }
    })
}

/// Build the temperature result for the latest window occurrence from already fetched reports.
#[must_use]
pub fn temperature_window_from_reports(
    station: &str,
    reports: &[RawReport],
    window: &WindowDefinition,
    hourly_only: bool,
    now: DateTime<Utc>,
) -> TemperatureWindowResult {
    let selected = window::select_latest(reports, window, hourly_only, now);
    let extrema = window_extrema(selected.iter().copied());
    debug!(
        station,
        selected = selected.len(),
        contributing = extrema.contributing_reports,
        "Reduced temperature window"
    );

    TemperatureWindowResult {
        max_temp_f: extrema.max_temp_f,
        max_dewpoint_f: extrema.max_dewpoint_f,
        data_source: format!(
            "{station} {:02}-{:02}Z {} ({} reports)",
            window.start_hour,
            window.end_hour,
            if hourly_only { "hourly" } else { "all" },
            extrema.contributing_reports
        ),
        timestamp: now,
    }
}

/// Single-station temperature contract: a fetch failure is an error, an empty window is not.
#[tracing::instrument(level = "debug", skip(source, window))]
pub async fn temperature_window<S: ObservationSource>(
    source: &S,
    station: &str,
    window: &WindowDefinition,
    hourly_only: bool,
    hours: u32,
    now: DateTime<Utc>,
) -> Result<TemperatureWindowResult> {
    let reports = source.fetch_reports(station, hours).await.inspect_err(|err| {
        warn!("Temperature fetch failed for {}. Error {}", station, err);
    })?;
    Ok(temperature_window_from_reports(station, &reports, window, hourly_only, now))
}

/// Highest and most recent pressure readings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PressureExtrema {
    pub max_mb: Option<f64>,
    pub latest: Option<StationSample>,
}

/// Pressure maximum and latest reading, SLP preferred over altimeter.
#[must_use]
pub fn pressure_extrema(station: &str, reports: &[RawReport]) -> PressureExtrema {
    reports
        .iter()
        .filter_map(|report| {
            remarks::decode(&report.raw_text)
                .best_pressure_mb()
                .map(|pressure| (report.timestamp, pressure))
        })
        .fold(PressureExtrema::default(), |acc, (timestamp, pressure_mb)| {
            let newer = acc.latest.as_ref().is_none_or(|latest| timestamp > latest.timestamp);
            PressureExtrema {
                max_mb: max_known(acc.max_mb, Some(pressure_mb)),
                latest: if newer {
                    Some(StationSample {
                        station_id: station.to_string(),
                        pressure_mb,
                        timestamp,
                    })
                } else {
                    acc.latest
                },
            }
        })
}

/// Pressure sample closest to `target` within `tolerance`; ties go to the earlier report.
#[must_use]
pub fn nearest_sample(
    station: &str,
    reports: &[RawReport],
    target: DateTime<Utc>,
    tolerance: Duration,
) -> Option<StationSample> {
    reports
        .iter()
        .filter_map(|report| {
            let distance = (report.timestamp - target).abs();
            if distance > tolerance {
                return None;
            }
            let pressure_mb = remarks::decode(&report.raw_text).best_pressure_mb()?;
            Some((distance, report.timestamp, pressure_mb))
        })
        .min_by_key(|(distance, timestamp, _)| (*distance, *timestamp))
        .map(|(_, timestamp, pressure_mb)| StationSample {
            station_id: station.to_string(),
            pressure_mb,
            timestamp,
        })
}

/// Current and 24 hour old samples for the gradient stations
#[derive(Debug, Clone, PartialEq)]
pub struct PressureSnapshot {
    pub current: StationTriple<Option<StationSample>>,
    pub past: StationTriple<Option<StationSample>>,
    /// Stations whose fetch failed this cycle
    pub failed_stations: Vec<String>,
}

impl PressureSnapshot {
    /// Stations that were fetched but had no sample near `now`
    #[must_use]
    pub fn missing_current(&self, stations: &StationTriple<String>) -> Vec<String> {
        [
            (&self.current.upwind, &stations.upwind),
            (&self.current.bay, &stations.bay),
            (&self.current.inland, &stations.inland),
        ]
        .into_iter()
        .filter(|(sample, station)| sample.is_none() && !self.failed_stations.contains(station))
        .map(|(_, station)| station.clone())
        .collect()
    }
}

/// Pick "now" and "24 hours ago" samples per station. Errors only if every station failed.
pub fn pressure_snapshot(
    fetched: &StationReports,
    stations: &StationTriple<String>,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<PressureSnapshot> {
    let day_ago = now - Duration::hours(24);
    let mut failed_stations = Vec::new();

    let reports = stations.clone().map(|station| match fetched.get(&station) {
        Some(Ok(reports)) => Some((station, reports.as_slice())),
        Some(Err(_)) | None => {
            failed_stations.push(station);
            None
        }
    });

    if reports.iter().all(Option::is_none) {
        return Err(StratusError::source_unavailable(
            failed_stations.join(","),
            "every gradient station failed",
        ));
    }

    let sample_at = |target: DateTime<Utc>| {
        reports.clone().map(|entry| {
            entry.and_then(|(station, reports)| nearest_sample(&station, reports, target, tolerance))
        })
    };

    Ok(PressureSnapshot {
        current: sample_at(now),
        past: sample_at(day_ago),
        failed_stations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
    }

    fn report(hour: u32, minute: u32, text: &str) -> RawReport {
        RawReport::new("KSFO", at(1, hour, minute), text)
    }

    #[test]
    fn test_extrema_prefers_remarks_and_falls_back_to_primary() {
        let reports = vec![
            report(20, 56, "KSFO RMK AO2 T01830117").with_primary(Some(18.0), Some(12.0)),
            report(21, 56, "KSFO RMK AO2").with_primary(Some(21.0), Some(10.0)),
        ];
        let extrema = window_extrema(&reports);
        assert_eq!(extrema.max_temp_f, Some(70.0));
        assert_eq!(extrema.max_dewpoint_f, Some(53.0));
        assert_eq!(extrema.contributing_reports, 2);
    }

    #[test]
    fn test_extrema_of_empty_window_is_none() {
        let extrema = window_extrema(&[]);
        assert_eq!(extrema.max_temp_f, None);
        assert_eq!(extrema.max_dewpoint_f, None);
    }

    #[test]
    fn test_extrema_without_any_values_is_none_not_sentinel() {
        let reports = vec![report(20, 56, "KSFO RMK AO2"), report(21, 56, "")];
        let extrema = window_extrema(&reports);
        assert_eq!(extrema, WindowExtrema::default());
    }

    #[test]
    fn test_extrema_handles_sub_zero_values() {
        let reports = vec![report(20, 56, "KXYZ RMK T10501100"), report(21, 56, "KXYZ RMK T10221083")];
        let extrema = window_extrema(&reports);
        assert_eq!(extrema.max_temp_f, Some(28.0));
        assert_eq!(extrema.max_dewpoint_f, Some(17.0));
    }

    #[test]
    fn test_pressure_extrema_uses_timestamp_not_position() {
        let reports = vec![
            report(20, 56, "KSFO A2990 RMK SLP120"),
            report(22, 56, "KSFO A2985 RMK SLP110"),
            report(21, 56, "KSFO A2995 RMK SLP135"),
        ];
        let extrema = pressure_extrema("KSFO", &reports);
        assert_eq!(extrema.max_mb, Some(1013.5));
        let latest = extrema.latest.unwrap();
        assert_eq!(latest.pressure_mb, 1011.0);
        assert_eq!(latest.timestamp, at(1, 22, 56));
    }

    #[test]
    fn test_pressure_extrema_empty() {
        assert_eq!(pressure_extrema("KSFO", &[]), PressureExtrema::default());
    }

    #[test]
    fn test_nearest_sample_within_tolerance() {
        let reports = vec![
            report(19, 56, "KSFO RMK SLP120"),
            report(20, 56, "KSFO RMK SLP125"),
            report(21, 56, "KSFO RMK SLP130"),
        ];
        let sample = nearest_sample("KSFO", &reports, at(1, 21, 30), Duration::minutes(90)).unwrap();
        assert_eq!(sample.pressure_mb, 1013.0);
        assert_eq!(sample.timestamp, at(1, 21, 56));
    }

    #[test]
    fn test_nearest_sample_tie_prefers_earlier() {
        let reports = vec![report(21, 0, "KSFO RMK SLP130"), report(20, 0, "KSFO RMK SLP120")];
        let sample = nearest_sample("KSFO", &reports, at(1, 20, 30), Duration::minutes(90)).unwrap();
        assert_eq!(sample.timestamp, at(1, 20, 0));
    }

    #[test]
    fn test_nearest_sample_outside_tolerance_is_none() {
        let reports = vec![report(12, 56, "KSFO RMK SLP130")];
        assert!(nearest_sample("KSFO", &reports, at(1, 21, 0), Duration::minutes(90)).is_none());
    }

    #[test]
    fn test_nearest_sample_skips_reports_without_pressure() {
        let reports = vec![report(21, 0, "KSFO RMK AO2"), report(20, 0, "KSFO RMK SLP120")];
        let sample = nearest_sample("KSFO", &reports, at(1, 21, 0), Duration::minutes(90)).unwrap();
        assert_eq!(sample.pressure_mb, 1012.0);
    }

    #[test]
    fn test_snapshot_tolerates_one_failed_station() {
        let stations = StationTriple::new("KACV".to_string(), "KSFO".to_string(), "KSMF".to_string());
        let mut fetched = StationReports::new();
        fetched.insert("KACV".into(), Ok(vec![report(21, 56, "KACV RMK SLP140")]));
        fetched.insert("KSFO".into(), Ok(vec![report(21, 56, "KSFO RMK SLP130")]));
        fetched.insert("KSMF".into(), Err(StratusError::source_unavailable("KSMF", "timeout")));

        let snapshot = pressure_snapshot(&fetched, &stations, at(1, 22, 0), Duration::minutes(90)).unwrap();
        assert!(snapshot.current.upwind.is_some());
        assert!(snapshot.current.bay.is_some());
        assert!(snapshot.current.inland.is_none());
        assert!(snapshot.past.bay.is_none());
        assert_eq!(snapshot.failed_stations, vec!["KSMF".to_string()]);
        assert!(snapshot.missing_current(&stations).is_empty());
    }

    #[test]
    fn test_snapshot_fails_when_every_station_fails() {
        let stations = StationTriple::new("KACV".to_string(), "KSFO".to_string(), "KSMF".to_string());
        let fetched: StationReports = ["KACV", "KSFO", "KSMF"]
            .into_iter()
            .map(|s| (s.to_string(), Err(StratusError::source_unavailable(s, "down"))))
            .collect();

        let err = pressure_snapshot(&fetched, &stations, at(1, 22, 0), Duration::minutes(90)).unwrap_err();
        assert!(matches!(err, StratusError::SourceUnavailable { .. }));
    }
}
