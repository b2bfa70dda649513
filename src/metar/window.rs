//! Diurnal observation windows
//!
//! Classifies reports by UTC hour into a configured window (which may span
//! midnight) and recognises routine hourly and synoptic reports.

use crate::models::{RawReport, WindowedObservation};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Hours in which the 00, 06, 12 and 18Z synoptic reports are issued
pub const DEFAULT_SYNOPTIC_HOURS: [u32; 4] = [5, 11, 17, 23];

/// Inclusive UTC hour window with an optional grace period before the start
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct WindowDefinition {
    pub start_hour: u32,
    pub end_hour: u32,
    /// Minutes before `start_hour` that still count as inside the window
    pub grace_minutes: u32,
}

impl Default for WindowDefinition {
    /// Afternoon maximum window, 20Z through 23Z.
    fn default() -> Self {
        Self {
            start_hour: 20,
            end_hour: 23,
            grace_minutes: 5,
        }
    }
}

impl WindowDefinition {
    #[must_use]
    pub fn new(start_hour: u32, end_hour: u32, grace_minutes: u32) -> Self {
        Self {
            start_hour: start_hour % 24,
            end_hour: end_hour % 24,
            grace_minutes: grace_minutes.min(59),
        }
    }

    /// Number of whole hours covered, counting both ends.
    #[must_use]
    pub fn span_hours(&self) -> u32 {
        (self.end_hour + 24 - self.start_hour) % 24 + 1
    }

    fn contains_hour(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            (self.start_hour..=self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour <= self.end_hour
        }
    }

    /// Whether `timestamp` falls inside the window, grace period included.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        if self.contains_hour(timestamp.hour()) {
            return true;
        }
        let hour_before_start = (self.start_hour + 23) % 24;
        self.grace_minutes > 0
            && timestamp.hour() == hour_before_start
            && timestamp.minute() >= 60 - self.grace_minutes
    }

    /// Concrete `[start, end)` of the most recent window that has begun by `now`.
    ///
    /// The window may still be in progress.
    #[must_use]
    pub fn latest_occurrence(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let grace = Duration::minutes(i64::from(self.grace_minutes));
        let today_start = now
            .date_naive()
            .and_hms_opt(self.start_hour, 0, 0)
            .map_or(now, |naive| naive.and_utc());
        let start = if today_start - grace > now {
            today_start - Duration::days(1)
        } else {
            today_start
        };
        let end = start + Duration::hours(i64::from(self.span_hours()));
        (start - grace, end)
    }
}

/// Routine hourly reports are issued in the last minutes of the hour.
#[must_use]
pub fn is_hourly(timestamp: DateTime<Utc>) -> bool {
    (53..=59).contains(&timestamp.minute())
}

/// Hourly report issued in one of `synoptic_hours`.
#[must_use]
pub fn is_synoptic(timestamp: DateTime<Utc>, synoptic_hours: &[u32]) -> bool {
    is_hourly(timestamp) && synoptic_hours.contains(&timestamp.hour())
}

/// Annotate every report with its window and hourly flags.
#[must_use]
pub fn annotate<'a>(reports: &'a [RawReport], window: &WindowDefinition) -> Vec<WindowedObservation<'a>> {
    reports
        .iter()
        .map(|report| WindowedObservation {
            report,
            in_window: window.contains(report.timestamp),
            is_hourly: is_hourly(report.timestamp),
        })
        .collect()
}

/// Reports inside the window, in their original order.
#[must_use]
pub fn select<'a>(reports: &'a [RawReport], window: &WindowDefinition, hourly_only: bool) -> Vec<&'a RawReport> {
    annotate(reports, window)
        .into_iter()
        .filter(|obs| obs.in_window && (obs.is_hourly || !hourly_only))
        .map(|obs| obs.report)
        .collect()
}

/// Like [`select`], restricted to the most recent occurrence of the window.
#[must_use]
pub fn select_latest<'a>(
    reports: &'a [RawReport],
    window: &WindowDefinition,
    hourly_only: bool,
    now: DateTime<Utc>,
) -> Vec<&'a RawReport> {
    let (start, end) = window.latest_occurrence(now);
    select(reports, window, hourly_only)
        .into_iter()
        .filter(|report| report.timestamp >= start && report.timestamp < end)
        .collect()
}

/// Newest timestamp among `reports`, independent of their order.
#[must_use]
pub fn latest_timestamp<'a, I>(reports: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a RawReport>,
{
    reports.into_iter().map(|report| report.timestamp).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
    }

    fn report(day: u32, hour: u32, minute: u32) -> RawReport {
        RawReport::new("KSFO", at(day, hour, minute), "KSFO RMK AO2")
    }

    #[test]
    fn test_grace_period_includes_report_before_start() {
        let window = WindowDefinition::new(20, 23, 5);
        assert!(window.contains(at(1, 19, 55)));
        assert!(!window.contains(at(1, 19, 54)));
        assert!(!WindowDefinition::new(20, 23, 0).contains(at(1, 19, 55)));
    }

    #[test]
    fn test_late_hour_inside_window() {
        let reports = vec![report(1, 23, 55), report(1, 23, 45)];

        let hourly = select(&reports, &WindowDefinition::new(20, 23, 5), true);
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].timestamp, at(1, 23, 55));

        let strict = select(&reports[1..], &WindowDefinition::new(20, 23, 0), true);
        assert!(strict.is_empty());

        let all = select(&reports, &WindowDefinition::new(20, 23, 0), false);
        assert_eq!(all.len(), 2);
    }

    #[rstest]
    #[case(22, 2, 23, true)]
    #[case(22, 2, 0, true)]
    #[case(22, 2, 2, true)]
    #[case(22, 2, 3, false)]
    #[case(22, 2, 12, false)]
    #[case(20, 23, 0, false)]
    #[case(20, 23, 20, true)]
    fn test_contains_hour_with_wraparound(
        #[case] start: u32,
        #[case] end: u32,
        #[case] hour: u32,
        #[case] expected: bool,
    ) {
        let window = WindowDefinition::new(start, end, 0);
        assert_eq!(window.contains(at(1, hour, 30)), expected);
    }

    #[test]
    fn test_grace_wraps_past_midnight() {
        let window = WindowDefinition::new(0, 3, 5);
        assert!(window.contains(at(1, 23, 57)));
    }

    #[rstest]
    #[case(55, true)]
    #[case(53, true)]
    #[case(59, true)]
    #[case(52, false)]
    #[case(30, false)]
    #[case(0, false)]
    fn test_is_hourly(#[case] minute: u32, #[case] expected: bool) {
        assert_eq!(is_hourly(at(1, 12, minute)), expected);
    }

    #[test]
    fn test_is_synoptic() {
        assert!(is_synoptic(at(1, 17, 56), &DEFAULT_SYNOPTIC_HOURS));
        assert!(is_synoptic(at(1, 23, 56), &DEFAULT_SYNOPTIC_HOURS));
        assert!(!is_synoptic(at(1, 18, 56), &DEFAULT_SYNOPTIC_HOURS));
        assert!(!is_synoptic(at(1, 17, 30), &DEFAULT_SYNOPTIC_HOURS));
    }

    #[test]
    fn test_select_preserves_order() {
        let reports = vec![
            report(1, 22, 56),
            report(1, 21, 56),
            report(1, 20, 56),
            report(1, 19, 56),
            report(1, 18, 56),
        ];
        let selected = select(&reports, &WindowDefinition::default(), true);
        let hours: Vec<u32> = selected.iter().map(|r| r.timestamp.hour()).collect();
        // 19:56 is inside the five minute grace period
        assert_eq!(hours, vec![22, 21, 20, 19]);
    }

    #[test]
    fn test_annotate_does_not_drop_reports() {
        let reports = vec![report(1, 21, 56), report(1, 10, 10)];
        let annotated = annotate(&reports, &WindowDefinition::default());
        assert_eq!(annotated.len(), 2);
        assert!(annotated[0].in_window && annotated[0].is_hourly);
        assert!(!annotated[1].in_window && !annotated[1].is_hourly);
    }

    #[test]
    fn test_latest_occurrence_before_window_uses_previous_day() {
        let window = WindowDefinition::default();
        let (start, end) = window.latest_occurrence(at(2, 2, 0));
        assert_eq!(start, at(1, 19, 55));
        assert_eq!(end, at(2, 0, 0));
    }

    #[test]
    fn test_latest_occurrence_during_window() {
        let window = WindowDefinition::default();
        let (start, end) = window.latest_occurrence(at(2, 21, 10));
        assert_eq!(start, at(2, 19, 55));
        assert_eq!(end, at(3, 0, 0));
    }

    #[test]
    fn test_latest_occurrence_in_grace_period() {
        let window = WindowDefinition::default();
        let (start, _) = window.latest_occurrence(at(2, 19, 57));
        assert_eq!(start, at(2, 19, 55));
    }

    #[test]
    fn test_select_latest_excludes_previous_afternoon() {
        let reports = vec![report(2, 21, 56), report(2, 20, 56), report(1, 22, 56), report(1, 21, 56)];
        let selected = select_latest(&reports, &WindowDefinition::default(), true, at(2, 23, 0));
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|r| r.timestamp.date_naive() == at(2, 0, 0).date_naive()));
    }

    #[test]
    fn test_select_latest_across_midnight() {
        let window = WindowDefinition::new(22, 1, 0);
        let reports = vec![report(2, 0, 56), report(1, 23, 56), report(1, 22, 56), report(1, 1, 56)];
        let selected = select_latest(&reports, &window, true, at(2, 3, 0));
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_latest_timestamp_ignores_order() {
        let reports = vec![report(1, 20, 56), report(1, 22, 56), report(1, 21, 56)];
        assert_eq!(latest_timestamp(&reports), Some(at(1, 22, 56)));
        assert_eq!(latest_timestamp(&[]), None);
    }
}
