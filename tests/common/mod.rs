#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use stratus_forecast::models::RawReport;
use stratus_forecast::{ObservationSource, StratusError};

/// In-memory observation source. Stations without an entry fail.
#[derive(Default)]
pub struct FakeSource {
    reports: HashMap<String, Vec<RawReport>>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn with_station(mut self, station: &str, reports: Vec<RawReport>) -> Self {
        self.reports.insert(station.to_string(), reports);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObservationSource for FakeSource {
    async fn fetch_reports(&self, station: &str, _hours: u32) -> stratus_forecast::Result<Vec<RawReport>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reports
            .get(station)
            .cloned()
            .ok_or_else(|| StratusError::source_unavailable(station, "HTTP 503 Service Unavailable"))
    }
}

pub fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, day, hour, minute, 0).unwrap()
}

/// Same time of day, 24 hours before `at(1, ..)`
pub fn day_before(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 30, hour, minute, 0).unwrap()
}

/// Refresh time used by the pipeline tests, shortly after the afternoon window
pub fn now() -> DateTime<Utc> {
    at(1, 23, 30)
}

pub fn metar(station: &str, timestamp: DateTime<Utc>, body: &str) -> RawReport {
    let text = format!("METAR {station} {} {body}", timestamp.format("%d%H%MZ"));
    RawReport::new(station, timestamp, text)
}

/// Hourly reports peaking at 70/55 °F, a warmer special, and current and day-old pressure.
pub fn bay_reports() -> Vec<RawReport> {
    vec![
        metar("KSFO", at(1, 20, 56), "29014KT 10SM FEW008 18/12 A2990 RMK AO2 SLP124 T01830117"),
        metar("KSFO", at(1, 21, 56), "29016KT 10SM CLR 21/12 A2990 RMK AO2 SLP130 T02110117"),
        metar("KSFO", at(1, 22, 56), "29015KT 10SM CLR 20/13 A2995 RMK AO2 SLP145 T02000128"),
        metar("KSFO", at(1, 22, 10), "29015KT 10SM CLR 22/15 A2994 RMK AO2 T02220150"),
        metar("KSFO", day_before(22, 56), "28012KT 10SM CLR A2989 RMK AO2 SLP140"),
    ]
}

pub fn upwind_reports() -> Vec<RawReport> {
    vec![
        metar("KACV", at(1, 22, 56), "33010KT 10SM BKN010 13/11 A2986 RMK AO2 SLP110"),
        metar("KACV", day_before(22, 56), "33008KT 10SM OVC009 13/11 A2986 RMK AO2 SLP112"),
    ]
}

pub fn inland_reports() -> Vec<RawReport> {
    vec![
        metar("KSMF", at(1, 22, 56), "20008KT 10SM CLR 35/09 A2983 RMK AO2 SLP105"),
        metar("KSMF", day_before(22, 56), "20006KT 10SM CLR 34/09 A2985 RMK AO2 SLP110"),
    ]
}

pub fn healthy_source() -> FakeSource {
    FakeSource::default()
        .with_station("KSFO", bay_reports())
        .with_station("KACV", upwind_reports())
        .with_station("KSMF", inland_reports())
}
