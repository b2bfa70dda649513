//! One forecast refresh cycle, and the board that keeps the newest result
//!
//! A cycle fetches every station once, reduces the reports, merges in the
//! forecaster's manual inputs and runs the model. Everything it computes is
//! returned as a [`RefreshOutcome`]; [`ForecastBoard::publish`] is the only
//! place shared state changes.

use crate::config::StratusConfig;
use crate::metar::ObservationSource;
use crate::models::{
    ForecastInputs, ForecastResult, PressureGradientResult, SynopticPatterns, SynopticTrigger,
    TemperatureWindowResult, WindObservation,
};
use crate::solar::{self, SolarTimeCalculator};
use crate::stratus::{StationTriple, aggregator, gradient, model};
use crate::Result;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Values entered by the forecaster. Overrides win over fetched values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManualInputs {
    pub inversion_base_ft: f64,
    pub cloud_base_ft: f64,
    pub wind_2000ft: WindObservation,
    pub min_afternoon_dewpoint_f: f64,
    /// Defaults to the month of the refresh time
    pub month: Option<u32>,
    pub trigger: Option<SynopticTrigger>,
    pub patterns: SynopticPatterns,
    pub max_temp_f: Option<f64>,
    pub max_dewpoint_f: Option<f64>,
    pub onshore_gradient_mb: Option<f64>,
    pub offshore_gradient_mb: Option<f64>,
}

impl Default for ManualInputs {
    fn default() -> Self {
        let defaults = ForecastInputs::default();
        Self {
            inversion_base_ft: defaults.inversion_base_ft,
            cloud_base_ft: defaults.cloud_base_ft,
            wind_2000ft: defaults.wind_2000ft,
            min_afternoon_dewpoint_f: defaults.min_afternoon_dewpoint_f,
            month: None,
            trigger: None,
            patterns: SynopticPatterns::default(),
            max_temp_f: None,
            max_dewpoint_f: None,
            onshore_gradient_mb: None,
            offshore_gradient_mb: None,
        }
    }
}

/// Everything one refresh produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshOutcome {
    pub generated_at: DateTime<Utc>,
    /// `None` when the temperature station could not be fetched
    pub temperature: Option<TemperatureWindowResult>,
    /// `None` when any current gradient sample is missing
    pub gradients: Option<PressureGradientResult>,
    pub inputs: Option<ForecastInputs>,
    /// `None` when the model could not run for lack of data
    pub forecast: Option<ForecastResult>,
    pub next_sunrise: Option<DateTime<Utc>>,
    pub burn_off_at: Option<DateTime<Utc>>,
    /// Automated steps that failed or came back empty
    pub caveats: Vec<String>,
    /// Why the model did not run, when it did not
    pub missing_inputs: Vec<String>,
}

pub struct RefreshService<S> {
    source: S,
    config: StratusConfig,
    solar: SolarTimeCalculator,
}

impl<S: ObservationSource> RefreshService<S> {
    pub fn new(source: S, config: StratusConfig) -> Result<Self> {
        let solar = SolarTimeCalculator::from_config(&config.solar)?;
        Ok(Self { source, config, solar })
    }

    #[must_use]
    pub fn solar(&self) -> &SolarTimeCalculator {
        &self.solar
    }

    /// Run one cycle as of `now`.
    #[tracing::instrument(level = "info", skip_all, fields(now = %now))]
    pub async fn refresh(&self, manual: &ManualInputs, now: DateTime<Utc>) -> RefreshOutcome {
        let stations = &self.config.stations;
        let gradient_stations =
            StationTriple::new(stations.upwind.clone(), stations.bay.clone(), stations.inland.clone());

        let fetched = aggregator::fetch_all(
            &self.source,
            &[
                stations.temperature.as_str(),
                stations.upwind.as_str(),
                stations.bay.as_str(),
                stations.inland.as_str(),
            ],
            self.config.metar.lookback_hours,
        )
        .await;

        let mut caveats = Vec::new();
        let temperature = self.reduce_temperature(&fetched, now, &mut caveats);
        let gradients = self.reduce_gradients(&fetched, &gradient_stations, now, &mut caveats);

        let (inputs, missing_inputs) =
            build_inputs(manual, temperature.as_ref(), gradients.as_ref(), &caveats, now);
        let forecast = inputs.as_ref().map(model::forecast);

        let next_sunrise = self.solar.next_sunrise(now);
        let burn_off_at = match (&forecast, next_sunrise) {
            (Some(result), Some(sunrise)) if result.onset_window.is_some() => {
                solar::hours_after(sunrise, result.burn_off_hours)
            }
            _ => None,
        };

        match &forecast {
            Some(result) => info!(
                probability = result.probability_pct,
                confidence = %result.confidence,
                caveats = caveats.len(),
                "Forecast refreshed"
            ),
            None => warn!(missing = ?missing_inputs, "Forecast not available"),
        }

        RefreshOutcome {
            generated_at: now,
            temperature,
            gradients,
            inputs,
            forecast,
            next_sunrise,
            burn_off_at,
            caveats,
            missing_inputs,
        }
    }

    fn reduce_temperature(
        &self,
        fetched: &aggregator::StationReports,
        now: DateTime<Utc>,
        caveats: &mut Vec<String>,
    ) -> Option<TemperatureWindowResult> {
        let station = &self.config.stations.temperature;
        let window = self.config.window.definition();
        match fetched.get(station) {
            Some(Ok(reports)) => {
                let result = aggregator::temperature_window_from_reports(
                    station,
                    reports,
                    &window,
                    self.config.window.hourly_only,
                    now,
                );
                if result.max_temp_f.is_none() || result.max_dewpoint_f.is_none() {
                    caveats.push(format!(
                        "No qualifying {station} reports in the {:02}-{:02}Z window",
                        window.start_hour, window.end_hour
                    ));
                }
                Some(result)
            }
            Some(Err(err)) => {
                caveats.push(format!("Temperature fetch failed: {err}"));
                None
            }
            None => {
                caveats.push(format!("Temperature station {station} was not fetched"));
                None
            }
        }
    }

    fn reduce_gradients(
        &self,
        fetched: &aggregator::StationReports,
        stations: &StationTriple<String>,
        now: DateTime<Utc>,
        caveats: &mut Vec<String>,
    ) -> Option<PressureGradientResult> {
        let snapshot = match aggregator::pressure_snapshot(
            fetched,
            stations,
            now,
            self.config.aggregation.tolerance(),
        ) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                caveats.push(format!("Pressure fetch failed: {err}"));
                return None;
            }
        };

        caveats.extend(
            snapshot
                .failed_stations
                .iter()
                .map(|station| format!("Pressure fetch failed for {station}")),
        );
        caveats.extend(
            snapshot
                .missing_current(stations)
                .into_iter()
                .map(|station| format!("No current pressure sample for {station}")),
        );

        let result = gradient::compute(&snapshot.current, &snapshot.past, now);
        if result.as_ref().is_some_and(|r| r.onshore_24h_trend_mb.is_none()) {
            caveats.push("24 hour gradient trend unavailable".to_string());
        }
        result
    }
}

/// Merge automated and manual values. Returns the reasons when a required value is missing.
pub fn build_inputs(
    manual: &ManualInputs,
    temperature: Option<&TemperatureWindowResult>,
    gradients: Option<&PressureGradientResult>,
    caveats: &[String],
    now: DateTime<Utc>,
) -> (Option<ForecastInputs>, Vec<String>) {
    let max_temp_f = manual.max_temp_f.or(temperature.and_then(|t| t.max_temp_f));
    let max_dewpoint_f = manual.max_dewpoint_f.or(temperature.and_then(|t| t.max_dewpoint_f));
    let onshore = manual.onshore_gradient_mb.or(gradients.map(|g| g.onshore_gradient_mb));
    let offshore = manual.offshore_gradient_mb.or(gradients.map(|g| g.offshore_gradient_mb));

    let mut missing = Vec::new();
    for (value, name) in [
        (max_temp_f, "afternoon maximum temperature"),
        (max_dewpoint_f, "afternoon maximum dewpoint"),
        (onshore, "onshore pressure gradient"),
        (offshore, "offshore pressure gradient"),
    ] {
        if value.is_none() {
            missing.push(format!("No {name}; enter it manually"));
        }
    }

    let (Some(max_temp_f), Some(max_dewpoint_f), Some(onshore), Some(offshore)) =
        (max_temp_f, max_dewpoint_f, onshore, offshore)
    else {
        return (None, missing);
    };

    // a manual gradient has no history, so its trend is unknown
    let onshore_trend_mb = gradients
        .filter(|_| manual.onshore_gradient_mb.is_none())
        .and_then(|g| g.onshore_24h_trend_mb);
    let offshore_trend_mb = gradients
        .filter(|_| manual.offshore_gradient_mb.is_none())
        .and_then(|g| g.offshore_24h_trend_mb);

    let inputs = ForecastInputs {
        max_temp_f,
        max_dewpoint_f,
        onshore_gradient_mb: onshore,
        offshore_gradient_mb: offshore,
        onshore_trend_mb,
        offshore_trend_mb,
        inversion_base_ft: manual.inversion_base_ft,
        cloud_base_ft: manual.cloud_base_ft,
        wind_2000ft: manual.wind_2000ft,
        min_afternoon_dewpoint_f: manual.min_afternoon_dewpoint_f,
        month: manual.month.unwrap_or_else(|| now.month()),
        trigger: manual.trigger,
        patterns: manual.patterns,
        data_caveats: caveats.to_vec(),
    };
    (Some(inputs), missing)
}

/// A published outcome and the cycle that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedForecast {
    pub cycle: u64,
    pub outcome: RefreshOutcome,
}

/// Holds the newest completed forecast. Results from older cycles are discarded.
#[derive(Debug, Default)]
pub struct ForecastBoard {
    issued: AtomicU64,
    latest: RwLock<Option<PublishedForecast>>,
}

impl ForecastBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id for a new cycle. Ids increase monotonically.
    pub fn begin_cycle(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Store `outcome` unless a newer cycle already published. Returns whether it was kept.
    pub async fn publish(&self, cycle: u64, outcome: RefreshOutcome) -> bool {
        let mut latest = self.latest.write().await;
        if let Some(current) = latest.as_ref()
            && current.cycle > cycle
        {
            warn!(cycle, newer = current.cycle, "Discarding stale forecast");
            return false;
        }
        *latest = Some(PublishedForecast { cycle, outcome });
        true
    }

    pub async fn latest(&self) -> Option<PublishedForecast> {
        self.latest.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 1, 23, 30, 0).unwrap()
    }

    fn temperature(max_temp_f: Option<f64>, max_dewpoint_f: Option<f64>) -> TemperatureWindowResult {
        TemperatureWindowResult {
            max_temp_f,
            max_dewpoint_f,
            data_source: "KSFO 20-23Z hourly (3 reports)".to_string(),
            timestamp: now(),
        }
    }

    fn gradients() -> PressureGradientResult {
        PressureGradientResult {
            offshore_gradient_mb: -3.0,
            onshore_gradient_mb: 3.8,
            offshore_24h_trend_mb: Some(-0.5),
            onshore_24h_trend_mb: Some(0.8),
            timestamp: now(),
        }
    }

    fn outcome(label: &str) -> RefreshOutcome {
        RefreshOutcome {
            generated_at: now(),
            temperature: None,
            gradients: None,
            inputs: None,
            forecast: None,
            next_sunrise: None,
            burn_off_at: None,
            caveats: vec![label.to_string()],
            missing_inputs: Vec::new(),
        }
    }

    #[test]
    fn test_build_inputs_from_automated_values() {
        let temp = temperature(Some(75.0), Some(58.0));
        let grads = gradients();
        let (inputs, missing) =
            build_inputs(&ManualInputs::default(), Some(&temp), Some(&grads), &[], now());

        let inputs = inputs.unwrap();
        assert!(missing.is_empty());
        assert_eq!(inputs.stratus_index(), 17.0);
        assert_eq!(inputs.onshore_gradient_mb, 3.8);
        assert_eq!(inputs.onshore_trend_mb, Some(0.8));
        assert_eq!(inputs.month, 7);
    }

    #[test]
    fn test_manual_override_drops_trend() {
        let temp = temperature(Some(75.0), Some(58.0));
        let grads = gradients();
        let manual = ManualInputs {
            onshore_gradient_mb: Some(2.5),
            month: Some(8),
            ..ManualInputs::default()
        };
        let (inputs, _) = build_inputs(&manual, Some(&temp), Some(&grads), &[], now());
        let inputs = inputs.unwrap();
        assert_eq!(inputs.onshore_gradient_mb, 2.5);
        assert_eq!(inputs.onshore_trend_mb, None);
        assert_eq!(inputs.offshore_trend_mb, Some(-0.5));
        assert_eq!(inputs.month, 8);
    }

    #[test]
    fn test_missing_temperature_is_not_zero() {
        let temp = temperature(None, None);
        let grads = gradients();
        let (inputs, missing) =
            build_inputs(&ManualInputs::default(), Some(&temp), Some(&grads), &[], now());
        assert!(inputs.is_none());
        assert_eq!(missing.len(), 2);
    }

    #[test]
    fn test_manual_values_fill_missing_data() {
        let manual = ManualInputs {
            max_temp_f: Some(80.0),
            max_dewpoint_f: Some(60.0),
            onshore_gradient_mb: Some(3.0),
            offshore_gradient_mb: Some(-2.0),
            ..ManualInputs::default()
        };
        let caveats = vec!["Pressure fetch failed".to_string()];
        let (inputs, missing) = build_inputs(&manual, None, None, &caveats, now());
        let inputs = inputs.unwrap();
        assert!(missing.is_empty());
        assert_eq!(inputs.data_caveats, caveats);
        assert_eq!(inputs.onshore_trend_mb, None);
    }

    #[tokio::test]
    async fn test_board_keeps_newest_cycle() {
        let board = ForecastBoard::new();
        let first = board.begin_cycle();
        let second = board.begin_cycle();
        assert!(second > first);

        assert!(board.publish(second, outcome("second")).await);
        assert!(!board.publish(first, outcome("first")).await);

        let latest = board.latest().await.unwrap();
        assert_eq!(latest.cycle, second);
        assert_eq!(latest.outcome.caveats, vec!["second".to_string()]);
    }

    #[tokio::test]
    async fn test_board_accepts_in_order_results() {
        let board = ForecastBoard::new();
        assert!(board.latest().await.is_none());
        let first = board.begin_cycle();
        assert!(board.publish(first, outcome("first")).await);
        let second = board.begin_cycle();
        assert!(board.publish(second, outcome("second")).await);
        assert_eq!(board.latest().await.unwrap().cycle, second);
    }
}
