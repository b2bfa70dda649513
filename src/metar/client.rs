//! aviationweather.gov METAR client

use crate::config::MetarConfig;
use crate::metar::ObservationSource;
use crate::models::RawReport;
use crate::{Result, StratusError};
use chrono::DateTime;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// One record of the `format=json` METAR response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetarRecord {
    icao_id: String,
    /// Observation time, unix seconds
    obs_time: i64,
    temp: Option<f64>,
    dewp: Option<f64>,
    #[serde(default)]
    raw_ob: String,
}

impl MetarRecord {
    fn into_report(self) -> Option<RawReport> {
        let timestamp = DateTime::from_timestamp(self.obs_time, 0)?;
        Some(RawReport::new(self.icao_id, timestamp, self.raw_ob).with_primary(self.temp, self.dewp))
    }
}

#[derive(Debug, Clone)]
pub struct MetarClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl MetarClient {
    pub fn new(config: &MetarConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("stratus-forecast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client against a different API root, without retries.
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::new(&MetarConfig {
            base_url: base_url.into(),
            max_retries: 0,
            ..MetarConfig::default()
        })
    }

    fn url(&self, station: &str, hours: u32) -> String {
        format!(
            "{}/metar?ids={}&format=json&hours={}",
            self.base_url, station, hours
        )
    }
}

/// Parse a `format=json` response body. An empty body means no reports.
pub fn parse_response(station: &str, body: &str) -> Result<Vec<RawReport>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<MetarRecord> = serde_json::from_str(body)
        .map_err(|e| StratusError::api(format!("Unreadable METAR response for {station}: {e}")))?;

    let total = records.len();
    let reports: Vec<RawReport> = records
        .into_iter()
        .filter_map(MetarRecord::into_report)
        .collect();
    if reports.len() < total {
        debug!(station, skipped = total - reports.len(), "Skipped records with invalid timestamps");
    }
    Ok(reports)
}

impl ObservationSource for MetarClient {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_reports(&self, station: &str, hours: u32) -> Result<Vec<RawReport>> {
        let response = self
            .client
            .get(self.url(station, hours))
            .send()
            .await
            .map_err(|e| StratusError::source_unavailable(station, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StratusError::source_unavailable(
                station,
                format!("HTTP {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StratusError::source_unavailable(station, e.to_string()))?;

        let reports = parse_response(station, &body)?;
        info!(station, count = reports.len(), "Fetched METAR reports");
        Ok(reports)
    }
}
