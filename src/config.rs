//! Configuration management for the stratus forecaster
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::StratusError;
use crate::metar::WindowDefinition;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratusConfig {
    /// METAR data service settings
    #[serde(default)]
    pub metar: MetarConfig,
    /// Station roles
    #[serde(default)]
    pub stations: StationsConfig,
    /// Afternoon temperature window
    #[serde(default)]
    pub window: WindowConfig,
    /// Nearest-sample matching
    #[serde(default)]
    pub aggregation: AggregationConfig,
    /// Fixed point used for sunrise
    #[serde(default)]
    pub solar: SolarConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Scheduled refresh
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// METAR data service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetarConfig {
    /// Base URL of the aviation weather data API
    #[serde(default = "default_metar_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_metar_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_metar_max_retries")]
    pub max_retries: u32,
    /// Hours of history requested per station
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
}

/// ICAO identifiers for each station role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationsConfig {
    /// Upwind coastal station (offshore gradient)
    #[serde(default = "default_upwind_station")]
    pub upwind: String,
    /// Bay station, shared by both gradients
    #[serde(default = "default_bay_station")]
    pub bay: String,
    /// Inland station (onshore gradient)
    #[serde(default = "default_inland_station")]
    pub inland: String,
    /// Station whose afternoon maxima feed the stratus index
    #[serde(default = "default_temperature_station")]
    pub temperature: String,
}

/// Afternoon window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_start")]
    pub start_hour: u32,
    #[serde(default = "default_window_end")]
    pub end_hour: u32,
    #[serde(default = "default_window_grace")]
    pub grace_minutes: u32,
    /// Only use routine hourly reports
    #[serde(default = "default_true")]
    pub hourly_only: bool,
}

/// Nearest-sample settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum distance between a sample and its target time
    #[serde(default = "default_tolerance_minutes")]
    pub tolerance_minutes: u32,
}

/// Sunrise reference point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// IANA timezone used when showing local times
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache TTL in minutes
    #[serde(default = "default_cache_ttl")]
    pub ttl_minutes: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Scheduled refresh settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_minutes: u32,
}

// Default value functions
fn default_metar_base_url() -> String {
    "https://aviationweather.gov/api/data".to_string()
}

fn default_metar_timeout() -> u32 {
    15
}

fn default_metar_max_retries() -> u32 {
    3
}

fn default_lookback_hours() -> u32 {
    30
}

fn default_upwind_station() -> String {
    "KACV".to_string()
}

fn default_bay_station() -> String {
    "KSFO".to_string()
}

fn default_inland_station() -> String {
    "KSMF".to_string()
}

fn default_temperature_station() -> String {
    "KSFO".to_string()
}

fn default_window_start() -> u32 {
    20
}

fn default_window_end() -> u32 {
    23
}

fn default_window_grace() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_tolerance_minutes() -> u32 {
    90
}

fn default_latitude() -> f64 {
    37.6189
}

fn default_longitude() -> f64 {
    -122.3750
}

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_cache_ttl() -> u32 {
    10
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("stratus-forecast").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".stratus-cache".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_refresh_interval() -> u32 {
    15
}

impl Default for MetarConfig {
    fn default() -> Self {
        Self {
            base_url: default_metar_base_url(),
            timeout_seconds: default_metar_timeout(),
            max_retries: default_metar_max_retries(),
            lookback_hours: default_lookback_hours(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        Self {
            upwind: default_upwind_station(),
            bay: default_bay_station(),
            inland: default_inland_station(),
            temperature: default_temperature_station(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            start_hour: default_window_start(),
            end_hour: default_window_end(),
            grace_minutes: default_window_grace(),
            hourly_only: true,
        }
    }
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: default_tolerance_minutes(),
        }
    }
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            timezone: default_timezone(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_refresh_interval(),
        }
    }
}

impl Default for StratusConfig {
    fn default() -> Self {
        Self {
            metar: MetarConfig::default(),
            stations: StationsConfig::default(),
            window: WindowConfig::default(),
            aggregation: AggregationConfig::default(),
            solar: SolarConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub fn definition(&self) -> WindowDefinition {
        WindowDefinition::new(self.start_hour, self.end_hour, self.grace_minutes)
    }
}

impl AggregationConfig {
    #[must_use]
    pub fn tolerance(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.tolerance_minutes))
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_minutes) * 60)
    }
}

impl StratusConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // STRATUS_STATIONS__BAY=KOAK style overrides
        builder = builder.add_source(
            Environment::with_prefix("STRATUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: StratusConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stratus-forecast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.metar.base_url.is_empty() {
            self.metar.base_url = default_metar_base_url();
        }
        if self.metar.timeout_seconds == 0 {
            self.metar.timeout_seconds = default_metar_timeout();
        }
        if self.metar.lookback_hours == 0 {
            self.metar.lookback_hours = default_lookback_hours();
        }
        if self.aggregation.tolerance_minutes == 0 {
            self.aggregation.tolerance_minutes = default_tolerance_minutes();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.refresh.interval_minutes == 0 {
            self.refresh.interval_minutes = default_refresh_interval();
        }
        for (station, fallback) in [
            (&mut self.stations.upwind, default_upwind_station as fn() -> String),
            (&mut self.stations.bay, default_bay_station),
            (&mut self.stations.inland, default_inland_station),
            (&mut self.stations.temperature, default_temperature_station),
        ] {
            if station.trim().is_empty() {
                *station = fallback();
            } else {
                *station = station.trim().to_ascii_uppercase();
            }
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_stations()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate station identifiers
    pub fn validate_stations(&self) -> Result<()> {
        let stations = [
            ("upwind", &self.stations.upwind),
            ("bay", &self.stations.bay),
            ("inland", &self.stations.inland),
            ("temperature", &self.stations.temperature),
        ];
        for (role, id) in stations {
            if id.len() != 4 || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(StratusError::validation(format!(
                    "Invalid {role} station '{id}'. Expected a 4-character ICAO identifier."
                ))
                .into());
            }
        }

        if self.stations.upwind == self.stations.bay || self.stations.bay == self.stations.inland {
            return Err(StratusError::config(
                "Gradient stations must differ: upwind, bay and inland need distinct identifiers",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.metar.timeout_seconds > 300 {
            return Err(StratusError::config("METAR timeout cannot exceed 300 seconds").into());
        }

        if self.metar.max_retries > 10 {
            return Err(StratusError::config("METAR max retries cannot exceed 10").into());
        }

        if self.metar.lookback_hours < 25 || self.metar.lookback_hours > 72 {
            return Err(StratusError::config(
                "METAR lookback must be between 25 and 72 hours to cover the 24 hour trend",
            )
            .into());
        }

        if self.window.start_hour > 23 || self.window.end_hour > 23 {
            return Err(StratusError::config("Window hours must be between 0 and 23").into());
        }

        if self.window.grace_minutes > 30 {
            return Err(StratusError::config("Window grace period cannot exceed 30 minutes").into());
        }

        if self.aggregation.tolerance_minutes > 180 {
            return Err(StratusError::config("Sample tolerance cannot exceed 180 minutes").into());
        }

        if !(-90.0..=90.0).contains(&self.solar.latitude)
            || !(-180.0..=180.0).contains(&self.solar.longitude)
        {
            return Err(StratusError::config("Solar reference coordinates are out of range").into());
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(StratusError::config("Cache TTL cannot exceed 24 hours").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(StratusError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(StratusError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.metar.base_url.starts_with("http://") && !self.metar.base_url.starts_with("https://") {
            return Err(StratusError::config("METAR base URL must be a valid HTTP or HTTPS URL").into());
        }

        if self.solar.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(StratusError::config(format!(
                "Unknown timezone '{}'",
                self.solar.timezone
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = StratusConfig::default();
        assert_eq!(config.metar.base_url, "https://aviationweather.gov/api/data");
        assert_eq!(config.metar.timeout_seconds, 15);
        assert_eq!(config.stations.bay, "KSFO");
        assert_eq!(config.stations.upwind, "KACV");
        assert_eq!(config.stations.inland, "KSMF");
        assert_eq!(config.window.definition(), WindowDefinition::new(20, 23, 5));
        assert!(config.window.hourly_only);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = StratusConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = StratusConfig::default();
        config.metar.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_short_lookback() {
        let mut config = StratusConfig::default();
        config.metar.lookback_hours = 12;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_station_ids() {
        let mut config = StratusConfig::default();
        config.stations.inland = "SMF".to_string();
        let err = config.validate_stations().unwrap_err();
        assert!(err.to_string().contains("inland"));
        assert!(matches!(
            err.downcast_ref::<StratusError>(),
            Some(StratusError::Validation { .. })
        ));

        let mut config = StratusConfig::default();
        config.stations.inland = config.stations.bay.clone();
        assert!(config.validate_stations().is_err());
    }

    #[test]
    fn test_config_validation_timezone() {
        let mut config = StratusConfig::default();
        config.solar.timezone = "Pacific/Nowhere".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_normalises_stations() {
        let mut config = StratusConfig::default();
        config.stations.bay = " koak ".to_string();
        config.stations.inland = String::new();
        config.apply_defaults();
        assert_eq!(config.stations.bay, "KOAK");
        assert_eq!(config.stations.inland, "KSMF");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[stations]\nbay = \"KOAK\"\n\n[window]\nstart_hour = 19\nend_hour = 23\n\n[cache]\nenabled = false"
        )
        .unwrap();

        let config = StratusConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.stations.bay, "KOAK");
        assert_eq!(config.stations.upwind, "KACV");
        assert_eq!(config.window.start_hour, 19);
        assert!(!config.cache.enabled);
        assert_eq!(config.refresh.interval_minutes, 15);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = StratusConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("stratus-forecast"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
