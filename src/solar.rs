//! Sunrise at a fixed point, for burn-off reporting

use crate::config::SolarConfig;
use crate::{Result, StratusError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Offset of `hours` after an instant, `None` when it does not fit a `TimeDelta`.
#[must_use]
pub fn hours_after(instant: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    let seconds = (hours * 3600.0).round();
    if !seconds.is_finite() || seconds.abs() >= i64::MAX as f64 {
        return None;
    }
    instant.checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}

/// Sunrise for a fixed location
#[derive(Debug, Clone)]
pub struct SolarTimeCalculator {
    latitude: f64,
    longitude: f64,
    timezone: Tz,
}

impl SolarTimeCalculator {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, timezone: Tz) -> Self {
        Self {
            latitude,
            longitude,
            timezone,
        }
    }

    pub fn from_config(config: &SolarConfig) -> Result<Self> {
        let timezone = config
            .timezone
            .parse::<Tz>()
            .map_err(|e| StratusError::config(format!("Unknown timezone '{}': {e}", config.timezone)))?;
        Ok(Self::new(config.latitude, config.longitude, timezone))
    }

    /// Sunrise instant for `date`; `None` for invalid coordinates or when the sun does not rise.
    #[must_use]
    pub fn sunrise(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let coordinates = Coordinates::new(self.latitude, self.longitude)?;
        Option::from(SolarDay::new(coordinates, date).event_time(SolarEvent::Sunrise))
    }

    /// Sunrise as a UTC time of day.
    #[must_use]
    pub fn sunrise_time(&self, date: NaiveDate) -> Option<NaiveTime> {
        self.sunrise(date).map(|instant| instant.time())
    }

    /// First sunrise strictly after `after`, looking up to two days ahead.
    #[must_use]
    pub fn next_sunrise(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = after.date_naive();
        [today, today + Duration::days(1), today + Duration::days(2)]
            .into_iter()
            .filter_map(|date| self.sunrise(date))
            .find(|sunrise| *sunrise > after)
    }

    /// When a deck needing `burn_off_hours` after sunrise should clear.
    #[must_use]
    pub fn burn_off_time(&self, date: NaiveDate, burn_off_hours: f64) -> Option<DateTime<Utc>> {
        hours_after(self.sunrise(date)?, burn_off_hours)
    }

    #[must_use]
    pub fn to_local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }
}

impl Default for SolarTimeCalculator {
    /// San Francisco International
    fn default() -> Self {
        Self::new(37.6189, -122.3750, chrono_tz::America::Los_Angeles)
    }
}
