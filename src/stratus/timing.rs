//! Empirical lookup tables: onset/end timing by stratus index, and monthly gradient thresholds

use chrono::Month;

/// One row of the timing table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingRow {
    pub stratus_index: u8,
    /// Typical onset, hour UTC
    pub onset_hour_z: f64,
    /// Typical clearing, hour UTC
    pub end_hour_z: f64,
    /// Climatological chance of no ceiling, percent
    pub no_ceiling_pct: f64,
}

const fn row(stratus_index: u8, onset_hour_z: f64, end_hour_z: f64, no_ceiling_pct: f64) -> TimingRow {
    TimingRow {
        stratus_index,
        onset_hour_z,
        end_hour_z,
        no_ceiling_pct,
    }
}

/// Sorted by stratus index, 9 through 25
pub const TIMING_TABLE: [TimingRow; 17] = [
    row(9, 3.0, 19.0, 5.0),
    row(10, 3.5, 19.0, 6.0),
    row(11, 4.0, 18.5, 7.5),
    row(12, 5.0, 18.5, 9.0),
    row(13, 5.5, 18.0, 11.0),
    row(14, 6.5, 18.0, 13.0),
    row(15, 7.0, 17.5, 15.0),
    row(16, 8.0, 17.5, 17.5),
    row(17, 9.0, 17.0, 20.0),
    row(18, 9.5, 17.0, 24.0),
    row(19, 10.0, 16.5, 28.0),
    row(20, 11.0, 16.5, 33.0),
    row(21, 11.5, 16.0, 38.0),
    row(22, 12.0, 16.0, 44.0),
    row(23, 12.5, 15.5, 50.0),
    row(24, 13.0, 15.5, 57.0),
    row(25, 13.5, 15.0, 65.0),
];

/// Row for `stratus_index`: the last row at or below it, clamped to the table ends.
#[must_use]
pub fn lookup(stratus_index: f64) -> &'static TimingRow {
    let at_or_below = TIMING_TABLE.partition_point(|row| f64::from(row.stratus_index) <= stratus_index);
    &TIMING_TABLE[at_or_below.saturating_sub(1)]
}

/// Gradient limits for one calendar month
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyThresholds {
    pub month: Month,
    /// Onshore gradient below this suppresses stratus
    pub onshore_min_mb: f64,
    /// Offshore gradient above this (less negative) suppresses stratus
    pub offshore_max_mb: f64,
}

const ONSHORE_MIN_MB: [f64; 12] = [1.6, 1.8, 2.0, 2.4, 2.8, 3.0, 3.2, 3.0, 2.6, 2.2, 1.8, 1.6];
const OFFSHORE_MAX_MB: [f64; 12] = [-2.5, -2.5, -2.2, -2.0, -1.6, -1.4, -1.2, -1.4, -1.8, -2.0, -2.4, -2.5];

/// Thresholds for `month` (1-12; out of range values clamp).
#[must_use]
pub fn monthly_thresholds(month: u32) -> MonthlyThresholds {
    let month = month.clamp(1, 12);
    let idx = (month - 1) as usize;
    MonthlyThresholds {
        month: Month::try_from(month as u8).unwrap_or(Month::January),
        onshore_min_mb: ONSHORE_MIN_MB[idx],
        offshore_max_mb: OFFSHORE_MAX_MB[idx],
    }
}
