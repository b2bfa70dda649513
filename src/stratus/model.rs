//! Marine stratus forecast model
//!
//! A pure function of [`ForecastInputs`]. The base probability comes from the
//! timing table and is then multiplied by each stage in turn:
//!
//! 1. timing lookup by stratus index
//! 2. shallow-inversion early exit
//! 3. afternoon dewpoint
//! 4. monthly onshore-gradient threshold
//! 5. monthly offshore-gradient threshold
//! 6. strong gradient bonus/penalty with trend timing
//! 7. low inversion secondary effect
//! 8. synoptic trigger
//! 9. synoptic patterns
//! 10. 2000 ft wind
//! 11. confidence refinement (and upstream data caveats)
//! 12. clamping, rounding and windows

use crate::models::{Confidence, ForecastInputs, ForecastResult, TimeWindow};
use crate::stratus::patterns::{self, TRIGGER_FACTOR, TRIGGER_ONSET_CAP_Z};
use crate::stratus::timing::{self, MonthlyThresholds};

/// Inversion base below which no stratus forms
pub const MIN_INVERSION_FT: f64 = 500.0;
pub const MIN_PROBABILITY_PCT: f64 = 5.0;
pub const MAX_PROBABILITY_PCT: f64 = 95.0;

/// Rate at which the deck thins after sunrise
pub const BURN_OFF_FT_PER_HOUR: f64 = 200.0;

const DEWPOINT_MILD_PENALTY_F: f64 = 45.0;
const DEWPOINT_SEVERE_PENALTY_F: f64 = 42.0;
const GRADIENT_BUFFER_MB: f64 = 0.5;
const STRONG_ONSHORE_MB: f64 = 3.6;
const STRONG_OFFSHORE_MB: f64 = 3.4;
const LOW_INVERSION_FT: f64 = 1200.0;
const VERY_LOW_INVERSION_FT: f64 = 1000.0;

/// Running state threaded through the adjustment stages
struct Adjustment {
    probability: f64,
    onset_hour_z: f64,
    confidence: Confidence,
    /// Set once a stage forces High; later caveats cannot lower it
    confidence_forced: bool,
    warnings: Vec<String>,
    reasoning: Vec<String>,
}

impl Adjustment {
    fn apply(&mut self, factor: f64, reason: String) {
        self.probability *= factor;
        self.reasoning.push(format!("{reason} x{factor:.2}"));
    }

    fn force_high(&mut self) {
        self.confidence = Confidence::High;
        self.confidence_forced = true;
    }
}

/// Hours the deck needs to burn off after sunrise.
#[must_use]
pub fn burn_off_hours(inversion_base_ft: f64, cloud_base_ft: f64) -> f64 {
    ((inversion_base_ft - cloud_base_ft) / BURN_OFF_FT_PER_HOUR).max(0.0)
}

fn round_to_half_hour(hour: f64) -> f64 {
    (hour * 2.0).round() / 2.0
}

fn normalize_hour(hour: f64) -> f64 {
    hour.rem_euclid(24.0)
}

fn window_around(hour: f64, half_width: f64) -> TimeWindow {
    TimeWindow {
        earliest: normalize_hour(hour - half_width),
        latest: normalize_hour(hour + half_width),
        most_probable: normalize_hour(hour),
    }
}

/// Multiplier for a low afternoon dewpoint; `None` when no penalty applies.
fn dewpoint_factor(dewpoint_f: f64) -> Option<f64> {
    if dewpoint_f >= DEWPOINT_MILD_PENALTY_F {
        None
    } else if dewpoint_f >= DEWPOINT_SEVERE_PENALTY_F {
        Some(0.3 + 0.7 * (dewpoint_f - DEWPOINT_SEVERE_PENALTY_F) / 3.0)
    } else {
        let severity = ((DEWPOINT_SEVERE_PENALTY_F - dewpoint_f) / 8.0).min(1.0);
        Some((0.3 * (1.0 - severity).powi(2)).max(0.05))
    }
}

/// Penalty for a margin (positive = favourable side of the threshold).
fn threshold_factor(margin: f64, floor: f64) -> Option<f64> {
    if margin >= GRADIENT_BUFFER_MB {
        None
    } else if margin >= 0.0 {
        Some(0.85 + 0.15 * margin / GRADIENT_BUFFER_MB)
    } else {
        Some((0.85 * (1.0 - margin).powi(-2)).max(floor))
    }
}

/// Probability factor and onset delay (hours) for a low but usable inversion.
fn inversion_effect(inversion_base_ft: f64) -> Option<(f64, f64)> {
    if inversion_base_ft >= LOW_INVERSION_FT {
        None
    } else if inversion_base_ft >= VERY_LOW_INVERSION_FT {
        let depth = (inversion_base_ft - VERY_LOW_INVERSION_FT) / (LOW_INVERSION_FT - VERY_LOW_INVERSION_FT);
        Some((0.8 + 0.2 * depth, 1.0 - depth))
    } else {
        let depth = (inversion_base_ft - MIN_INVERSION_FT) / (VERY_LOW_INVERSION_FT - MIN_INVERSION_FT);
        Some((0.6 + 0.2 * depth, 2.0 - depth))
    }
}

fn no_event(inputs: &ForecastInputs, stratus_index: f64, base_probability_pct: f64) -> ForecastResult {
    ForecastResult {
        stratus_index,
        base_probability_pct,
        onset_window: None,
        end_window: None,
        burn_off_hours: 0.0,
        probability_pct: MIN_PROBABILITY_PCT,
        confidence: Confidence::High,
        warnings: vec![format!(
            "Inversion base {:.0} ft is below {MIN_INVERSION_FT:.0} ft: marine layer too shallow for stratus",
            inputs.inversion_base_ft
        )],
        pattern_effects: Vec::new(),
        reasoning: format!(
            "SI {stratus_index:.1}; inversion below {MIN_INVERSION_FT:.0} ft, no stratus expected"
        ),
    }
}

fn apply_dewpoint(adj: &mut Adjustment, dewpoint_f: f64) {
    let Some(factor) = dewpoint_factor(dewpoint_f) else {
        return;
    };
    adj.apply(factor, format!("afternoon dewpoint {dewpoint_f:.0}F"));
    if dewpoint_f < DEWPOINT_SEVERE_PENALTY_F {
        adj.warnings.push(format!(
            "Very dry afternoon air (dewpoint {dewpoint_f:.0}F below {DEWPOINT_SEVERE_PENALTY_F:.0}F) strongly suppresses stratus"
        ));
        adj.force_high();
    } else {
        adj.warnings.push(format!(
            "Dry afternoon air (dewpoint {dewpoint_f:.0}F below {DEWPOINT_MILD_PENALTY_F:.0}F) reduces stratus chances"
        ));
    }
}

fn apply_monthly_thresholds(adj: &mut Adjustment, inputs: &ForecastInputs, limits: &MonthlyThresholds) {
    let month = limits.month.name();

    let onshore_margin = inputs.onshore_gradient_mb - limits.onshore_min_mb;
    if let Some(factor) = threshold_factor(onshore_margin, 0.1) {
        adj.apply(factor, format!("onshore gradient vs {month} minimum"));
        adj.warnings.push(if onshore_margin >= 0.0 {
            format!(
                "Onshore gradient {:.1} mb is only {onshore_margin:.1} mb above the {month} minimum of {:.1} mb",
                inputs.onshore_gradient_mb, limits.onshore_min_mb
            )
        } else {
            format!(
                "Onshore gradient {:.1} mb is {:.1} mb below the {month} minimum of {:.1} mb",
                inputs.onshore_gradient_mb, -onshore_margin, limits.onshore_min_mb
            )
        });
    }

    let offshore_margin = limits.offshore_max_mb - inputs.offshore_gradient_mb;
    if let Some(factor) = threshold_factor(offshore_margin, 0.05) {
        adj.apply(factor, format!("offshore gradient vs {month} maximum"));
        adj.warnings.push(if offshore_margin >= 0.0 {
            format!(
                "Offshore gradient {:.1} mb is within {offshore_margin:.1} mb of the {month} maximum of {:.1} mb",
                inputs.offshore_gradient_mb, limits.offshore_max_mb
            )
        } else {
            format!(
                "Offshore gradient {:.1} mb exceeds the {month} maximum of {:.1} mb by {:.1} mb",
                inputs.offshore_gradient_mb, limits.offshore_max_mb, -offshore_margin
            )
        });
    }
}

fn apply_strong_gradients(adj: &mut Adjustment, inputs: &ForecastInputs) {
    if inputs.onshore_gradient_mb >= STRONG_ONSHORE_MB {
        adj.apply(1.2, format!("strong onshore gradient {:.1} mb", inputs.onshore_gradient_mb));
        if let Some(trend) = inputs.onshore_trend_mb.filter(|t| *t > 0.0) {
            adj.onset_hour_z -= trend;
            adj.reasoning.push(format!("rising onshore trend, onset {trend:.1} h earlier"));
        }
    }

    if inputs.offshore_gradient_mb >= STRONG_OFFSHORE_MB {
        adj.apply(0.7, format!("strong offshore gradient {:.1} mb", inputs.offshore_gradient_mb));
        adj.warnings.push(format!(
            "Strong offshore gradient {:.1} mb works against the marine layer",
            inputs.offshore_gradient_mb
        ));
        if let Some(trend) = inputs.offshore_trend_mb.filter(|t| *t > 0.0) {
            adj.onset_hour_z += trend;
            adj.reasoning.push(format!("rising offshore trend, onset {trend:.1} h later"));
        }
    }
}

fn apply_inversion(adj: &mut Adjustment, inversion_base_ft: f64) {
    let Some((factor, delay)) = inversion_effect(inversion_base_ft) else {
        return;
    };
    adj.apply(factor, format!("low inversion {inversion_base_ft:.0} ft"));
    adj.onset_hour_z += delay;
    adj.warnings.push(format!(
        "Low inversion base ({inversion_base_ft:.0} ft) limits the marine layer; onset delayed {delay:.1} h"
    ));
}

fn apply_wind(adj: &mut Adjustment, direction_deg: f64, speed_kt: f64) {
    let direction = direction_deg.rem_euclid(360.0);
    if (240.0..=300.0).contains(&direction) && speed_kt > 10.0 {
        adj.onset_hour_z -= 1.0;
        adj.apply(1.1, format!("2000 ft wind {direction:.0}/{speed_kt:.0} kt, onset 1 h earlier"));
    }
}

/// Run the forecast model.
#[must_use]
pub fn forecast(inputs: &ForecastInputs) -> ForecastResult {
    let stratus_index = inputs.stratus_index();
    let row = timing::lookup(stratus_index);
    let base_probability_pct = 100.0 - row.no_ceiling_pct;

    if inputs.inversion_base_ft < MIN_INVERSION_FT {
        return no_event(inputs, stratus_index, base_probability_pct);
    }

    let mut adj = Adjustment {
        probability: base_probability_pct,
        onset_hour_z: row.onset_hour_z,
        confidence: Confidence::Medium,
        confidence_forced: false,
        warnings: Vec::new(),
        reasoning: vec![format!(
            "SI {stratus_index:.1} (row {}): onset {}, end {}, base {base_probability_pct:.0}%",
            row.stratus_index,
            TimeWindow::format_hour(row.onset_hour_z),
            TimeWindow::format_hour(row.end_hour_z)
        )],
    };

    apply_dewpoint(&mut adj, inputs.min_afternoon_dewpoint_f);
    apply_monthly_thresholds(&mut adj, inputs, &timing::monthly_thresholds(inputs.month));
    apply_strong_gradients(&mut adj, inputs);
    apply_inversion(&mut adj, inputs.inversion_base_ft);

    if let Some(trigger) = inputs.trigger {
        adj.onset_hour_z = adj.onset_hour_z.min(TRIGGER_ONSET_CAP_Z);
        adj.apply(TRIGGER_FACTOR, patterns::trigger_description(trigger));
        adj.force_high();
    }

    let pattern_adjustment = patterns::fold_patterns(&inputs.patterns);
    if !pattern_adjustment.effects.is_empty() {
        adj.onset_hour_z += pattern_adjustment.onset_shift_hours;
        adj.apply(pattern_adjustment.probability_factor, "synoptic patterns".to_string());
    }

    apply_wind(&mut adj, inputs.wind_2000ft.direction_deg, inputs.wind_2000ft.speed_kt);

    if !(10.0..=22.0).contains(&stratus_index) {
        adj.force_high();
    }

    if !inputs.data_caveats.is_empty() {
        adj.warnings
            .extend(inputs.data_caveats.iter().map(|caveat| format!("Data caveat: {caveat}")));
        if !adj.confidence_forced {
            adj.confidence = Confidence::Low;
        }
    }

    let probability_pct = if adj.probability.is_finite() {
        adj.probability.clamp(MIN_PROBABILITY_PCT, MAX_PROBABILITY_PCT).round()
    } else {
        MIN_PROBABILITY_PCT
    };
    let onset = round_to_half_hour(adj.onset_hour_z);
    let end = round_to_half_hour(row.end_hour_z);

    adj.reasoning.push(format!(
        "final {probability_pct:.0}% ({} confidence)",
        adj.confidence
    ));

    ForecastResult {
        stratus_index,
        base_probability_pct,
        onset_window: Some(window_around(onset, 1.0)),
        end_window: Some(window_around(end, 0.5)),
        burn_off_hours: burn_off_hours(inputs.inversion_base_ft, inputs.cloud_base_ft),
        probability_pct,
        confidence: adj.confidence,
        warnings: adj.warnings,
        pattern_effects: pattern_adjustment
            .effects
            .into_iter()
            .map(|effect| effect.description)
            .collect(),
        reasoning: adj.reasoning.join("; "),
    }
}
