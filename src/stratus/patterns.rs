//! Synoptic trigger and pattern adjustments
//!
//! Patterns are folded in a fixed order. The surface high depends on whether
//! a thermal low is also present, and the ridge/trough synergies only apply
//! alongside a thermal low.

use crate::models::{SynopticPattern, SynopticPatterns, SynopticTrigger};

/// A trigger never lets onset fall later than this hour (UTC)
pub const TRIGGER_ONSET_CAP_Z: f64 = 3.0;
pub const TRIGGER_FACTOR: f64 = 1.3;

const RIDGE_THERMAL_LOW_SYNERGY: f64 = 1.1;
const TROUGH_THERMAL_LOW_SYNERGY: f64 = 1.15;

/// Order in which patterns are applied and reported
pub const PATTERN_ORDER: [SynopticPattern; 5] = [
    SynopticPattern::ThermalLow,
    SynopticPattern::SurfaceHigh,
    SynopticPattern::UpperRidge,
    SynopticPattern::UpperTrough,
    SynopticPattern::CutoffLow,
];

/// Effect of one active pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PatternEffect {
    pub pattern: SynopticPattern,
    pub probability_factor: f64,
    /// Negative values bring onset earlier
    pub onset_shift_hours: f64,
    pub description: String,
}

/// Accumulated effect of every active pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PatternAdjustment {
    pub probability_factor: f64,
    pub onset_shift_hours: f64,
    pub effects: Vec<PatternEffect>,
}

impl Default for PatternAdjustment {
    fn default() -> Self {
        Self {
            probability_factor: 1.0,
            onset_shift_hours: 0.0,
            effects: Vec::new(),
        }
    }
}

fn effect(pattern: SynopticPattern, factor: f64, shift: f64, note: &str) -> PatternEffect {
    let timing = if shift == 0.0 {
        "no timing change".to_string()
    } else {
        format!("onset {shift:+.1} h")
    };
    PatternEffect {
        pattern,
        probability_factor: factor,
        onset_shift_hours: shift,
        description: format!("{pattern}: {note} (x{factor:.2}, {timing})"),
    }
}

/// Effect of `pattern` given the full set of active patterns.
#[must_use]
pub fn pattern_effect(pattern: SynopticPattern, active: &SynopticPatterns) -> PatternEffect {
    match pattern {
        SynopticPattern::ThermalLow => effect(pattern, 1.25, -1.0, "inland heating strengthens the sea breeze"),
        SynopticPattern::SurfaceHigh if active.thermal_low => {
            effect(pattern, 1.15, -0.5, "offshore high with thermal low tightens onshore flow")
        }
        SynopticPattern::SurfaceHigh => effect(pattern, 0.85, 0.5, "subsidence without a thermal low thins the layer"),
        SynopticPattern::UpperRidge if active.thermal_low => effect(
            pattern,
            0.85 * RIDGE_THERMAL_LOW_SYNERGY,
            1.0,
            "compressed marine layer, partly offset by thermal low synergy",
        ),
        SynopticPattern::UpperRidge => effect(pattern, 0.85, 1.0, "compressed marine layer"),
        SynopticPattern::UpperTrough if active.thermal_low => effect(
            pattern,
            1.3 * TROUGH_THERMAL_LOW_SYNERGY,
            -1.0,
            "deepened marine layer, reinforced by thermal low synergy",
        ),
        SynopticPattern::UpperTrough => effect(pattern, 1.3, -1.0, "deepened marine layer"),
        SynopticPattern::CutoffLow => effect(pattern, 1.2, -0.5, "cyclonic lift deepens the layer"),
    }
}

/// Fold all active patterns into one adjustment.
#[must_use]
pub fn fold_patterns(active: &SynopticPatterns) -> PatternAdjustment {
    PATTERN_ORDER
        .into_iter()
        .filter(|pattern| active.is_active(*pattern))
        .map(|pattern| pattern_effect(pattern, active))
        .fold(PatternAdjustment::default(), |mut acc, effect| {
            acc.probability_factor *= effect.probability_factor;
            acc.onset_shift_hours += effect.onset_shift_hours;
            acc.effects.push(effect);
            acc
        })
}

/// Description used in warnings and reasoning for an active trigger
#[must_use]
pub fn trigger_description(trigger: SynopticTrigger) -> String {
    format!("Synoptic trigger ({trigger}): onset no later than 0300Z, x{TRIGGER_FACTOR:.1}")
}
