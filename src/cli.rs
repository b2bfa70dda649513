use crate::models::{SynopticPattern, SynopticPatterns, SynopticTrigger, WindObservation};
use crate::refresh::ManualInputs;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TriggerArg {
    DeepeningTrough,
    ShortwaveTrough,
    LongwaveTrough,
    ShallowFront,
}

impl From<TriggerArg> for SynopticTrigger {
    fn from(arg: TriggerArg) -> Self {
        match arg {
            TriggerArg::DeepeningTrough => SynopticTrigger::DeepeningTrough,
            TriggerArg::ShortwaveTrough => SynopticTrigger::ShortwaveTrough,
            TriggerArg::LongwaveTrough => SynopticTrigger::LongwaveTrough,
            TriggerArg::ShallowFront => SynopticTrigger::ShallowFront,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum PatternArg {
    ThermalLow,
    SurfaceHigh,
    UpperRidge,
    UpperTrough,
    CutoffLow,
}

impl From<PatternArg> for SynopticPattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::ThermalLow => SynopticPattern::ThermalLow,
            PatternArg::SurfaceHigh => SynopticPattern::SurfaceHigh,
            PatternArg::UpperRidge => SynopticPattern::UpperRidge,
            PatternArg::UpperTrough => SynopticPattern::UpperTrough,
            PatternArg::CutoffLow => SynopticPattern::CutoffLow,
        }
    }
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "stratus-forecast",
    version,
    about = "Overnight marine stratus forecast for the San Francisco Bay"
)]
pub struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the full outcome as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep refreshing on the configured interval
    #[arg(long)]
    pub watch: bool,

    /// Marine inversion base, ft
    #[arg(long, default_value_t = 1500.0)]
    pub inversion_ft: f64,

    /// Stratus cloud base, ft
    #[arg(long, default_value_t = 800.0)]
    pub cloud_base_ft: f64,

    /// 2000 ft wind direction, degrees true
    #[arg(long, default_value_t = 180.0)]
    pub wind_dir: f64,

    /// 2000 ft wind speed, kt
    #[arg(long, default_value_t = 5.0)]
    pub wind_kt: f64,

    /// Minimum afternoon dewpoint, °F
    #[arg(long, default_value_t = 55.0)]
    pub min_dewpoint_f: f64,

    /// Month used for gradient thresholds (default: current month)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Synoptic trigger expected tonight
    #[arg(long, value_enum)]
    pub trigger: Option<TriggerArg>,

    /// Active synoptic pattern (repeatable)
    #[arg(long = "pattern", value_enum)]
    pub patterns: Vec<PatternArg>,

    /// Override the afternoon maximum temperature, °F
    #[arg(long)]
    pub max_temp_f: Option<f64>,

    /// Override the afternoon maximum dewpoint, °F
    #[arg(long)]
    pub max_dewpoint_f: Option<f64>,

    /// Override the onshore gradient, mb
    #[arg(long, allow_negative_numbers = true)]
    pub onshore_mb: Option<f64>,

    /// Override the offshore gradient, mb
    #[arg(long, allow_negative_numbers = true)]
    pub offshore_mb: Option<f64>,
}

impl Cli {
    #[must_use]
    pub fn manual_inputs(&self) -> ManualInputs {
        ManualInputs {
            inversion_base_ft: self.inversion_ft,
            cloud_base_ft: self.cloud_base_ft,
            wind_2000ft: WindObservation {
                direction_deg: self.wind_dir,
                speed_kt: self.wind_kt,
            },
            min_afternoon_dewpoint_f: self.min_dewpoint_f,
            month: self.month,
            trigger: self.trigger.map(SynopticTrigger::from),
            patterns: self.patterns.iter().copied().map(SynopticPattern::from).collect::<SynopticPatterns>(),
            max_temp_f: self.max_temp_f,
            max_dewpoint_f: self.max_dewpoint_f,
            onshore_gradient_mb: self.onshore_mb,
            offshore_gradient_mb: self.offshore_mb,
        }
    }
}
