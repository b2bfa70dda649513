//! Temperature and pressure unit conversions

/// Millibars per inch of mercury
pub const MB_PER_INHG: f64 = 33.8639;

/// Round `value` to `decimals` decimal places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[must_use]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Whole-degree conversion used for reported temperatures.
#[must_use]
pub fn celsius_to_fahrenheit_rounded(celsius: f64) -> f64 {
    celsius_to_fahrenheit(celsius).round()
}

#[must_use]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Inches of mercury to millibars, one decimal.
#[must_use]
pub fn inhg_to_mb(inhg: f64) -> f64 {
    round_to(inhg * MB_PER_INHG, 1)
}

/// Millibars to inches of mercury, two decimals.
#[must_use]
pub fn mb_to_inhg(mb: f64) -> f64 {
    round_to(mb / MB_PER_INHG, 2)
}
