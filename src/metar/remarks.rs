//! METAR remarks decoding
//!
//! Pulls the precise temperature/dewpoint group, sea-level pressure and
//! altimeter setting out of a raw report. Missing or malformed groups decode
//! to `None`; decoding never fails.

use crate::models::DecodedRemarks;
use crate::units::{celsius_to_fahrenheit_rounded, inhg_to_mb, round_to};
use regex::Regex;
use std::sync::LazyLock;

static REMARKS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)RMK(?:\s|$)").expect("valid regex"));

static TEMP_DEWPOINT_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)T([01])(\d{3})([01])(\d{3})(?:\s|$)").expect("valid regex"));

static SLP_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)SLP(\d{3})(?:\s|$)").expect("valid regex"));

static ALTIMETER_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)A(\d{4})(?:\s|$)").expect("valid regex"));

/// Decode the remarks of one raw report.
#[must_use]
pub fn decode(raw_text: &str) -> DecodedRemarks {
    let Some(marker) = REMARKS_MARKER.find(raw_text) else {
        return DecodedRemarks::default();
    };
    let (body, remarks) = raw_text.split_at(marker.start());

    let (max_temp_f, max_dewpoint_f) = decode_temperature_group(remarks).unzip();

    DecodedRemarks {
        max_temp_f,
        max_dewpoint_f,
        sea_level_pressure_mb: decode_sea_level_pressure(remarks),
        altimeter_mb: decode_altimeter(body).or_else(|| decode_altimeter(remarks)),
    }
}

/// `TsTTTsDDD`: sign digit (1 = negative) then tenths of °C, for temperature and dewpoint.
fn decode_temperature_group(remarks: &str) -> Option<(f64, f64)> {
    let caps = TEMP_DEWPOINT_GROUP.captures(remarks)?;
    let temp_c = signed_tenths(&caps[1], &caps[2])?;
    let dewpoint_c = signed_tenths(&caps[3], &caps[4])?;
    Some((
        celsius_to_fahrenheit_rounded(temp_c),
        celsius_to_fahrenheit_rounded(dewpoint_c),
    ))
}

fn signed_tenths(sign: &str, digits: &str) -> Option<f64> {
    let magnitude = f64::from(digits.parse::<u16>().ok()?) / 10.0;
    Some(if sign == "1" { -magnitude } else { magnitude })
}

/// Three digits of tenths of a millibar with the leading 9 or 10 dropped.
fn decode_sea_level_pressure(remarks: &str) -> Option<f64> {
    let caps = SLP_GROUP.captures(remarks)?;
    let value = f64::from(caps[1].parse::<u16>().ok()?);
    let hundreds = if value < 500.0 { 1000.0 } else { 900.0 };
    Some(round_to(hundreds + value / 10.0, 1))
}

fn decode_altimeter(text: &str) -> Option<f64> {
    let caps = ALTIMETER_GROUP.captures(text)?;
    let hundredths = f64::from(caps[1].parse::<u16>().ok()?);
    Some(inhg_to_mb(hundredths / 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SFO_REPORT: &str = "METAR KSFO 212156Z 29014KT 10SM FEW008 18/12 A2990 RMK AO2 SLP124 T01830117";

    #[test]
    fn test_decodes_full_report() {
        let decoded = decode(SFO_REPORT);
        assert_eq!(decoded.max_temp_f, Some(65.0));
        assert_eq!(decoded.max_dewpoint_f, Some(53.0));
        assert_eq!(decoded.sea_level_pressure_mb, Some(1012.4));
        assert_eq!(decoded.altimeter_mb, Some(1012.5));
    }

    #[test]
    fn test_negative_dewpoint_group() {
        let decoded = decode("KSMF 151253Z 00000KT 14/M08 A3001 RMK AO2 T01391083");
        assert_eq!(decoded.max_temp_f, Some(57.0));
        assert_eq!(decoded.max_dewpoint_f, Some(17.0));
    }

    #[test]
    fn test_negative_temperature_group() {
        let decoded = decode("KXYZ 010053Z RMK T11721200");
        assert_eq!(decoded.max_temp_f, Some(1.0));
        assert_eq!(decoded.max_dewpoint_f, Some(-4.0));
    }

    #[rstest]
    #[case("KSFO 011956Z RMK AO2 SLP146", Some(1014.6))]
    #[case("KSFO 011956Z RMK AO2 SLP523", Some(952.3))]
    #[case("KSFO 011956Z RMK AO2 SLP499", Some(1049.9))]
    #[case("KSFO 011956Z RMK AO2 SLP500", Some(950.0))]
    #[case("KSFO 011956Z RMK AO2 SLP000", Some(1000.0))]
    #[case("KSFO 011956Z RMK AO2 SLPNO", None)]
    fn test_sea_level_pressure(#[case] text: &str, #[case] expected: Option<f64>) {
        assert_eq!(decode(text).sea_level_pressure_mb, expected);
    }

    #[test]
    fn test_no_remarks_marker_yields_all_absent() {
        let decoded = decode("METAR KSFO 212156Z 29014KT 10SM FEW008 18/12 A2990 SLP124 T01830117");
        assert_eq!(decoded, DecodedRemarks::default());
        assert_eq!(decoded.best_pressure_mb(), None);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(decode(""), DecodedRemarks::default());
    }

    #[test]
    fn test_missing_groups_stay_absent() {
        let decoded = decode("KACV 212153Z 33012KT 10SM CLR 15/09 A3002 RMK AO2");
        assert_eq!(decoded.max_temp_f, None);
        assert_eq!(decoded.max_dewpoint_f, None);
        assert_eq!(decoded.sea_level_pressure_mb, None);
        assert_eq!(decoded.altimeter_mb, Some(1016.6));
        assert_eq!(decoded.best_pressure_mb(), Some(1016.6));
    }

    #[test]
    fn test_malformed_temperature_group_is_ignored() {
        let decoded = decode("KSFO 011956Z RMK AO2 T0183111 T2183111");
        assert_eq!(decoded.max_temp_f, None);
        assert_eq!(decoded.max_dewpoint_f, None);
    }

    #[test]
    fn test_sea_level_pressure_preferred_over_altimeter() {
        let decoded = decode(SFO_REPORT);
        assert_eq!(decoded.best_pressure_mb(), Some(1012.4));
    }

    #[test]
    fn test_groups_before_marker_are_not_remarks() {
        let decoded = decode("KSFO 011956Z SLP146 T01391083 RMK AO2");
        assert_eq!(decoded.sea_level_pressure_mb, None);
        assert_eq!(decoded.max_temp_f, None);
    }
}
