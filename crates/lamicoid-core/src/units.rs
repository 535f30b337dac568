//! Lengths and their units
//!
//! Label geometry is stored in millimetres. Layout happens in editing pixels
//! at [`DEFAULT_DPI`], and font sizes are given in typographic points.
//! Lengths typed by a user may be metric or imperial, decimal or fractional.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Typographic points per inch
pub const POINTS_PER_INCH: f64 = 72.0;

/// Resolution of the editing space in pixels per inch
pub const DEFAULT_DPI: f64 = 96.0;

/// Units in which a user enters and reads lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Millimetres
    #[default]
    Metric,
    /// Inches
    Imperial,
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("'{}' is neither metric nor imperial", s)),
        }
    }
}

/// Editing pixels per millimetre at the given resolution
pub fn px_per_mm(dpi: f64) -> f64 {
    dpi / MM_PER_INCH
}

/// Convert millimetres to editing pixels at [`DEFAULT_DPI`]
pub fn mm_to_px(mm: f64) -> f64 {
    mm * px_per_mm(DEFAULT_DPI)
}

/// Convert editing pixels at [`DEFAULT_DPI`] to millimetres
pub fn px_to_mm(px: f64) -> f64 {
    px / px_per_mm(DEFAULT_DPI)
}

/// Convert typographic points to millimetres
pub fn pt_to_mm(pt: f64) -> f64 {
    pt / POINTS_PER_INCH * MM_PER_INCH
}

/// Convert typographic points to editing pixels at [`DEFAULT_DPI`]
pub fn pt_to_px(pt: f64) -> f64 {
    pt / POINTS_PER_INCH * DEFAULT_DPI
}

/// A millimetre length in `system` units, three decimals.
pub fn format_length(value_mm: f64, system: MeasurementSystem) -> String {
    match system {
        MeasurementSystem::Metric => format!("{:.3}", value_mm),
        MeasurementSystem::Imperial => format!("{:.3}", value_mm / MM_PER_INCH),
    }
}

/// Reads a user-typed length and returns millimetres.
///
/// A trailing `mm`, `in` or `"` picks the unit; otherwise `system` does.
/// Inch values may be mixed fractions such as `1 1/2in`. Blank input is zero.
pub fn parse_length(input: &str, system: MeasurementSystem) -> Result<f64, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0.0);
    }

    let (number, system) = match input.strip_suffix("mm") {
        Some(rest) => (rest.trim(), MeasurementSystem::Metric),
        None => match input
            .strip_suffix("in")
            .or_else(|| input.strip_suffix('"'))
        {
            Some(rest) => (rest.trim(), MeasurementSystem::Imperial),
            None => (input, system),
        },
    };

    match system {
        MeasurementSystem::Metric => parse_number(number),
        MeasurementSystem::Imperial => {
            let inches = number
                .split_whitespace()
                .map(parse_inch_term)
                .sum::<Result<f64, String>>()?;
            Ok(inches * MM_PER_INCH)
        }
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", text))
}

/// One whitespace-separated term of an inch value: `3`, `0.25` or `3/8`.
fn parse_inch_term(term: &str) -> Result<f64, String> {
    let Some((numerator, denominator)) = term.split_once('/') else {
        return parse_number(term);
    };
    if denominator.contains('/') {
        return Err(format!("'{}' has more than one '/'", term));
    }
    let denominator = parse_number(denominator)?;
    if denominator == 0.0 {
        return Err(format!("'{}' divides by zero", term));
    }
    Ok(parse_number(numerator)? / denominator)
}
