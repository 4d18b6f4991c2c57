use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// An over/under threshold. Always ends in `.5`, never below `0.5`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Line(f64);

impl Line {
    pub const MIN: Line = Line(0.5);

    /// Inputs from here on have no room left for the `.5` (2^52).
    const UPPER_BOUND: f64 = 4_503_599_627_370_496.0;

    /// Snap an arbitrary non-negative value onto the half-integer grid:
    /// `10` → `10.5`, `10.3` → `10.5`, `10.5` → `10.5`.
    ///
    /// Returns `None` for negative or non-finite input, and for values too
    /// large to carry a half.
    pub fn normalize(value: f64) -> Option<Line> {
        if !value.is_finite() || !(0.0..Self::UPPER_BOUND).contains(&value) {
            return None;
        }
        Some(Line((value.trunc() + 0.5).max(Self::MIN.0)))
    }

    /// Construct from a value already known to be a half-integer (e.g. the
    /// output of the line suggester).
    pub(crate) fn from_half(value: f64) -> Line {
        debug_assert!((value.fract() - 0.5).abs() < 1e-9, "not a half-integer: {value}");
        Line(value.max(Self::MIN.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Next line up, one whole unit higher.
    pub fn step_up(self) -> Line {
        Line((self.0 + 1.0).floor() + 0.5)
    }

    /// Next line down, one whole unit lower, never below `0.5`.
    pub fn step_down(self) -> Line {
        Line(((self.0 - 1.0).floor() + 0.5).max(Self::MIN.0))
    }
}

impl FromStr for Line {
    type Err = ParseError;

    /// Accepts `10`, `10.` and `10.5` style input; anything with a sign,
    /// exponent or non-digit is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let (int_part, frac_part) = match raw.split_once('.') {
            Some((i, f)) => (i, f),
            None => (raw, ""),
        };
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if int_part.is_empty() || !digits_only(int_part) || !digits_only(frac_part) {
            return Err(ParseError::InvalidLine(s.to_string()));
        }
        let value: f64 = int_part
            .parse()
            .map_err(|_| ParseError::InvalidLine(s.to_string()))?;
        Line::normalize(value).ok_or_else(|| ParseError::InvalidLine(s.to_string()))
    }
}

impl TryFrom<f64> for Line {
    type Error = ParseError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Line::normalize(value).ok_or_else(|| ParseError::InvalidLine(value.to_string()))
    }
}

impl From<Line> for f64 {
    fn from(line: Line) -> f64 {
        line.0
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_whole_number_becomes_half_line() {
        assert_relative_eq!(Line::normalize(10.0).unwrap().value(), 10.5);
        assert_relative_eq!(Line::normalize(0.0).unwrap().value(), 0.5);
    }

    #[test]
    fn test_arbitrary_decimal_snaps_to_its_half_line() {
        assert_relative_eq!(Line::normalize(10.3).unwrap().value(), 10.5);
        assert_relative_eq!(Line::normalize(10.9).unwrap().value(), 10.5);
        assert_relative_eq!(Line::normalize(10.5).unwrap().value(), 10.5);
    }

    #[test]
    fn test_negative_or_nan_rejected() {
        assert!(Line::normalize(-1.0).is_none());
        assert!(Line::normalize(f64::NAN).is_none());
        assert!(Line::normalize(f64::INFINITY).is_none());
    }

    #[test]
    fn test_parse_accepts_dashboard_input() {
        assert_relative_eq!("10".parse::<Line>().unwrap().value(), 10.5);
        assert_relative_eq!("10.".parse::<Line>().unwrap().value(), 10.5);
        assert_relative_eq!("8.5".parse::<Line>().unwrap().value(), 8.5);
        assert_relative_eq!(" 7.2 ".parse::<Line>().unwrap().value(), 7.5);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "abc", "-3", "1e3", ".5", "3.5.5", "4,5"] {
            assert!(bad.parse::<Line>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_values_too_large_for_a_half_are_rejected() {
        assert!("123456789012345678".parse::<Line>().is_err());
        assert!(Line::normalize(4_503_599_627_370_496.0).is_none());
        let largest = Line::normalize(4_503_599_627_370_495.0).unwrap();
        assert_eq!(largest.value().fract(), 0.5);
    }

    #[test]
    fn test_stepping_keeps_half_grid_and_floor() {
        let line = Line::normalize(8.5).unwrap();
        assert_relative_eq!(line.step_up().value(), 9.5);
        assert_relative_eq!(line.step_down().value(), 7.5);
        assert_relative_eq!(Line::MIN.step_down().value(), 0.5);
    }

    #[test]
    fn test_display_one_decimal() {
        assert_eq!(Line::normalize(9.0).unwrap().to_string(), "9.5");
    }
}
