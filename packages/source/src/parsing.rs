//! Numeric coercion for spreadsheet cells.
//!
//! Both portals publish numbers with Spanish formatting (`1.234,5`). Cells
//! that cannot be read as a number become `None`; coercion never fails.

use serde::{Deserialize, Serialize};

use crate::spreadsheet::Cell;

/// Separators used by text-encoded numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Decimal separator.
    pub decimal: char,
    /// Thousands separator, removed before parsing.
    pub thousands: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal: ',',
            thousands: '.',
        }
    }
}

impl NumberFormat {
    /// Plain `1234.5` formatting with no grouping.
    pub const PLAIN: Self = Self {
        decimal: '.',
        thousands: '\0',
    };

    /// Parses a text-encoded number. Surrounding whitespace, non-breaking
    /// spaces, and a trailing `%` are ignored. Returns `None` for blanks
    /// and placeholders such as `"-"` or `".."`.
    #[must_use]
    pub fn parse(&self, text: &str) -> Option<f64> {
        let trimmed = text
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}')
            .trim_end_matches('%')
            .trim_end();
        if trimmed.is_empty() {
            return None;
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| *c != self.thousands && *c != '\u{a0}' && *c != ' ')
            .map(|c| if c == self.decimal { '.' } else { c })
            .collect();

        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Coerces a cell to a number.
    #[must_use]
    pub fn coerce(&self, cell: &Cell) -> Option<f64> {
        match cell {
            Cell::Number(value) => Some(*value).filter(|v| v.is_finite()),
            Cell::Text(text) => self.parse(text),
            Cell::Empty => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_spanish_grouping() {
        let format = NumberFormat::default();
        assert!((format.parse("1.234").unwrap() - 1234.0).abs() < f64::EPSILON);
        assert!((format.parse("12,5").unwrap() - 12.5).abs() < f64::EPSILON);
        assert!((format.parse("-3,0").unwrap() - -3.0).abs() < f64::EPSILON);
        assert!((format.parse(" 1.234.567,25 ").unwrap() - 1_234_567.25).abs() < 1e-9);
    }

    #[test]
    fn parses_percentages() {
        let format = NumberFormat::default();
        assert!((format.parse("12,5%").unwrap() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn plain_format_keeps_dot_decimal() {
        assert!((NumberFormat::PLAIN.parse("1234.5").unwrap() - 1234.5).abs() < f64::EPSILON);
    }

    #[test]
    fn placeholders_are_missing() {
        let format = NumberFormat::default();
        for text in ["", "   ", "-", "..", "n/d", "abc", "\u{a0}"] {
            assert_eq!(format.parse(text), None, "{text:?} should be missing");
        }
    }

    #[test]
    fn non_finite_text_is_missing() {
        assert_eq!(NumberFormat::PLAIN.parse("inf"), None);
        assert_eq!(NumberFormat::PLAIN.parse("NaN"), None);
    }

    #[test]
    fn coerces_cells() {
        let format = NumberFormat::default();
        assert_eq!(format.coerce(&Cell::Number(7.0)), Some(7.0));
        assert_eq!(format.coerce(&Cell::Text("7".to_string())), Some(7.0));
        assert_eq!(format.coerce(&Cell::Empty), None);
        assert_eq!(format.coerce(&Cell::Number(f64::NAN)), None);
    }
}
