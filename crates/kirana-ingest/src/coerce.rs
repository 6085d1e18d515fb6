//! Scalar coercers. Every function is total: malformed input yields the
//! caller's default, never an error.

use std::sync::LazyLock;

use regex::Regex;

use crate::row::CellValue;

/// Lowercased, trimmed spellings that read as "yes".
pub(crate) const AFFIRMATIVES: &[&str] = &["yes", "true", "1", "y"];

static CURRENCY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:₹|\$|rs\.?|inr)\s*").expect("valid regex"));

/// Trimmed text form of a cell; empty or absent -> `default`.
///
/// Whole numbers render without a fractional part so numeric SKUs and batch
/// numbers read back as typed (`1234`, not `1234.0`).
#[must_use]
pub fn to_text(value: Option<&CellValue>, default: &str) -> String {
    let text = match value {
        None | Some(CellValue::Empty) => return default.to_string(),
        Some(CellValue::Text(s)) => s.trim().to_string(),
        Some(CellValue::Number(n)) => format_number(*n),
        Some(CellValue::Bool(b)) => b.to_string(),
    };
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

/// Floating-point form of a cell.
///
/// Text may carry a currency prefix (`₹`, `$`, `Rs`, `Rs.`, `INR`) and
/// thousands separators. Anything unparsable or non-finite -> `default`.
#[must_use]
pub fn to_number(value: Option<&CellValue>, default: f64) -> f64 {
    let parsed = match value {
        Some(CellValue::Number(n)) => Some(*n),
        Some(CellValue::Text(s)) => parse_decimal(s),
        None | Some(CellValue::Empty | CellValue::Bool(_)) => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

/// Integer form of a cell, truncating any fractional part toward zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn to_integer(value: Option<&CellValue>, default: i64) -> i64 {
    let n = to_number(value, f64::NAN);
    // Outside this range the `as` cast would saturate; treat as unparsable.
    if n.is_finite() && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        n.trunc() as i64
    } else {
        default
    }
}

/// `true` if the cell's lowercase trimmed text is an affirmative; anything
/// else -> `default`.
///
/// Negative answers (`no`, `false`) are not special-cased, so a caller passing
/// `default = true` gets `true` back for them. Callers choose defaults with
/// that in mind.
#[must_use]
pub fn to_boolean(value: Option<&CellValue>, default: bool) -> bool {
    let text = match value {
        Some(CellValue::Bool(true)) => return true,
        Some(CellValue::Bool(false)) | None | Some(CellValue::Empty) => return default,
        Some(other) => to_text(Some(other), ""),
    };
    if AFFIRMATIVES.contains(&text.to_lowercase().as_str()) {
        true
    } else {
        default
    }
}

/// Splits a list-valued cell on `,` and `|`, dropping blank items.
#[must_use]
pub fn to_list(value: Option<&CellValue>) -> Vec<String> {
    to_text(value, "")
        .split([',', '|'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let stripped = CURRENCY_PREFIX.replace(trimmed, "");
    let cleaned: String = stripped.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn to_text_trims_and_defaults() {
        assert_eq!(to_text(Some(&text("  Soap  ")), ""), "Soap");
        assert_eq!(to_text(Some(&text("   ")), "pcs"), "pcs");
        assert_eq!(to_text(None, "General"), "General");
        assert_eq!(to_text(Some(&CellValue::Empty), "x"), "x");
    }

    #[test]
    fn to_text_renders_whole_numbers_without_fraction() {
        assert_eq!(to_text(Some(&CellValue::Number(1234.0)), ""), "1234");
        assert_eq!(to_text(Some(&CellValue::Number(12.5)), ""), "12.5");
    }

    #[test]
    fn to_number_parses_plain_and_decorated_prices() {
        assert!((to_number(Some(&text("45.5")), 0.0) - 45.5).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("₹1,299")), 0.0) - 1299.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("Rs. 80")), 0.0) - 80.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("INR 12")), 0.0) - 12.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("$3.25")), 0.0) - 3.25).abs() < f64::EPSILON);
    }

    #[test]
    fn to_number_falls_back_on_garbage() {
        assert!((to_number(Some(&text("abc")), 7.0) - 7.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("NaN")), 7.0) - 7.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&text("inf")), 7.0) - 7.0).abs() < f64::EPSILON);
        assert!((to_number(Some(&CellValue::Bool(true)), 0.0)).abs() < f64::EPSILON);
        assert!((to_number(None, 0.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn to_number_is_idempotent() {
        for raw in ["12.75", "₹ 1,000", "junk", "-3", ""] {
            let once = to_number(Some(&text(raw)), 0.0);
            let twice = to_number(Some(&CellValue::Number(once)), 0.0);
            assert!((once - twice).abs() < f64::EPSILON, "unstable for {raw:?}");
        }
    }

    #[test]
    fn to_integer_truncates() {
        assert_eq!(to_integer(Some(&text("12.9")), 0), 12);
        assert_eq!(to_integer(Some(&text("-3.7")), 0), -3);
        assert_eq!(to_integer(Some(&CellValue::Number(40.0)), 0), 40);
        assert_eq!(to_integer(Some(&text("many")), 10), 10);
        assert_eq!(to_integer(Some(&CellValue::Number(1e30)), 5), 5);
    }

    #[test]
    fn to_boolean_matches_affirmatives_only() {
        assert!(to_boolean(Some(&text("YES ")), false));
        assert!(to_boolean(Some(&text("y")), false));
        assert!(to_boolean(Some(&CellValue::Number(1.0)), false));
        assert!(to_boolean(Some(&CellValue::Bool(true)), false));
        assert!(!to_boolean(Some(&text("no")), false));
        assert!(!to_boolean(Some(&text("")), false));
        assert!(to_boolean(Some(&text("")), true));
        // Non-affirmatives return the caller's default, not `false`.
        assert!(to_boolean(Some(&text("no")), true));
    }

    #[test]
    fn to_list_splits_on_comma_and_pipe() {
        let value = text("a.jpg, b.jpg | c.jpg,,");
        assert_eq!(to_list(Some(&value)), vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert!(to_list(None).is_empty());
    }
}
