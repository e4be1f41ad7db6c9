use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse date \"{input}\" with format \"{format}\"")]
pub struct DateParseError {
    pub input: String,
    pub format: String,
}

/// Parses a statement amount cell.
///
/// Currency glyphs, thousands separators and whitespace are dropped.
/// Parentheses are dropped too and do NOT flip the sign: `(500.00)` reads as
/// `500.00`. Empty cells, a lone `-` and anything non-numeric give `None`.
pub fn normalize_amount(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '\u{20b9}' | '$' | ',' | '(' | ')') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Parses a statement date cell according to a bank's date-format token.
///
/// Tokens are matched by substring, so `DD/MM/YYYY` takes the `DD/MM/YY`
/// path. ISO `YYYY-MM-DD` (what typed date cells decode to) is accepted under
/// every token. Impossible calendar dates are rejected, never rolled over.
pub fn normalize_date(text: &str, format: &str) -> Result<NaiveDate, DateParseError> {
    let text = text.trim();

    let parsed = if let Ok(iso) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Some(iso)
    } else if format.contains("DD MMM YYYY") {
        parse_month_name(text).or_else(|| parse_generic(text))
    } else if format.contains("DD/MM/YY") {
        match split_dmy(text, '/') {
            Some((day, month, year)) => {
                let year = if year < 100 { year + 2000 } else { year };
                NaiveDate::from_ymd_opt(year, month, day)
            }
            None if text.split('/').count() == 3 => None,
            None => parse_generic(text),
        }
    } else if format.contains("DD-MM-YYYY") {
        match split_dmy(text, '-') {
            Some((day, month, year)) => NaiveDate::from_ymd_opt(year, month, day),
            None if text.split('-').count() == 3 => None,
            None => parse_generic(text),
        }
    } else {
        parse_generic(text)
    };

    parsed.ok_or_else(|| DateParseError {
        input: text.to_string(),
        format: format.to_string(),
    })
}

/// Splits `d<sep>m<sep>y` into integers. `None` unless there are exactly
/// three parts, each starting with a digit.
fn split_dmy(text: &str, sep: char) -> Option<(u32, u32, i32)> {
    let parts: Vec<&str> = text.split(sep).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let day = leading_int(parts[0])?;
    let month = leading_int(parts[1])?;
    let year = leading_int(parts[2])?;
    Some((day, month, year))
}

/// Integer value of the leading digit run; trailing text such as a
/// `10:30:00` time suffix is ignored.
fn leading_int<T: FromStr>(part: &str) -> Option<T> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

const MONTH_NAME_FORMATS: &[&str] = &[
    "%d %b %Y", "%d %B %Y", "%d-%b-%Y", "%d-%B-%Y", "%d-%b-%y", "%d %b %y", "%b %d, %Y", "%B %d, %Y",
];

fn parse_month_name(text: &str) -> Option<NaiveDate> {
    MONTH_NAME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

fn parse_generic(text: &str) -> Option<NaiveDate> {
    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }
    for fmt in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    parse_month_name(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn iso(text: &str, format: &str) -> String {
        normalize_date(text, format).unwrap().to_string()
    }

    // ── normalize_amount ──────────────────────────────────────────────────────

    #[test]
    fn amount_with_rupee_sign_and_commas() {
        assert_eq!(normalize_amount("\u{20b9}1,234.50"), Some(dec("1234.50")));
    }

    #[test]
    fn amount_with_dollar_and_spaces() {
        assert_eq!(normalize_amount(" $ 99.99 "), Some(dec("99.99")));
    }

    #[test]
    fn amount_indian_grouping() {
        assert_eq!(normalize_amount("1,00,000.00"), Some(dec("100000")));
    }

    #[test]
    fn amount_negative() {
        assert_eq!(normalize_amount("-50.00"), Some(dec("-50")));
    }

    #[test]
    fn amount_parentheses_are_stripped_without_sign_flip() {
        assert_eq!(normalize_amount("(500.00)"), Some(dec("500")));
    }

    #[test]
    fn amount_empty_and_dash_are_none() {
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount("   "), None);
        assert_eq!(normalize_amount("-"), None);
        assert_eq!(normalize_amount(" - "), None);
    }

    #[test]
    fn amount_non_numeric_is_none() {
        assert_eq!(normalize_amount("N/A"), None);
        assert_eq!(normalize_amount("12abc"), None);
        assert_eq!(normalize_amount("1,234.00 Dr"), None);
    }

    #[test]
    fn amount_scientific_notation() {
        assert_eq!(normalize_amount("1.5e3"), Some(dec("1500")));
    }

    // ── normalize_date ────────────────────────────────────────────────────────

    #[test]
    fn date_two_digit_year_slash() {
        assert_eq!(iso("15/01/24", "DD/MM/YY"), "2024-01-15");
    }

    #[test]
    fn date_four_digit_year_slash() {
        assert_eq!(iso("05/11/2023", "DD/MM/YYYY"), "2023-11-05");
    }

    #[test]
    fn date_dash_format() {
        assert_eq!(iso("15-01-2024", "DD-MM-YYYY"), "2024-01-15");
    }

    #[test]
    fn date_dash_format_rejects_impossible_date() {
        let err = normalize_date("31-02-2024", "DD-MM-YYYY").unwrap_err();
        assert_eq!(err.input, "31-02-2024");
        assert_eq!(err.format, "DD-MM-YYYY");
    }

    #[test]
    fn date_slash_format_rejects_impossible_date() {
        assert!(normalize_date("30/02/24", "DD/MM/YY").is_err());
        assert!(normalize_date("15/13/24", "DD/MM/YY").is_err());
    }

    #[test]
    fn date_time_suffix_is_ignored() {
        assert_eq!(iso("15/01/2024 10:30:00", "DD/MM/YYYY"), "2024-01-15");
        assert_eq!(iso("15-01-2024 10:30", "DD-MM-YYYY"), "2024-01-15");
        assert_eq!(iso("15/01/24 09:05", "DD/MM/YY"), "2024-01-15");
    }

    #[test]
    fn date_time_suffix_keeps_calendar_check() {
        assert!(normalize_date("31/02/2024 10:30:00", "DD/MM/YYYY").is_err());
        assert!(normalize_date("31-04-2024 23:59", "DD-MM-YYYY").is_err());
    }

    #[test]
    fn date_month_name() {
        assert_eq!(iso("15 Jan 2024", "DD MMM YYYY"), "2024-01-15");
        assert_eq!(iso("03 March 2024", "DD MMM YYYY"), "2024-03-03");
        assert_eq!(iso("15-Jan-2024", "DD MMM YYYY"), "2024-01-15");
    }

    #[test]
    fn date_iso_accepted_under_any_token() {
        assert_eq!(iso("2024-01-15", "DD/MM/YY"), "2024-01-15");
        assert_eq!(iso("2024-01-15", "DD-MM-YYYY"), "2024-01-15");
        assert_eq!(iso("2024-01-15", "DD MMM YYYY"), "2024-01-15");
    }

    #[test]
    fn date_unknown_token_uses_generic_parsing() {
        assert_eq!(iso("2024/01/15", "YYYY/MM/DD"), "2024-01-15");
        assert_eq!(iso("2024-01-15T10:30:00", "ISO"), "2024-01-15");
        assert_eq!(iso("15 Jan 2024", "whatever"), "2024-01-15");
    }

    #[test]
    fn date_wrong_shape_falls_back_to_generic() {
        assert_eq!(iso("15 Jan 2024", "DD/MM/YY"), "2024-01-15");
    }

    #[test]
    fn date_garbage_fails() {
        assert!(normalize_date("not a date", "DD/MM/YY").is_err());
        assert!(normalize_date("", "DD-MM-YYYY").is_err());
        assert!(normalize_date("aa/bb/cc", "DD/MM/YY").is_err());
    }

    #[test]
    fn date_parse_error_message() {
        let err = normalize_date("99/99/99", "DD/MM/YY").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to parse date \"99/99/99\" with format \"DD/MM/YY\""
        );
    }
}
