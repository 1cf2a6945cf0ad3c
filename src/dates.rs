//! Revision-timestamp parsing for the wiki history page.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::DateParseError;

/// The twelve canonical Hebrew month names. Anything else fails closed.
const HEBREW_MONTHS: [(&str, u32); 12] = [
    ("ינואר", 1),
    ("פברואר", 2),
    ("מרץ", 3),
    ("אפריל", 4),
    ("מאי", 5),
    ("יוני", 6),
    ("יולי", 7),
    ("אוגוסט", 8),
    ("ספטמבר", 9),
    ("אוקטובר", 10),
    ("נובמבר", 11),
    ("דצמבר", 12),
];

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s+ב(\S+)\s+(\d{4})").expect("date pattern compiles"));

/// Parses a history-entry timestamp such as `"16:50, 28 במרץ 2025"` into
/// `dd/MM/yyyy`. The leading time is ignored; only the day-month-year
/// triple after the comma matters.
pub fn parse_revision_timestamp(text: &str) -> Result<String, DateParseError> {
    let date_part = match text.split_once(',') {
        Some((_, rest)) => rest.trim(),
        None => text.trim(),
    };

    let captures = DATE_PATTERN
        .captures(date_part)
        .ok_or_else(|| DateParseError::MissingTriple(text.to_owned()))?;

    let day: u32 = captures[1]
        .parse()
        .map_err(|_| DateParseError::MissingTriple(text.to_owned()))?;
    let month_name = &captures[2];
    let year: i32 = captures[3]
        .parse()
        .map_err(|_| DateParseError::MissingTriple(text.to_owned()))?;

    let month = HEBREW_MONTHS
        .iter()
        .find(|(name, _)| *name == month_name)
        .map(|(_, number)| *number)
        .ok_or_else(|| DateParseError::UnknownMonth(month_name.to_owned()))?;

    let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::OutOfRange { day, month, year })?;

    Ok(date.format("%d/%m/%Y").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_history_timestamp() {
        assert_eq!(
            parse_revision_timestamp("16:50, 28 במרץ 2025").unwrap(),
            "28/03/2025"
        );
    }

    #[test]
    fn pads_single_digit_days_and_months() {
        assert_eq!(
            parse_revision_timestamp("09:01, 5 בינואר 2024").unwrap(),
            "05/01/2024"
        );
    }

    #[test]
    fn works_without_a_time_prefix() {
        assert_eq!(
            parse_revision_timestamp("3 בדצמבר 2023").unwrap(),
            "03/12/2023"
        );
    }

    #[test]
    fn rejects_unknown_month() {
        let err = parse_revision_timestamp("16:50, 28 בפלוטו 2025").unwrap_err();
        assert!(matches!(err, DateParseError::UnknownMonth(_)));
    }

    #[test]
    fn rejects_text_without_a_date() {
        let err = parse_revision_timestamp("not a timestamp").unwrap_err();
        assert!(matches!(err, DateParseError::MissingTriple(_)));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        let err = parse_revision_timestamp("12:00, 31 בפברואר 2025").unwrap_err();
        assert!(matches!(err, DateParseError::OutOfRange { .. }));
    }
}
