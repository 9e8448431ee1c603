use chrono::{Days, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

const MONTHS: [&str; 12] = [
    "janvier",
    "fevrier",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "aout",
    "septembre",
    "octobre",
    "novembre",
    "decembre",
];

static MONTH_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({})[^\d]*(\d{{4}})", MONTHS.join("|")))
        .expect("month header pattern is valid")
});

static DAY_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}").expect("day pattern is valid"));

/// Lower-cases and drops accents (and any other non-ASCII character).
pub fn normalize(text: &str) -> String {
    text.to_lowercase().nfd().filter(char::is_ascii).collect()
}

/// Reads a free-text month header such as "Planning Février 2025" into (month, year).
pub fn parse_month_header(text: &str) -> Option<(u32, i32)> {
    let normalized = normalize(text);
    let captures = MONTH_HEADER.captures(&normalized)?;
    let month = MONTHS.iter().position(|m| *m == &captures[1])? as u32 + 1;
    let year: i32 = captures[2].parse().ok()?;
    (year > 0).then_some((month, year))
}

/// First run of one or two digits in the text.
pub fn extract_day(text: &str) -> Option<u32> {
    DAY_NUMBER.find(text)?.as_str().parse().ok()
}

pub fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Converts an Excel serial day number (1900 date system) to a date.
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as u64;
    // Serials below 60 predate the phantom 1900-02-29.
    let epoch = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    epoch.checked_add_days(Days::new(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_header_ignores_accents_and_case() {
        assert_eq!(parse_month_header("FÉVRIER 2025"), Some((2, 2025)));
        assert_eq!(parse_month_header("Planning de Décembre - 2024"), Some((12, 2024)));
        assert_eq!(parse_month_header("août2026"), Some((8, 2026)));
    }

    #[test]
    fn month_header_without_year_is_rejected() {
        assert_eq!(parse_month_header("Septembre"), None);
        assert_eq!(parse_month_header("Semaine 12 2024"), None);
        assert_eq!(parse_month_header(""), None);
    }

    #[test]
    fn day_is_the_first_digit_run() {
        assert_eq!(extract_day("Lundi 7"), Some(7));
        assert_eq!(extract_day("Mardi 14 (férié)"), Some(14));
        assert_eq!(extract_day("123"), Some(12));
        assert_eq!(extract_day("Mercredi"), None);
    }

    #[test]
    fn invalid_calendar_dates_are_skipped() {
        assert!(calendar_date(2025, 2, 29).is_none());
        assert!(calendar_date(2024, 2, 29).is_some());
        assert!(calendar_date(2024, 4, 31).is_none());
    }

    #[test]
    fn excel_serials_convert_like_spreadsheet_apps() {
        assert_eq!(from_excel_serial(45292.0), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(from_excel_serial(45292.75), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(from_excel_serial(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(from_excel_serial(0.0), None);
    }
}
