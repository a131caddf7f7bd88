//! Best-effort normalization of stored date cells to `YYYY-MM-DD`.
//!
//! Cells come back from the backing table either as structured dates or as
//! whatever text a client sent. [`normalize`] is total: it tries, in order,
//!
//! 1. text already shaped like `YYYY-MM-DD` (returned untouched),
//! 2. structured date values,
//! 3. a fixed list of textual date formats,
//!
//! and finally falls back to the raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::table::Cell;

const CANONICAL: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// Render a date cell as `YYYY-MM-DD`, or as its raw text when no date can be read.
pub fn normalize(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(text) if is_canonical(text) => text.clone(),
        Cell::Date(date) => format_date(*date),
        Cell::DateTime(datetime) => format_date(datetime.date()),
        Cell::Text(text) => match parse_text(text) {
            Some(date) => format_date(date),
            None => text.clone(),
        },
    }
}

/// Whether `text` has the exact `dddd-dd-dd` shape. Calendar validity is not checked.
pub fn is_canonical(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL).to_string()
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    // Offset timestamps keep the calendar date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date);
        }
    }

    parse_display_form(text)
}

/// `Tue Feb 03 2026 00:00:00 GMT+0200 (Eastern European Standard Time)`
fn parse_display_form(text: &str) -> Option<NaiveDate> {
    let head: Vec<&str> = text.split_whitespace().take(4).collect();
    if head.len() < 4 {
        return None;
    }
    NaiveDate::parse_from_str(&head.join(" "), "%a %b %d %Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_canonical_text_unchanged() {
        assert_eq!(normalize(&text("2026-02-03")), "2026-02-03");
        assert_eq!(normalize(&text("2026-06-08")), "2026-06-08");
        // Shape match wins even when the date does not exist.
        assert_eq!(normalize(&text("2026-13-45")), "2026-13-45");
    }

    #[test]
    fn test_structured_values() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(normalize(&Cell::Date(date)), "2026-03-05");

        let datetime = date.and_hms_opt(23, 59, 0).unwrap();
        assert_eq!(normalize(&Cell::DateTime(datetime)), "2026-03-05");
    }

    #[test]
    fn test_parsed_text_formats() {
        let cases = [
            ("2026-02-03T23:30:00-05:00", "2026-02-03"),
            ("2026-02-03T10:00:00Z", "2026-02-03"),
            ("Tue, 3 Feb 2026 09:00:00 +0000", "2026-02-03"),
            ("2026-02-03T08:15", "2026-02-03"),
            ("2026-02-03 08:15:00", "2026-02-03"),
            ("2026-2-3", "2026-02-03"),
            ("2026/02/03", "2026-02-03"),
            ("02/03/2026", "2026-02-03"),
            ("February 3, 2026", "2026-02-03"),
            ("3 February 2026", "2026-02-03"),
            (
                "Tue Feb 03 2026 00:00:00 GMT+0200 (Eastern European Standard Time)",
                "2026-02-03",
            ),
            ("  2026/5/25  ", "2026-05-25"),
        ];

        for (input, expected) in cases {
            assert_eq!(normalize(&text(input)), expected, "input: {}", input);
        }
    }

    #[test]
    fn test_unparseable_falls_back_to_raw() {
        assert_eq!(normalize(&text("next tuesday")), "next tuesday");
        assert_eq!(normalize(&text("2026/02/30")), "2026/02/30");
        assert_eq!(normalize(&text("02/30/2026")), "02/30/2026");
        assert_eq!(normalize(&text("   ")), "   ");
    }

    #[test]
    fn test_empty_cell() {
        assert_eq!(normalize(&Cell::Empty), "");
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["2026-2-3", "February 3, 2026", "garbage", "2026-02-03"];
        for input in inputs {
            let once = normalize(&text(input));
            assert_eq!(normalize(&text(&once)), once);
        }
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("2026-02-03"));
        assert!(!is_canonical("2026-2-03"));
        assert!(!is_canonical("2026/02/03"));
        assert!(!is_canonical("2026-02-033"));
    }
}
