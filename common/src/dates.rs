//! 日付の正規化
//!
//! 指数ページは `DD/MM/YYYY`、圃場情報ページは `YYYY-MM-DD` で表示する。
//! 解釈できない値は `N/A`。

use crate::types::CellValue;
use chrono::{NaiveDate, NaiveDateTime};

pub const NOT_AVAILABLE: &str = "N/A";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

// 月/日/年を日/月/年より先に試す（スラッシュ区切りは月が先）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// セル値を日付として解釈
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => parse_date_str(s),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// `DD/MM/YYYY`（値なし・解釈不能は `N/A`）
pub fn format_day_first(value: Option<&CellValue>) -> String {
    value
        .and_then(parse_date)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// `YYYY-MM-DD`（解釈不能は None）
pub fn format_iso(value: &CellValue) -> Option<String> {
    parse_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_timestamp_string_to_day_first() {
        assert_eq!(format_day_first(Some(&text("2025-08-01 00:00:00"))), "01/08/2025");
    }

    #[test]
    fn test_datetime_cell() {
        let dt = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(format_day_first(Some(&CellValue::DateTime(dt))), "09/03/2025");
        assert_eq!(format_iso(&CellValue::DateTime(dt)).as_deref(), Some("2025-03-09"));
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        assert_eq!(format_day_first(Some(&text("2025-07-15\n"))), "15/07/2025");
    }

    #[test]
    fn test_missing_or_unparseable() {
        assert_eq!(format_day_first(None), NOT_AVAILABLE);
        assert_eq!(format_day_first(Some(&CellValue::Empty)), NOT_AVAILABLE);
        assert_eq!(format_day_first(Some(&text("next week"))), NOT_AVAILABLE);
        assert_eq!(format_day_first(Some(&CellValue::Number(45870.0))), NOT_AVAILABLE);
    }

    #[test]
    fn test_slash_dates_are_month_first() {
        assert_eq!(format_iso(&text("01/08/2025")).as_deref(), Some("2025-01-08"));
        // 13月は無いので日/月/年として解釈
        assert_eq!(format_iso(&text("13/08/2025")).as_deref(), Some("2025-08-13"));
    }

    #[test]
    fn test_named_month() {
        assert_eq!(format_iso(&text("01 Aug 2025")).as_deref(), Some("2025-08-01"));
        assert_eq!(format_iso(&text("August 1, 2025")).as_deref(), Some("2025-08-01"));
    }
}
