use std::sync::OnceLock;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Datetime layouts accepted in text cells, tried in order.
const DATETIME_FMTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FMTS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Canonical text form used when a spreadsheet cell holds a real date.
pub const CELL_DT_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Permissive datetime coercion: returns None for empty or unparseable
/// strings instead of failing the load.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // Spreadsheets exported as text sometimes keep the serial number.
    trimmed.parse::<f64>().ok().and_then(excel_serial_to_datetime)
}

/// Excel serial date (1900 system, days since 1899-12-30) → NaiveDateTime.
/// Fractions are rounded to the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let secs = (serial * 86_400.0).round() as i64;
    base.checked_add_signed(Duration::seconds(secs))
}

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

/// First run of digits in a ticket id ("REQ-123" → 123).
pub fn parse_id_number(s: &str) -> Option<u64> {
    digits_re().find(s).and_then(|m| m.as_str().parse::<u64>().ok())
}

/// Trimmed text, None when empty.
pub fn clean_text(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_parse_datetime_iso() {
        assert_eq!(
            parse_datetime("2024-01-05 14:30:00"),
            Some(dt("2024-01-05 14:30:00"))
        );
        assert_eq!(
            parse_datetime("2024-01-05T14:30:00"),
            Some(dt("2024-01-05 14:30:00"))
        );
        assert_eq!(parse_datetime("2024-01-05"), Some(dt("2024-01-05 00:00:00")));
    }

    #[test]
    fn test_parse_datetime_brazilian() {
        assert_eq!(
            parse_datetime("05/01/2024 08:15"),
            Some(dt("2024-01-05 08:15:00"))
        );
        assert_eq!(parse_datetime("31/12/2023"), Some(dt("2023-12-31 00:00:00")));
    }

    #[test]
    fn test_parse_datetime_coerces_garbage_to_none() {
        assert!(parse_datetime("").is_none());
        assert!(parse_datetime("   ").is_none());
        assert!(parse_datetime("não informado").is_none());
        assert!(parse_datetime("2024-13-45").is_none());
    }

    #[test]
    fn test_excel_serial() {
        // 45296 = 2024-01-05, .5 = noon
        assert_eq!(
            excel_serial_to_datetime(45296.5),
            Some(dt("2024-01-05 12:00:00"))
        );
        assert_eq!(parse_datetime("45296"), Some(dt("2024-01-05 00:00:00")));
        assert!(excel_serial_to_datetime(-3.0).is_none());
        assert!(excel_serial_to_datetime(f64::NAN).is_none());
    }

    #[test]
    fn test_parse_id_number() {
        assert_eq!(parse_id_number("REQ-123"), Some(123));
        assert_eq!(parse_id_number("INC-0042"), Some(42));
        assert_eq!(parse_id_number("777"), Some(777));
        assert_eq!(parse_id_number("SEM-NUMERO"), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text(Some("  Equipe A ")), Some("Equipe A".to_string()));
        assert_eq!(clean_text(Some("   ")), None);
        assert_eq!(clean_text(None), None);
    }
}
