use chrono::{Datelike, NaiveDateTime};

/// `YYYY-MM` key of a timestamp. Sorts chronologically as a string.
pub fn month_key(dt: &NaiveDateTime) -> String {
    format!("{:04}-{:02}", dt.year(), dt.month())
}

/// Splits a `YYYY-MM` key into (year, month).
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    let year = year.parse::<i32>().ok()?;
    let month = month.parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// Display label of a month key: "2023-04" → "Abril-2023".
pub fn month_year_label(key: &str) -> String {
    match parse_month_key(key) {
        Some((year, month)) => format!("{}-{}", portuguese_month_name(month), year),
        None => format!("Mês Desconhecido-{}", key),
    }
}

pub fn portuguese_month_name(month: u32) -> &'static str {
    match month {
        1 => "Janeiro",
        2 => "Fevereiro",
        3 => "Março",
        4 => "Abril",
        5 => "Maio",
        6 => "Junho",
        7 => "Julho",
        8 => "Agosto",
        9 => "Setembro",
        10 => "Outubro",
        11 => "Novembro",
        12 => "Dezembro",
        _ => "Mês Desconhecido",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(&dt("2024-01-05 10:00:00")), "2024-01");
        assert_eq!(month_key(&dt("2023-11-30 23:59:59")), "2023-11");
    }

    #[test]
    fn test_month_keys_sort_chronologically() {
        let mut keys = vec!["2024-02", "2023-12", "2024-10", "2024-01"];
        keys.sort();
        assert_eq!(keys, ["2023-12", "2024-01", "2024-02", "2024-10"]);
    }

    #[test]
    fn test_parse_month_key() {
        assert_eq!(parse_month_key("2023-04"), Some((2023, 4)));
        assert_eq!(parse_month_key("2023-13"), None);
        assert_eq!(parse_month_key("NaT"), None);
    }

    #[test]
    fn test_month_year_label() {
        assert_eq!(month_year_label("2023-04"), "Abril-2023");
        assert_eq!(month_year_label("2024-03"), "Março-2024");
        assert_eq!(month_year_label("2024-12"), "Dezembro-2024");
    }
}
