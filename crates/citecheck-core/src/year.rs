use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;

/// The current calendar year in local time.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Extract the most plausible publication year from free text.
///
/// Every 4-digit number in 1000–2999 is a candidate; candidates later than the
/// current year are discarded. When several remain, the latest wins.
pub fn extract_year(text: &str) -> Option<i32> {
    extract_year_with_current_year(text, current_year())
}

/// [`extract_year`] with an explicit notion of "now".
pub fn extract_year_with_current_year(text: &str, current_year: i32) -> Option<i32> {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[12][0-9]{3}").unwrap());

    YEAR_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .filter(|&y| y <= current_year)
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_year_wins() {
        assert_eq!(
            extract_year_with_current_year("см. с. 52-57, опубликовано в 1998 и 2005", 2024),
            Some(2005)
        );
    }

    #[test]
    fn test_single_year() {
        assert_eq!(
            extract_year_with_current_year("Иванов И.П. Название. М.: Наука, 1987. 300 с.", 2024),
            Some(1987)
        );
    }

    #[test]
    fn test_no_year() {
        assert_eq!(extract_year_with_current_year("Без даты, 52 с.", 2024), None);
        assert_eq!(extract_year_with_current_year("", 2024), None);
    }

    #[test]
    fn test_out_of_range_numbers_ignored() {
        // 0999 and 3000 are outside 1000–2999
        assert_eq!(extract_year_with_current_year("код 0999, тираж 3000", 2024), None);
    }

    #[test]
    fn test_future_years_discarded() {
        assert_eq!(
            extract_year_with_current_year("издано 2010, переиздание 2999", 2024),
            Some(2010)
        );
        assert_eq!(extract_year_with_current_year("только 2030", 2024), None);
    }

    #[test]
    fn test_current_year_is_allowed() {
        assert_eq!(extract_year_with_current_year("дата обращения: 2024", 2024), Some(2024));
    }

    #[test]
    fn test_never_exceeds_real_current_year() {
        let now = current_year();
        let text = format!("{} {} 2999", now, now - 3);
        assert_eq!(extract_year(&text), Some(now));
    }
}
