use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?P<year>\d{4})(?P<month>\d{2})(?P<day>\d{2})").unwrap());

/// Derive a date string from a filename basename.
///
/// Matches the first contiguous 8-digit YYYYMMDD run anywhere in the name
/// and returns it as "YYYY-MM-DD". The digits are taken verbatim, with no
/// calendar check: the exporting application is trusted as-is, so month 13
/// or day 45 pass through unchanged.
pub fn derive_date(base_name: &str) -> Option<String> {
    let caps = DATE_RE.captures(base_name)?;
    Some(format!("{}-{}-{}", &caps["year"], &caps["month"], &caps["day"]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_patterns() {
        assert_eq!(derive_date("WA0001_20220115").as_deref(), Some("2022-01-15"));
        assert_eq!(derive_date("IMG-20191224-WA0003").as_deref(), Some("2019-12-24"));
        assert_eq!(derive_date("20200101").as_deref(), Some("2020-01-01"));
        assert!(derive_date("random_photo").is_none());
        assert!(derive_date("clip_1234567").is_none());
    }

    #[test]
    fn test_digits_taken_verbatim() {
        assert_eq!(derive_date("IMG20231345").as_deref(), Some("2023-13-45"));
    }

    #[test]
    fn test_first_run_wins() {
        assert_eq!(derive_date("20220115_20230620").as_deref(), Some("2022-01-15"));
    }
}
