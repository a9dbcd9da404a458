use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Render a publication timestamp as "Month D, YYYY".
///
/// Unparseable input is returned verbatim; blank input yields `None`.
pub fn format_published(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Some(match parse_date(raw) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw.to_string(),
    })
}

/// The calendar date as written in the timestamp's own offset.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            format_published("2024-03-05T14:30:00+01:00").as_deref(),
            Some("March 5, 2024")
        );
        assert_eq!(
            format_published("2023-12-31T23:59:59Z").as_deref(),
            Some("December 31, 2023")
        );
    }

    #[test]
    fn test_plain_dates() {
        assert_eq!(format_published("2021-07-04").as_deref(), Some("July 4, 2021"));
        assert_eq!(
            format_published("Tue, 1 Jul 2003 10:52:37 +0200").as_deref(),
            Some("July 1, 2003")
        );
    }

    #[test]
    fn test_unparseable_kept_verbatim() {
        assert_eq!(
            format_published("  last Tuesday  ").as_deref(),
            Some("last Tuesday")
        );
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(format_published("   "), None);
    }
}
