use chrono::{DateTime, NaiveDateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y %H:%M").to_string()
}

/// The backend stores `YYYY-MM-DD HH:MM:SS` (UTC, no offset). Anything else
/// is shown as received.
#[must_use]
pub fn format_backend_timestamp(raw: &str) -> String {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| format_datetime(naive.and_utc()))
        .unwrap_or_else(|_| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::time::fixed_now;

    #[test]
    fn formats_fixed_time() {
        assert_eq!(format_datetime(fixed_now()), "Nov 14, 2023 22:13");
    }

    #[test]
    fn parses_backend_formats() {
        assert_eq!(format_backend_timestamp("2024-03-05 09:30:00"), "Mar 5, 2024 09:30");
        assert_eq!(format_backend_timestamp("2024-03-05T09:30:00.123"), "Mar 5, 2024 09:30");
        assert_eq!(format_backend_timestamp("yesterday"), "yesterday");
    }
}
