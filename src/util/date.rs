use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall-clock time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current instant rendered as an ISO-8601 UTC string
pub fn now_instant() -> String {
    format_instant(Utc::now())
}

/// Render epoch milliseconds as an ISO-8601 UTC string, e.g. `2024-03-01T10:15:30.250Z`.
///
/// Returns `None` when the value is outside the range chrono can represent.
pub fn display_date(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(format_instant)
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_epoch() {
        assert_eq!(display_date(0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
    }

    #[test]
    fn test_display_date_is_stable() {
        let millis = 1_709_288_130_250;
        assert_eq!(display_date(millis), display_date(millis));
        assert_eq!(display_date(millis).as_deref(), Some("2024-03-01T10:15:30.250Z"));
    }

    #[test]
    fn test_display_date_out_of_range() {
        assert_eq!(display_date(i64::MAX), None);
    }

    #[test]
    fn test_now_instant_is_utc() {
        assert!(now_instant().ends_with('Z'));
    }
}
