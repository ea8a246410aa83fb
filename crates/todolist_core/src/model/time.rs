//! Timestamp helpers.
//!
//! Timestamps are UTC and truncated to millisecond precision, rendered as
//! `YYYY-MM-DDTHH:MM:SS.sssZ` so stored values compare equal after a
//! save/load round-trip.

use chrono::{DateTime, SecondsFormat, SubsecRound, TimeZone, Utc};
use std::fmt::Display;

/// Current time truncated to milliseconds.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Renders a timestamp in the storage format.
pub fn to_iso(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses any RFC 3339 timestamp, normalizing to UTC milliseconds.
pub fn parse_iso(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc).trunc_subsecs(3))
}

/// Short human label for how long ago `value` happened relative to `now`.
///
/// Anything a week or older falls back to an absolute `Mon D, HH:MM AM`
/// label, rendered in `value`'s own time zone. Pass a `Local` value for
/// wall-clock output.
pub fn format_relative<Tz>(value: DateTime<Tz>, now: DateTime<Utc>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let elapsed = now.signed_duration_since(value.with_timezone(&Utc));
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days}d ago")
    } else {
        value.format("%b %-d, %I:%M %p").to_string()
    }
}

pub(crate) mod iso_millis {
    use super::{parse_iso, to_iso};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_iso(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_iso(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }
}

pub(crate) mod iso_millis_opt {
    use super::{parse_iso, to_iso};
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&to_iso(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_iso(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_relative, parse_iso, to_iso};
    use chrono::{Duration, FixedOffset, TimeZone, Utc};

    #[test]
    fn iso_rendering_uses_millis_and_zulu() {
        let value = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(to_iso(&value), "2024-03-09T07:05:01.000Z");
    }

    #[test]
    fn parse_accepts_offsets_and_rejects_garbage() {
        let parsed = parse_iso("2024-03-09T09:05:01.250+02:00").expect("offset should parse");
        assert_eq!(to_iso(&parsed), "2024-03-09T07:05:01.250Z");
        assert!(parse_iso("yesterday").is_none());
    }

    #[test]
    fn relative_labels_follow_thresholds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(format_relative(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2d ago");
        let old = Utc.with_ymd_and_hms(2024, 1, 5, 15, 4, 0).unwrap();
        assert_eq!(format_relative(old, now), "Jan 5, 03:04 PM");
    }

    #[test]
    fn absolute_label_uses_the_value_time_zone() {
        let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
        let old = Utc.with_ymd_and_hms(2024, 1, 5, 23, 30, 0).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(
            format_relative(old.with_timezone(&tokyo), now),
            "Jan 6, 08:30 AM"
        );
        assert_eq!(
            format_relative(now.with_timezone(&tokyo) - Duration::minutes(5), now),
            "5m ago"
        );
    }
}
