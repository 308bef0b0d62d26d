use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Log entry as returned by `GET /api/logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Free-form log text
    #[serde(rename = "log_message")]
    pub message: String,
    /// Free-form level, no enum enforcement
    #[serde(rename = "log_level")]
    pub level: String,
    /// Server-assigned creation time (RFC 3339, UTC, second precision)
    pub created_at: String,
}

/// Body accepted by `POST /api/logs`
///
/// Only the message and level are read; unknown fields, including any
/// client-supplied `created_at`, are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLogEntry {
    #[serde(rename = "log_message")]
    pub message: String,
    #[serde(rename = "log_level")]
    pub level: String,
}

impl NewLogEntry {
    /// Stamp the entry with its creation time
    pub fn stamp(self, now: DateTime<Utc>) -> LogEntry {
        LogEntry {
            message: self.message,
            level: self.level,
            created_at: format_timestamp(now),
        }
    }
}

/// Raw row read back from the store, before timestamp normalisation
#[derive(Debug, Clone)]
pub struct LogRow {
    pub message: String,
    pub level: String,
    pub created_at: String,
}

impl TryFrom<LogRow> for LogEntry {
    type Error = chrono::ParseError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)?;
        Ok(LogEntry {
            message: row.message,
            level: row.level,
            created_at: format_timestamp(created_at.with_timezone(&Utc)),
        })
    }
}

/// Format a timestamp the way it is stored and returned.
///
/// Fixed width (`YYYY-MM-DDTHH:MM:SSZ`), so string comparison in the store
/// orders the same way as the instants do.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_timestamp_is_utc_seconds() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 5).unwrap();
        assert_eq!(format_timestamp(ts), "2026-10-16T08:30:05Z");
    }

    #[test]
    fn test_new_entry_ignores_client_created_at() {
        let body = r#"{"log_message":"boot","log_level":"info","created_at":"1999-01-01T00:00:00Z"}"#;
        let entry: NewLogEntry = serde_json::from_str(body).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let stamped = entry.stamp(now);
        assert_eq!(stamped.created_at, "2026-10-16T12:00:00Z");
        assert_eq!(stamped.message, "boot");
        assert_eq!(stamped.level, "info");
    }

    #[test]
    fn test_new_entry_requires_both_fields() {
        assert!(serde_json::from_str::<NewLogEntry>(r#"{"log_message":"x"}"#).is_err());
        assert!(serde_json::from_str::<NewLogEntry>(r#"["x","y"]"#).is_err());
    }

    #[test]
    fn test_row_timestamp_normalised_to_utc() {
        let row = LogRow {
            message: "m".to_string(),
            level: "warn".to_string(),
            created_at: "2026-10-16T14:00:00+02:00".to_string(),
        };
        let entry = LogEntry::try_from(row).unwrap();
        assert_eq!(entry.created_at, "2026-10-16T12:00:00Z");
    }

    #[test]
    fn test_row_with_garbage_timestamp_fails() {
        let row = LogRow {
            message: "m".to_string(),
            level: "warn".to_string(),
            created_at: "yesterday".to_string(),
        };
        assert!(LogEntry::try_from(row).is_err());
    }

    #[test]
    fn test_entry_wire_names() {
        let entry = LogEntry {
            message: "boot".to_string(),
            level: "info".to_string(),
            created_at: "2026-10-16T12:00:00Z".to_string(),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["log_message"], "boot");
        assert_eq!(value["log_level"], "info");
        assert_eq!(value["created_at"], "2026-10-16T12:00:00Z");
    }
}
