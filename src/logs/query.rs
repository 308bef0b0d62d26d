//! Parameterized statement construction for log retrieval

use super::duration::parse_duration;
use crate::models::format_timestamp;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Widest time window a `since` filter may ask for
pub const MAX_SINCE_HOURS: i64 = 24;

const BASE_SELECT: &str = "SELECT log_message, log_level, created_at FROM logs";

/// Filters accepted by `GET /api/logs`
///
/// Empty values are treated the same as missing ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Time window ending now, e.g. `1h` or `30m`
    pub since: Option<String>,
    /// Exact level match
    pub level: Option<String>,
    /// Maximum number of rows
    pub limit: Option<String>,
}

impl LogFilter {
    /// Collect filters from decoded query pairs.
    ///
    /// The first occurrence of a key wins; unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "since" => &mut filter.since,
                "level" => &mut filter.level,
                "limit" => &mut filter.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        filter
    }

    fn since(&self) -> Option<&str> {
        self.since.as_deref().filter(|s| !s.is_empty())
    }

    fn level(&self) -> Option<&str> {
        self.level.as_deref().filter(|s| !s.is_empty())
    }

    fn limit(&self) -> Option<&str> {
        self.limit.as_deref().filter(|s| !s.is_empty())
    }
}

/// Rejected filter value; maps to a client error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid 'since' value. Must be a duration of at most 24h.")]
    Since(String),
    #[error("Invalid 'limit' value. Must be a non-negative integer.")]
    Limit(String),
    #[error("Invalid request body")]
    Body(String),
    #[error("Invalid query string")]
    QueryString(String),
}

/// Value bound to a numbered placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

/// Statement text plus bind values, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl LogQuery {
    fn bind(&mut self, value: BindValue) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }
}

fn parse_since(raw: &str) -> Result<Duration, ValidationError> {
    let window = parse_duration(raw).map_err(|_| ValidationError::Since(raw.to_string()))?;
    if window > Duration::hours(MAX_SINCE_HOURS) {
        return Err(ValidationError::Since(raw.to_string()));
    }
    Ok(window)
}

fn parse_limit(raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<u32>()
        .map(i64::from)
        .map_err(|_| ValidationError::Limit(raw.to_string()))
}

/// Build the select statement for a filter.
///
/// Conditions appear in a fixed order (time window, then level) and every
/// user-supplied value travels as a bind parameter. Rows are always newest
/// first; without `limit` the result set is unbounded.
pub fn build_log_query(filter: &LogFilter, now: DateTime<Utc>) -> Result<LogQuery, ValidationError> {
    let mut query = LogQuery {
        sql: String::from(BASE_SELECT),
        params: Vec::new(),
    };
    let mut conditions = Vec::new();

    if let Some(since) = filter.since() {
        let window = parse_since(since)?;
        let placeholder = query.bind(BindValue::Text(format_timestamp(now - window)));
        conditions.push(format!("created_at >= {}", placeholder));
    }

    if let Some(level) = filter.level() {
        let placeholder = query.bind(BindValue::Text(level.to_string()));
        conditions.push(format!("log_level = {}", placeholder));
    }

    // Validate before touching the statement so a bad limit never yields half a query
    let limit = filter.limit().map(parse_limit).transpose()?;

    if !conditions.is_empty() {
        query.sql.push_str(" WHERE ");
        query.sql.push_str(&conditions.join(" AND "));
    }

    query.sql.push_str(" ORDER BY created_at DESC");

    if let Some(limit) = limit {
        let placeholder = query.bind(BindValue::Integer(limit));
        query.sql.push_str(" LIMIT ");
        query.sql.push_str(&placeholder);
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    fn filter(since: Option<&str>, level: Option<&str>, limit: Option<&str>) -> LogFilter {
        LogFilter {
            since: since.map(str::to_string),
            level: level.map(str::to_string),
            limit: limit.map(str::to_string),
        }
    }

    #[test]
    fn test_no_filters() {
        let q = build_log_query(&LogFilter::default(), now()).unwrap();
        assert_eq!(
            q.sql,
            "SELECT log_message, log_level, created_at FROM logs ORDER BY created_at DESC"
        );
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let q = build_log_query(&filter(Some(""), Some(""), Some("")), now()).unwrap();
        assert!(!q.sql.contains("WHERE"));
        assert!(!q.sql.contains("LIMIT"));
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_since_is_first_bind() {
        for since in ["1s", "30m", "1h", "1h30m", "23.5h", "24h"] {
            let q = build_log_query(&filter(Some(since), None, None), now()).unwrap();
            assert!(q.sql.contains("WHERE created_at >= ?1"), "{}", since);
            assert!(matches!(q.params.first(), Some(BindValue::Text(_))));
        }

        let q = build_log_query(&filter(Some("1h"), None, None), now()).unwrap();
        assert_eq!(q.params, vec![BindValue::Text("2026-10-16T11:00:00Z".to_string())]);
    }

    #[test]
    fn test_since_out_of_range_or_malformed() {
        for since in ["48h", "24h1s", "25h", "abc", "10", "1d"] {
            let err = build_log_query(&filter(Some(since), None, None), now()).unwrap_err();
            assert_eq!(err, ValidationError::Since(since.to_string()));
        }
    }

    #[test]
    fn test_zero_and_negative_since_build_a_query() {
        let q = build_log_query(&filter(Some("0"), None, None), now()).unwrap();
        assert_eq!(q.params, vec![BindValue::Text("2026-10-16T12:00:00Z".to_string())]);

        let q = build_log_query(&filter(Some("0s"), None, None), now()).unwrap();
        assert_eq!(q.params, vec![BindValue::Text("2026-10-16T12:00:00Z".to_string())]);

        // A negative window puts the floor in the future
        let q = build_log_query(&filter(Some("-1h"), Some("info"), None), now()).unwrap();
        assert!(q.sql.contains("WHERE created_at >= ?1 AND log_level = ?2"));
        assert_eq!(q.params[0], BindValue::Text("2026-10-16T13:00:00Z".to_string()));
    }

    #[test]
    fn test_from_pairs_first_occurrence_wins() {
        let pairs = vec![
            ("level".to_string(), "a".to_string()),
            ("x".to_string(), "1".to_string()),
            ("level".to_string(), "b".to_string()),
            ("limit".to_string(), "3".to_string()),
        ];
        assert_eq!(
            LogFilter::from_pairs(pairs),
            filter(None, Some("a"), Some("3"))
        );
    }

    #[test]
    fn test_from_pairs_empty_first_value_is_absent() {
        let pairs = vec![
            ("since".to_string(), String::new()),
            ("since".to_string(), "48h".to_string()),
        ];
        let q = build_log_query(&LogFilter::from_pairs(pairs), now()).unwrap();
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_level_follows_since() {
        let q = build_log_query(&filter(Some("2h"), Some("error"), None), now()).unwrap();
        assert_eq!(
            q.sql,
            "SELECT log_message, log_level, created_at FROM logs \
             WHERE created_at >= ?1 AND log_level = ?2 ORDER BY created_at DESC"
        );
        assert_eq!(
            q.params,
            vec![
                BindValue::Text("2026-10-16T10:00:00Z".to_string()),
                BindValue::Text("error".to_string()),
            ]
        );
    }

    #[test]
    fn test_level_alone_is_first_bind() {
        let q = build_log_query(&filter(None, Some("warn"), None), now()).unwrap();
        assert!(q.sql.contains("WHERE log_level = ?1 ORDER BY"));
        assert_eq!(q.params, vec![BindValue::Text("warn".to_string())]);
    }

    #[test]
    fn test_limit_takes_next_position() {
        let q = build_log_query(&filter(Some("1h"), Some("info"), Some("10")), now()).unwrap();
        assert!(q.sql.ends_with("ORDER BY created_at DESC LIMIT ?3"));
        assert_eq!(q.params[2], BindValue::Integer(10));

        let q = build_log_query(&filter(None, None, Some("5")), now()).unwrap();
        assert!(q.sql.ends_with("ORDER BY created_at DESC LIMIT ?1"));
        assert_eq!(q.params, vec![BindValue::Integer(5)]);
    }

    #[test]
    fn test_invalid_limit() {
        for limit in ["ten", "-1", "1.5", "1; DROP TABLE logs"] {
            let err = build_log_query(&filter(None, None, Some(limit)), now()).unwrap_err();
            assert_eq!(err, ValidationError::Limit(limit.to_string()));
        }
    }

    #[test]
    fn test_user_input_never_in_statement() {
        let hostile = "x' OR '1'='1";
        let q = build_log_query(&filter(None, Some(hostile), None), now()).unwrap();
        assert!(!q.sql.contains(hostile));
        assert_eq!(q.params, vec![BindValue::Text(hostile.to_string())]);
    }

    #[test]
    fn test_placeholders_match_params() {
        let q = build_log_query(&filter(Some("3h"), Some("debug"), Some("7")), now()).unwrap();
        for n in 1..=q.params.len() {
            assert!(q.sql.contains(&format!("?{}", n)));
        }
        assert!(!q.sql.contains(&format!("?{}", q.params.len() + 1)));
    }
}
