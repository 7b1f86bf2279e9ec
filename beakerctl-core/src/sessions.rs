//! Read and prune rows of the session table.
//!
//! The table itself belongs to the session-store library; this module only
//! selects from it (report path) or deletes old rows (cleanup path). The
//! timeout is a data filter on the `accessed` column, never an execution
//! deadline.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::PgPool;

use crate::error::BeakerctlError;
use crate::models::session::{SessionMapping, SessionRow, SessionValue, RESERVED_TIME_KEYS};

/// Read sessions from `table`, oldest access first.
///
/// With a timeout, only rows accessed within the last `timeout` seconds are
/// returned. Rows without a usable session payload are skipped; payload bytes
/// that fail to decode are an error and propagate.
pub async fn read_sessions(
    pool: &PgPool,
    table: &str,
    timeout: Option<i64>,
) -> Result<Vec<SessionMapping>, BeakerctlError> {
    let rows: Vec<SessionRow> = match timeout {
        Some(seconds) => {
            let cutoff = Utc::now() - Duration::seconds(seconds);
            sqlx::query_as(&format!(
                r#"SELECT namespace, created, accessed, data FROM "{table}" WHERE accessed >= $1 ORDER BY accessed"#
            ))
            .bind(cutoff)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                r#"SELECT namespace, created, accessed, data FROM "{table}" ORDER BY accessed"#
            ))
            .fetch_all(pool)
            .await?
        }
    };

    let mut sessions = Vec::new();
    for row in &rows {
        if let Some(mapping) = session_mapping(row)? {
            sessions.push(mapping);
        }
    }
    Ok(sessions)
}

/// Delete every row whose last access is older than `timeout` seconds.
///
/// No dry-run and no undo. Returns the number of rows removed.
pub async fn cleanup_sessions(
    pool: &PgPool,
    table: &str,
    timeout: i64,
) -> Result<u64, BeakerctlError> {
    let cutoff = Utc::now() - Duration::seconds(timeout);
    let result = sqlx::query(&format!(r#"DELETE FROM "{table}" WHERE accessed < $1"#))
        .bind(cutoff)
        .execute(pool)
        .await?;

    let removed = result.rows_affected();
    if removed == 0 {
        tracing::debug!("No sessions older than {}s", timeout);
    } else {
        tracing::info!("Removed {} sessions older than {}s", removed, timeout);
    }
    Ok(removed)
}

/// Decode one row's payload into its normalized key/value mapping.
///
/// Returns `None` when the row carries no payload or the payload has no
/// non-empty `"session"` entry. The reserved time keys convert from epoch
/// seconds to date-times; every other value becomes text.
pub fn session_mapping(row: &SessionRow) -> Result<Option<SessionMapping>, BeakerctlError> {
    let Some(data) = row.data.as_deref() else {
        return Ok(None);
    };
    let payload: Value =
        serde_json::from_slice(data).map_err(|e| BeakerctlError::Payload(e.to_string()))?;
    let Some(session) = payload.get("session").and_then(Value::as_object) else {
        return Ok(None);
    };
    if session.is_empty() {
        return Ok(None);
    }

    let mut mapping = SessionMapping::new();
    for (key, value) in session {
        let normalized = if RESERVED_TIME_KEYS.contains(&key.as_str()) {
            SessionValue::Timestamp(epoch_to_datetime(key, value)?)
        } else {
            SessionValue::Text(value_text(value))
        };
        mapping.insert(key.clone(), normalized);
    }
    Ok(Some(mapping))
}

fn epoch_to_datetime(key: &str, value: &Value) -> Result<DateTime<Utc>, BeakerctlError> {
    let epoch = value.as_f64().ok_or_else(|| {
        BeakerctlError::Payload(format!("{key} is not an epoch timestamp: {value}"))
    })?;
    let seconds = epoch.trunc() as i64;
    let nanos = (epoch.fract() * 1e9) as u32;
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| BeakerctlError::Payload(format!("{key} is out of range: {epoch}")))
}

/// Plain strings render bare; everything else keeps its JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row_with_payload(payload: Option<Value>) -> SessionRow {
        let now = Utc::now();
        SessionRow {
            namespace: "ae6f9f8e6e9c4a8d".to_string(),
            created: now,
            accessed: now,
            data: payload.map(|p| serde_json::to_vec(&p).unwrap()),
        }
    }

    // ========================================================================
    // TEST: reserved keys round-trip from epoch floats to date-times,
    // equal to the second
    // ========================================================================
    #[test]
    fn test_session_mapping_reserved_keys_round_trip() {
        let row = row_with_payload(Some(json!({
            "session": {
                "_creation_time": 1690000000.0,
                "_accessed_time": 1690000100.5,
                "user_name": "john@doe.com"
            }
        })));

        let mapping = session_mapping(&row).unwrap().expect("mapping expected");

        assert_eq!(
            mapping["_creation_time"],
            SessionValue::Timestamp(DateTime::from_timestamp(1690000000, 0).unwrap())
        );
        match &mapping["_accessed_time"] {
            SessionValue::Timestamp(dt) => assert_eq!(dt.timestamp(), 1690000100),
            other => panic!("expected a timestamp, got {other:?}"),
        }
    }

    // ========================================================================
    // TEST: non-reserved values normalize to text, strings without quotes
    // ========================================================================
    #[test]
    fn test_session_mapping_values_become_text() {
        let row = row_with_payload(Some(json!({
            "session": {
                "user_name": "john@doe.com",
                "login_count": 3,
                "admin": false
            }
        })));

        let mapping = session_mapping(&row).unwrap().expect("mapping expected");

        assert_eq!(
            mapping["user_name"],
            SessionValue::Text("john@doe.com".to_string())
        );
        assert_eq!(mapping["login_count"], SessionValue::Text("3".to_string()));
        assert_eq!(mapping["admin"], SessionValue::Text("false".to_string()));
    }

    // ========================================================================
    // TEST: rows without a session entry are skipped, not errors
    // ========================================================================
    #[test]
    fn test_session_mapping_skips_unusable_payloads() {
        let cases = [
            row_with_payload(None),
            row_with_payload(Some(json!({}))),
            row_with_payload(Some(json!({"session": {}}))),
            row_with_payload(Some(json!({"other": {"user_name": "x"}}))),
        ];

        for row in &cases {
            assert!(session_mapping(row).unwrap().is_none());
        }
    }

    // ========================================================================
    // TEST: corrupt payload bytes are fatal
    // ========================================================================
    #[test]
    fn test_session_mapping_corrupt_payload() {
        let mut row = row_with_payload(None);
        row.data = Some(b"\x80\x04not json".to_vec());

        assert!(matches!(
            session_mapping(&row),
            Err(BeakerctlError::Payload(_))
        ));
    }

    // ========================================================================
    // TEST: a reserved key holding a non-number is fatal
    // ========================================================================
    #[test]
    fn test_session_mapping_bad_reserved_value() {
        let row = row_with_payload(Some(json!({
            "session": {"_creation_time": "yesterday"}
        })));

        assert!(matches!(
            session_mapping(&row),
            Err(BeakerctlError::Payload(_))
        ));
    }
}
