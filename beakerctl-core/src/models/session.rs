use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The session store keeps the creation and last-access instants inside the
/// serialized payload as epoch seconds under these keys. The reader converts
/// them to date-times; every other payload value becomes plain text.
pub const RESERVED_TIME_KEYS: [&str; 2] = ["_accessed_time", "_creation_time"];

/// One row of the session table, as the session-store library writes it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SessionRow {
    pub namespace: String,
    pub created: DateTime<Utc>,
    pub accessed: DateTime<Utc>,
    pub data: Option<Vec<u8>>,
}

/// A payload value normalized for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionValue {
    Timestamp(DateTime<Utc>),
    Text(String),
}

/// Normalized key/value view of one session payload. The BTreeMap keeps key
/// iteration lexicographic, which is the column order the report expects.
pub type SessionMapping = BTreeMap<String, SessionValue>;
