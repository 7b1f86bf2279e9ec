//! Fixed-width text rendering of session mappings.

use std::collections::BTreeMap;

use crate::models::session::{SessionMapping, SessionValue};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render session mappings as a fixed-width table.
///
/// Columns are the union of keys across all mappings, ordered
/// lexicographically; rows keep their input order. Every column is as wide as
/// its key or its widest value, values right-justified and joined by `" | "`.
pub fn render_report(sessions: &[SessionMapping]) -> String {
    if sessions.is_empty() {
        return "No sessions found".to_string();
    }

    // Format every value up front so widths are computed on the final text.
    let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
    let mut rows: Vec<BTreeMap<&str, String>> = Vec::new();
    for session in sessions {
        let mut row = BTreeMap::new();
        for (key, value) in session {
            let text = match value {
                SessionValue::Timestamp(dt) => dt.format(TIME_FORMAT).to_string(),
                SessionValue::Text(s) => s.clone(),
            };
            let width = columns
                .entry(key.as_str())
                .or_insert_with(|| key.chars().count());
            *width = (*width).max(text.chars().count());
            row.insert(key.as_str(), text);
        }
        rows.push(row);
    }

    let header = columns
        .iter()
        .map(|(key, width)| format!("{key:>w$}", w = *width))
        .collect::<Vec<_>>()
        .join(" | ");
    let dashes = "-".repeat(header.chars().count());

    let mut output = vec![dashes.clone(), header, dashes.clone()];
    for row in &rows {
        let line = columns
            .iter()
            .map(|(key, width)| {
                let value = row.get(key).map(String::as_str).unwrap_or("");
                format!("{value:>w$}", w = *width)
            })
            .collect::<Vec<_>>()
            .join(" | ");
        output.push(line);
    }
    output.push(dashes);

    output.join("\n")
}

// ============================================================================
// Tests
// ============================================================================
