//! The payload returned by a GET against the remote store.
//!
//! Parsing is deliberately lenient. The remote sheet can contain rows written
//! by newer versions of the app or by hand, and a single bad record must never
//! cost us the rest of the snapshot: records that fail to parse are logged and
//! skipped, and top-level fields the server omitted are left `None` so local
//! state for them is untouched.

use crate::model::{AppSettings, Student, Transaction};
use serde_json::Value;
use tracing::warn;

/// A partial snapshot of remote state. `None` fields mean "the server did not
/// send this section" and must not clear local state.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RemoteSnapshot {
    pub students: Option<Vec<Student>>,
    pub transactions: Option<Vec<Transaction>>,
    pub settings: Option<AppSettings>,
}

impl RemoteSnapshot {
    /// Builds a snapshot from the raw JSON body of a GET response.
    pub fn from_value(body: Value) -> Self {
        let students = body
            .get("students")
            .and_then(Value::as_array)
            .map(|rows| parse_records(rows, "student"));
        let transactions = body
            .get("transactions")
            .and_then(Value::as_array)
            .map(|rows| parse_records(rows, "transaction"));

        // Settings are only taken when loginTitle is present and non-empty,
        // which is how the remote distinguishes a real settings row from an
        // uninitialized sheet.
        let settings = body
            .get("settings")
            .filter(|s| {
                s.get("loginTitle")
                    .and_then(Value::as_str)
                    .is_some_and(|t| !t.is_empty())
            })
            .and_then(|s| match serde_json::from_value(s.clone()) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    warn!("Skipping malformed settings record: {e}");
                    None
                }
            });

        Self {
            students,
            transactions,
            settings,
        }
    }
}

/// Parses each record independently, skipping the ones that fail.
fn parse_records<T: serde::de::DeserializeOwned>(rows: &[Value], what: &str) -> Vec<T> {
    rows.iter()
        .filter_map(|row| match serde_json::from_value(row.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed {what} record: {e}");
                None
            }
        })
        .collect()
}
