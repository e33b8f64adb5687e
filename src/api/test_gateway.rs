//! Implements the `Gateway` trait using in-memory data for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that
//! we can run the whole app, top-to-bottom, without a deployed Apps Script.
//! State lives in a process-global registry keyed by script URL, so separate
//! `TestGateway` values for the same URL observe each other's writes (as two
//! clients of the same sheet would), and tests using unique URLs are isolated.

use crate::api::{Gateway, SyncAction};
use crate::model::{AppSettings, RemoteSnapshot};
use crate::Result;
use anyhow::Context;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

static REGISTRY: OnceLock<Mutex<HashMap<String, TestState>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<String, TestState>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// The remote-side state held for one script URL. Students and transactions
/// are kept as raw JSON values: the fake remote is a dumb sheet and must be
/// able to hold records this version of the app does not understand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TestState {
    pub(crate) students: Vec<Value>,
    pub(crate) transactions: Vec<Value>,
    pub(crate) settings: Option<AppSettings>,
    /// When set, every push fails as an unreachable remote would.
    pub(crate) fail_pushes: bool,
}

impl Default for TestState {
    /// Loads the seed data from this module.
    fn default() -> Self {
        let seed: Value = serde_json::from_str(SEED_DATA).expect("seed data is valid JSON");
        Self {
            students: seed["students"].as_array().cloned().unwrap_or_default(),
            transactions: seed["transactions"].as_array().cloned().unwrap_or_default(),
            settings: serde_json::from_value(seed["settings"].clone()).ok(),
            fail_pushes: false,
        }
    }
}

impl TestState {
    /// An empty remote, as a freshly deployed sheet would be.
    pub(crate) fn empty() -> Self {
        Self {
            students: Vec::new(),
            transactions: Vec::new(),
            settings: None,
            fail_pushes: false,
        }
    }
}

/// An implementation of the `Gateway` trait that does not use the network. By
/// default the state for a URL is seeded with representative classroom data.
pub(crate) struct TestGateway {
    url: String,
}

impl TestGateway {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Gets a copy of the state for this gateway's URL, seeding it on first use.
    pub(crate) fn get_state(&self) -> TestState {
        let mut map = registry().lock().expect("test registry poisoned");
        map.entry(self.url.clone()).or_default().clone()
    }

    /// Replaces the state for this gateway's URL.
    pub(crate) fn set_state(&self, state: TestState) {
        let mut map = registry().lock().expect("test registry poisoned");
        map.insert(self.url.clone(), state);
    }
}

#[async_trait::async_trait]
impl Gateway for TestGateway {
    async fn fetch(&self) -> Result<RemoteSnapshot> {
        let state = self.get_state();
        let body = json!({
            "students": state.students,
            "transactions": state.transactions,
            "settings": state.settings,
        });
        Ok(RemoteSnapshot::from_value(body))
    }

    async fn push(&self, action: SyncAction, data: Value) -> Result<()> {
        let mut state = self.get_state();
        if state.fail_pushes {
            anyhow::bail!("connection refused");
        }
        match action {
            SyncAction::AddTransaction => {
                // New entries go to the head, matching the local log order.
                state.transactions.insert(0, data);
            }
            SyncAction::DeleteTransaction => {
                let id = id_of(&data)?;
                state.transactions.retain(|t| t["id"] != id);
            }
            SyncAction::AddStudent => state.students.push(data),
            SyncAction::UpdateStudent => {
                let id = id_of(&data)?;
                for student in &mut state.students {
                    if student["id"] == id {
                        *student = data.clone();
                    }
                }
            }
            SyncAction::DeleteStudent => {
                let id = id_of(&data)?;
                state.students.retain(|s| s["id"] != id);
            }
            SyncAction::UpdateSettings => {
                state.settings = Some(
                    serde_json::from_value(data).context("Invalid settings payload")?,
                );
            }
        }
        self.set_state(state);
        Ok(())
    }
}

fn id_of(data: &Value) -> Result<&str> {
    data.get("id")
        .and_then(Value::as_str)
        .context("Payload is missing an 'id' field")
}

/// Seed data: a small class part-way through a month of collections.
const SEED_DATA: &str = r##"{
  "students": [
    { "id": "STD-1714526400000", "name": "Andi Saputra", "nis": "2301" },
    { "id": "STD-1714526400001", "name": "Budi Hartono", "nis": "2302" },
    { "id": "STD-1714526400002", "name": "Citra Lestari", "nis": "2303" }
  ],
  "transactions": [
    {
      "id": "TRX-1714701600000",
      "studentId": "STD-1714526400000",
      "amount": 5000,
      "type": "KAS",
      "date": "2024-05-03T09:20:00Z",
      "notes": "Kas minggu 1"
    },
    {
      "id": "TRX-1714701600001",
      "studentId": "STD-1714526400001",
      "amount": 5000,
      "type": "KAS",
      "date": "2024-05-03T09:21:00Z"
    },
    {
      "id": "TRX-1714788000000",
      "studentId": "STD-1714526400002",
      "amount": 20000,
      "type": "TABUNGAN",
      "date": "2024-05-04T08:00:00Z"
    },
    {
      "id": "TRX-1714874400000",
      "amount": 15000,
      "type": "OUT_KAS",
      "date": "2024-05-05T10:00:00Z",
      "notes": "Beli spidol dan penghapus"
    }
  ],
  "settings": {
    "loginTitle": "E-Kas & Tabungan",
    "loginDescription": "Sistem manajemen keuangan kelas terintegrasi Cloud.",
    "initialKasBalance": 100000
  }
}"##;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn unique_url() -> String {
        format!(
            "https://script.google.com/macros/s/{}/exec",
            Uuid::new_v4().simple()
        )
    }

    #[tokio::test]
    async fn test_seeded_fetch() {
        let gateway = TestGateway::new(unique_url());
        let snapshot = gateway.fetch().await.unwrap();
        assert_eq!(snapshot.students.unwrap().len(), 3);
        assert_eq!(snapshot.transactions.unwrap().len(), 4);
        assert_eq!(snapshot.settings.unwrap().initial_kas_balance, 100000);
    }

    #[tokio::test]
    async fn test_push_round_trip() {
        let gateway = TestGateway::new(unique_url());
        gateway.set_state(TestState::empty());

        gateway
            .push(
                SyncAction::AddStudent,
                json!({ "id": "STD-1", "name": "Dewi", "nis": "2304" }),
            )
            .await
            .unwrap();
        let snapshot = gateway.fetch().await.unwrap();
        assert_eq!(snapshot.students.unwrap()[0].name, "Dewi");

        gateway
            .push(SyncAction::DeleteStudent, json!({ "id": "STD-1" }))
            .await
            .unwrap();
        let snapshot = gateway.fetch().await.unwrap();
        assert!(snapshot.students.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_pushes_toggle() {
        let gateway = TestGateway::new(unique_url());
        let mut state = TestState::empty();
        state.fail_pushes = true;
        gateway.set_state(state);

        let result = gateway
            .push(
                SyncAction::AddStudent,
                json!({ "id": "STD-1", "name": "Dewi", "nis": "2304" }),
            )
            .await;
        assert!(result.is_err());
        // Fetches still work; only writes are refused.
        assert!(gateway.fetch().await.is_ok());
        assert!(gateway.get_state().students.is_empty());
    }

    #[tokio::test]
    async fn test_same_url_shares_state() {
        let url = unique_url();
        let a = TestGateway::new(&url);
        let b = TestGateway::new(&url);
        a.set_state(TestState::empty());
        a.push(
            SyncAction::AddTransaction,
            json!({
                "id": "TRX-1", "amount": 100, "type": "KAS",
                "date": "2024-05-03T08:00:00Z"
            }),
        )
        .await
        .unwrap();
        let snapshot = b.fetch().await.unwrap();
        assert_eq!(snapshot.transactions.unwrap().len(), 1);
    }
}
