//! The seam between the ledger and the remote store.
//!
//! The remote is a spreadsheet-backed Apps Script web app with exactly two
//! operations: a GET that returns a (possibly partial) snapshot, and a POST
//! that receives a write intent whose outcome is not observable. Everything
//! behind the `Gateway` trait; the `TestGateway` implementation lets the whole
//! app run without a network.

mod remote;
mod test_gateway;

use crate::model::RemoteSnapshot;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) use test_gateway::{TestGateway, TestState};

/// The action names accepted by the remote store's POST endpoint.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAction {
    AddTransaction,
    DeleteTransaction,
    AddStudent,
    UpdateStudent,
    DeleteStudent,
    UpdateSettings,
}

serde_plain::derive_display_from_serialize!(SyncAction);
serde_plain::derive_fromstr_from_deserialize!(SyncAction);

/// Whether to use the real Apps Script endpoint or the in-memory test gateway.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Remote,
    Test,
}

impl Mode {
    /// Returns `Mode::Test` when `EKAS_IN_TEST_MODE` is set and non-empty.
    /// This allows running the program end-to-end without hitting the remote
    /// endpoint.
    pub fn from_env() -> Self {
        match std::env::var("EKAS_IN_TEST_MODE") {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Remote,
        }
    }
}

/// The remote store, reduced to the two calls the core consumes: a snapshot
/// read and a fire-and-forget write intent.
#[async_trait::async_trait]
pub trait Gateway: Send {
    /// Fetches the current remote snapshot. A transport failure, timeout or
    /// non-success status is an error; the caller keeps serving local state.
    async fn fetch(&self) -> Result<RemoteSnapshot>;

    /// Sends a write intent. The response body and status are not observable
    /// by design; only a transport-level failure is an error, and even that
    /// must not roll back the local mutation.
    async fn push(&self, action: SyncAction, data: Value) -> Result<()>;
}

/// Creates the `Gateway` for the given mode.
pub fn gateway(config: &Config, mode: Mode) -> Result<Box<dyn Gateway + Send>> {
    match mode {
        Mode::Remote => Ok(Box::new(remote::ScriptGateway::new(config.script_url())?)),
        Mode::Test => Ok(Box::new(TestGateway::new(config.script_url()))),
    }
}
