//! Single-actor orchestration of the store and the remote gateway.
//!
//! All reads are served from the local store; the remote is consulted only by
//! an explicit refresh. Mutations are optimistic: local state changes first
//! (and is written through to the cache slots), then the write intent is
//! pushed fire-and-forget. A failed push flips the connectivity flag but never
//! rolls the mutation back; there is no retry queue — recovery is the next
//! manual refresh.

use crate::api::{Gateway, Mode, SyncAction};
use crate::model::{AppSettings, RemoteSnapshot, Student, Transaction, User};
use crate::store::{NewTransaction, Store};
use crate::{api, Config, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, warn};

/// Identifies one fetch attempt, so that a response landing after a newer
/// fetch has started can be recognized and discarded.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FetchTicket(u64);

/// Owns the store, the gateway and the connectivity flag. There is exactly
/// one `App` per process; operations take `&mut self` and run to completion,
/// so state is never mutated concurrently.
pub struct App {
    store: Store,
    gateway: Box<dyn Gateway + Send>,
    /// `None` until the first remote interaction settles it.
    online: Option<bool>,
    fetch_gen: u64,
}

impl App {
    /// Loads the local store and constructs the gateway for `mode`.
    pub async fn open(config: Config, mode: Mode) -> Result<Self> {
        let gateway = api::gateway(&config, mode)?;
        let store = Store::load(config).await?;
        Ok(Self {
            store,
            gateway,
            online: None,
            fetch_gen: 0,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The connectivity flag: `Some(false)` after a failed fetch or push,
    /// `Some(true)` after a success, `None` before any remote interaction.
    pub fn online(&self) -> Option<bool> {
        self.online
    }

    /// The offline notice shown by data commands while the connectivity flag
    /// is down. Rendering local state is never blocked by it.
    pub fn offline_notice(&self) -> Option<&'static str> {
        match self.online {
            Some(false) => Some(
                "Offline mode: changes are saved on this device and will sync later. \
                Run 'ekas refresh' to retry.",
            ),
            _ => None,
        }
    }

    /// Fetches the remote snapshot and applies it. Returns `true` when a
    /// snapshot was applied.
    pub async fn refresh(&mut self) -> Result<bool> {
        let ticket = self.begin_fetch();
        let result = self.gateway.fetch().await;
        self.apply_fetch(ticket, result).await
    }

    /// Starts a fetch attempt. Starting a new fetch supersedes any attempt
    /// still in flight: the older response will be discarded when it lands.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.fetch_gen += 1;
        FetchTicket(self.fetch_gen)
    }

    /// Completes a fetch attempt.
    ///
    /// Responses are applied in completion order (last response wins), except
    /// that a response from a superseded attempt is discarded — the original
    /// app had no such cancellation and a stale response could clobber newer
    /// state. A failed fetch flips the flag offline and keeps serving the
    /// last-known local snapshot.
    pub async fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<RemoteSnapshot>,
    ) -> Result<bool> {
        if ticket.0 != self.fetch_gen {
            debug!("Discarding response from superseded fetch {}", ticket.0);
            return Ok(false);
        }
        match result {
            Ok(snapshot) => {
                self.store.apply_snapshot(snapshot).await?;
                self.online = Some(true);
                Ok(true)
            }
            Err(e) => {
                warn!("Running in offline mode (cache): {e}");
                self.online = Some(false);
                Ok(false)
            }
        }
    }

    /// Adds a transaction locally, then pushes the intent.
    pub async fn add_transaction(
        &mut self,
        new: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        let transaction = self.store.add_transaction(new, now).await?;
        self.push_intent(SyncAction::AddTransaction, serde_json::to_value(&transaction)?)
            .await;
        Ok(transaction)
    }

    /// Deletes a transaction locally, then pushes the intent.
    pub async fn delete_transaction(&mut self, id: &str) -> Result<()> {
        self.store.delete_transaction(id).await?;
        self.push_intent(SyncAction::DeleteTransaction, json!({ "id": id }))
            .await;
        Ok(())
    }

    /// Adds a student locally, then pushes the intent.
    pub async fn add_student(
        &mut self,
        name: impl Into<String>,
        nis: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Student> {
        let student = self.store.add_student(name, nis, now).await?;
        self.push_intent(SyncAction::AddStudent, serde_json::to_value(&student)?)
            .await;
        Ok(student)
    }

    /// Replaces a student locally, then pushes the intent.
    pub async fn update_student(&mut self, student: Student) -> Result<()> {
        self.store.update_student(student.clone()).await?;
        self.push_intent(SyncAction::UpdateStudent, serde_json::to_value(&student)?)
            .await;
        Ok(())
    }

    /// Deletes a student locally (their transactions remain), then pushes the
    /// intent.
    pub async fn delete_student(&mut self, id: &str) -> Result<()> {
        self.store.delete_student(id).await?;
        self.push_intent(SyncAction::DeleteStudent, json!({ "id": id }))
            .await;
        Ok(())
    }

    /// Replaces the settings locally, then pushes the intent.
    pub async fn update_settings(&mut self, settings: AppSettings) -> Result<()> {
        self.store.update_settings(settings.clone()).await?;
        self.push_intent(SyncAction::UpdateSettings, serde_json::to_value(&settings)?)
            .await;
        Ok(())
    }

    /// Records the session after checking the credentials.
    ///
    /// The credential check is the original's hardcoded admin pair; hardening
    /// it is explicitly out of scope.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<User> {
        if username != "admin" || password != "admin123" {
            anyhow::bail!("Wrong username or password");
        }
        let user = User {
            username: username.to_string(),
            role: crate::model::Role::Admin,
        };
        self.store.login(user.clone()).await?;
        Ok(user)
    }

    /// Clears the session.
    pub async fn logout(&mut self) -> Result<()> {
        self.store.logout().await
    }

    /// Fire-and-forget persistence of a write intent. The outcome only moves
    /// the connectivity flag; it never gates or reverts the local mutation.
    async fn push_intent(&mut self, action: SyncAction, data: serde_json::Value) {
        match self.gateway.push(action, data).await {
            Ok(()) => self.online = Some(true),
            Err(e) => {
                warn!("Failed to sync {action}: {e}");
                self.online = Some(false);
            }
        }
    }
}
