//! The process-local state store: session, settings, students and the
//! transaction log.
//!
//! There is exactly one mutator context, so no locking is used; the store is
//! owned by the `App` and handed to the ledger functions as read-only slices.
//! Every successful mutation writes through to its cache slot on disk before
//! returning, independent of remote sync outcome, so the last-known state
//! survives a restart and offline use.
//!
//! Ids are `"TRX-"`/`"STD-"` plus the creation epoch millis. Two creations in
//! the same millisecond would collide; this is accepted, not defended against.

use crate::model::{AppSettings, RemoteSnapshot, Student, Transaction, TxKind, User};
use crate::{utils, Config, Result};
use anyhow::bail;
use chrono::{DateTime, Utc};

const TRANSACTION_ID_PREFIX: &str = "TRX";
const STUDENT_ID_PREFIX: &str = "STD";

/// The fields of a transaction the caller provides; the id is assigned here.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub student_id: Option<String>,
    pub amount: u64,
    pub kind: TxKind,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// The in-memory state plus the paths of its four cache slots.
#[derive(Debug)]
pub struct Store {
    config: Config,
    user: Option<User>,
    settings: AppSettings,
    students: Vec<Student>,
    transactions: Vec<Transaction>,
}

impl Store {
    /// Loads the store from the cache slots. A missing slot yields its
    /// default: no session, default settings, empty lists.
    pub async fn load(config: Config) -> Result<Self> {
        let user = utils::read_json_opt(&config.session_path()).await?;
        let settings = utils::read_json_opt(&config.settings_path())
            .await?
            .unwrap_or_default();
        let students = utils::read_json_opt(&config.students_path())
            .await?
            .unwrap_or_default();
        let transactions = utils::read_json_opt(&config.transactions_path())
            .await?
            .unwrap_or_default();
        Ok(Self {
            config,
            user,
            settings,
            students,
            transactions,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn student_by_id(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Records the session after a successful credential check.
    pub async fn login(&mut self, user: User) -> Result<()> {
        utils::write_json(&self.config.session_path(), &user).await?;
        self.user = Some(user);
        Ok(())
    }

    /// Clears the session and removes its slot.
    pub async fn logout(&mut self) -> Result<()> {
        utils::remove_if_exists(&self.config.session_path()).await?;
        self.user = None;
        Ok(())
    }

    /// Creates a transaction with a fresh id and inserts it at the head of the
    /// log, so default display order is reverse-chronological by insertion.
    /// The `date` may be backdated, which can leave the log chronologically
    /// out of order relative to insertion order; that is allowed.
    pub async fn add_transaction(
        &mut self,
        new: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        match &new.student_id {
            Some(id) => {
                // The reference must be valid at creation time; it may dangle
                // later if the student is deleted.
                if self.student_by_id(id).is_none() {
                    bail!("No student with id '{id}'");
                }
            }
            None => {
                // General class-level entries only exist on the kas ledger.
                if !matches!(new.kind, TxKind::Kas | TxKind::OutKas) {
                    bail!("A {} transaction requires a student", new.kind);
                }
            }
        }

        let transaction = Transaction {
            id: fresh_id(TRANSACTION_ID_PREFIX, now),
            student_id: new.student_id,
            amount: new.amount,
            kind: new.kind,
            date: new.date,
            notes: new.notes,
        };
        self.transactions.insert(0, transaction.clone());
        self.save_transactions().await?;
        Ok(transaction)
    }

    /// Deletes a transaction by id. Deleting an unknown id is a no-op, like
    /// filtering it out of the list.
    pub async fn delete_transaction(&mut self, id: &str) -> Result<()> {
        self.transactions.retain(|t| t.id != id);
        self.save_transactions().await
    }

    /// Creates a student with a fresh id and appends them to the list.
    pub async fn add_student(
        &mut self,
        name: impl Into<String>,
        nis: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Student> {
        let student = Student::new(fresh_id(STUDENT_ID_PREFIX, now), name, nis);
        self.students.push(student.clone());
        self.save_students().await?;
        Ok(student)
    }

    /// Replaces the student with the same id wholesale.
    pub async fn update_student(&mut self, student: Student) -> Result<()> {
        let Some(existing) = self.students.iter_mut().find(|s| s.id == student.id) else {
            bail!("No student with id '{}'", student.id);
        };
        *existing = student;
        self.save_students().await
    }

    /// Removes a student. Their transactions are left in place with a dangling
    /// `student_id`: historical records survive student removal.
    pub async fn delete_student(&mut self, id: &str) -> Result<()> {
        self.students.retain(|s| s.id != id);
        self.save_students().await
    }

    /// Replaces the settings singleton wholesale.
    pub async fn update_settings(&mut self, settings: AppSettings) -> Result<()> {
        self.settings = settings;
        utils::write_json(&self.config.settings_path(), &self.settings).await
    }

    /// Applies a remote snapshot with partial-update semantics: each present
    /// field overwrites local state wholesale, absent fields leave local state
    /// untouched. Updated slots are written through like any other mutation.
    pub async fn apply_snapshot(&mut self, snapshot: RemoteSnapshot) -> Result<()> {
        if let Some(students) = snapshot.students {
            self.students = students;
            self.save_students().await?;
        }
        if let Some(transactions) = snapshot.transactions {
            self.transactions = transactions;
            self.save_transactions().await?;
        }
        if let Some(settings) = snapshot.settings {
            self.settings = settings;
            utils::write_json(&self.config.settings_path(), &self.settings).await?;
        }
        Ok(())
    }

    async fn save_students(&self) -> Result<()> {
        utils::write_json(&self.config.students_path(), &self.students).await
    }

    async fn save_transactions(&self) -> Result<()> {
        utils::write_json(&self.config.transactions_path(), &self.transactions).await
    }
}

/// `"<PREFIX>-" + creation epoch millis`.
fn fresh_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{prefix}-{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const SCRIPT_URL: &str = "https://script.google.com/macros/s/AKfycbzSTORE/exec";

    async fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path().join("ekas"), SCRIPT_URL)
            .await
            .unwrap();
        let store = Store::load(config).await.unwrap();
        (dir, store)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 30, 0).unwrap()
    }

    fn kas_deposit(student_id: Option<&str>) -> NewTransaction {
        NewTransaction {
            student_id: student_id.map(str::to_string),
            amount: 5000,
            kind: TxKind::Kas,
            date: now(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_defaults_when_slots_missing() {
        let (_dir, store) = store().await;
        assert!(store.user().is_none());
        assert_eq!(store.settings().login_title, "E-Kas & Tabungan");
        assert!(store.students().is_empty());
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_add_transaction_prepends() {
        let (_dir, mut store) = store().await;
        let first = store.add_transaction(kas_deposit(None), now()).await.unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 6, 7, 30, 1).unwrap();
        let second = store.add_transaction(kas_deposit(None), later).await.unwrap();

        let ids: Vec<&str> = store.transactions().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert!(first.id.starts_with("TRX-"));
    }

    #[tokio::test]
    async fn test_add_transaction_rejects_unknown_student() {
        let (_dir, mut store) = store().await;
        let result = store.add_transaction(kas_deposit(Some("STD-404")), now()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_tabungan_requires_student() {
        let (_dir, mut store) = store().await;
        let mut new = kas_deposit(None);
        new.kind = TxKind::Tabungan;
        let result = store.add_transaction(new, now()).await;
        assert!(result.is_err());

        // OUT_KAS without a student is the general class expense case.
        let mut expense = kas_deposit(None);
        expense.kind = TxKind::OutKas;
        assert!(store.add_transaction(expense, now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_student_leaves_transactions_dangling() {
        let (_dir, mut store) = store().await;
        let student = store.add_student("Budi", "2302", now()).await.unwrap();
        let tx = store
            .add_transaction(kas_deposit(Some(&student.id)), now())
            .await
            .unwrap();

        store.delete_student(&student.id).await.unwrap();

        assert!(store.students().is_empty());
        assert_eq!(store.transactions().len(), 1);
        assert_eq!(
            store.transactions()[0].student_id.as_deref(),
            Some(student.id.as_str())
        );
        assert_eq!(store.transactions()[0].id, tx.id);
    }

    #[tokio::test]
    async fn test_update_student_replaces_by_id() {
        let (_dir, mut store) = store().await;
        let mut student = store.add_student("Budi", "2302", now()).await.unwrap();
        student.name = "Budi Hartono".to_string();
        store.update_student(student.clone()).await.unwrap();
        assert_eq!(store.student_by_id(&student.id).unwrap().name, "Budi Hartono");

        let ghost = Student::new("STD-404", "Ghost", "0");
        assert!(store.update_student(ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_write_through_survives_reload() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ekas");
        let config = Config::create(&home, SCRIPT_URL).await.unwrap();

        let mut store = Store::load(config).await.unwrap();
        store.add_student("Citra", "2303", now()).await.unwrap();
        store.add_transaction(kas_deposit(None), now()).await.unwrap();
        store
            .update_settings(AppSettings {
                login_title: "Kas 7B".to_string(),
                login_description: "desc".to_string(),
                initial_kas_balance: 50000,
            })
            .await
            .unwrap();
        store
            .login(User {
                username: "admin".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        drop(store);

        let reloaded = Store::load(Config::load(&home).await.unwrap()).await.unwrap();
        assert_eq!(reloaded.students().len(), 1);
        assert_eq!(reloaded.transactions().len(), 1);
        assert_eq!(reloaded.settings().initial_kas_balance, 50000);
        assert_eq!(reloaded.user().unwrap().username, "admin");
    }

    #[tokio::test]
    async fn test_logout_removes_session_slot() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ekas");
        let config = Config::create(&home, SCRIPT_URL).await.unwrap();
        let mut store = Store::load(config).await.unwrap();
        store
            .login(User {
                username: "admin".to_string(),
                role: Role::Admin,
            })
            .await
            .unwrap();
        store.logout().await.unwrap();
        drop(store);

        let reloaded = Store::load(Config::load(&home).await.unwrap()).await.unwrap();
        assert!(reloaded.user().is_none());
    }

    #[tokio::test]
    async fn test_apply_snapshot_partial() {
        let (_dir, mut store) = store().await;
        store.add_student("Budi", "2302", now()).await.unwrap();

        // A snapshot with only transactions must not clear the student list.
        let snapshot = RemoteSnapshot {
            students: None,
            transactions: Some(vec![]),
            settings: None,
        };
        store.apply_snapshot(snapshot).await.unwrap();
        assert_eq!(store.students().len(), 1);
        assert!(store.transactions().is_empty());

        // A snapshot with an explicitly empty student list does clear it.
        let snapshot = RemoteSnapshot {
            students: Some(vec![]),
            transactions: None,
            settings: None,
        };
        store.apply_snapshot(snapshot).await.unwrap();
        assert!(store.students().is_empty());
    }
}
