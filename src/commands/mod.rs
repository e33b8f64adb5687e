//! Command handlers for the ekas CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod dashboard;
mod init;
mod refresh;
mod report;
mod settings;
mod students;
mod tx;

use crate::model::User;
use crate::{App, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout};
pub use dashboard::dashboard;
pub use init::init;
pub use refresh::refresh;
pub use report::report;
pub use settings::{settings_show, settings_update};
pub use students::{students_add, students_delete, students_list, students_update};
pub use tx::{tx_add, tx_delete, tx_list};

/// The output type for a command. This allows the command to return a
/// consistent message and, optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the
    /// command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as
    /// JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Every command except `init` and `login` requires a stored session.
fn require_session(app: &App) -> Result<&User> {
    match app.store().user() {
        Some(user) => Ok(user),
        None => anyhow::bail!("You are not logged in; run 'ekas login' first"),
    }
}

/// Appends the offline banner to a message when the connectivity flag is down.
fn with_offline_notice(app: &App, message: String) -> String {
    match app.offline_notice() {
        Some(notice) => format!("{message}\n\n{notice}"),
        None => message,
    }
}
