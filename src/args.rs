//! These structs provide the CLI interface for the ekas CLI.

use crate::model::TxKind;
use chrono::{DateTime, Datelike, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ekas: a command-line tool for a classroom cash & savings ledger.
///
/// The ledger lives in a Google Sheet behind a deployed Apps Script web app.
/// This program keeps a local offline copy of the students, transactions and
/// settings, serves all reads from that copy, and sends each change to the
/// remote store without waiting for confirmation. When the remote is
/// unreachable the local copy keeps working; run `ekas refresh` to retry.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ekas data and configuration is held. Defaults to
    /// ~/ekas
    #[arg(long, env = "EKAS_HOME", default_value_os_t = default_ekas_home())]
    ekas_home: PathBuf,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ekas_home(&self) -> &PathBuf {
        &self.ekas_home
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// Run this once, passing --script-url with the URL of your deployed
    /// Google Apps Script web app (the URL ends in /exec).
    Init(InitArgs),
    /// Log in to the ledger. The session is kept until `ekas logout`.
    Login(LoginArgs),
    /// Log out and clear the stored session.
    Logout,
    /// Fetch the latest data from the remote store into the local cache.
    Refresh,
    /// Show the class stats: balances, student count and recent activity.
    Dashboard,
    /// List, add or delete transactions.
    #[command(subcommand)]
    Tx(TxCommand),
    /// List, add, update or delete students.
    #[command(subcommand)]
    Students(StudentsCommand),
    /// Show the monthly report: the kas payment matrix or the savings summary.
    Report(ReportArgs),
    /// Show or update the application settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

/// (Not shown): Args for the `ekas init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the deployed Apps Script web app, e.g.
    /// https://script.google.com/macros/s/AKfycb.../exec
    #[arg(long)]
    script_url: String,
}

impl InitArgs {
    pub fn script_url(&self) -> &str {
        &self.script_url
    }
}

/// (Not shown): Args for the `ekas login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,
}

impl LoginArgs {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TxCommand {
    /// List the transaction log, newest first.
    List,
    /// Record a transaction.
    Add(TxAddArgs),
    /// Delete a transaction by id.
    Delete(DeleteArgs),
}

/// The recognized transaction kinds, as CLI values.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KindArg {
    /// A deposit to the class cash fund.
    Kas,
    /// A deposit to a student's savings.
    Tabungan,
    /// A withdrawal from the class cash fund.
    OutKas,
    /// A withdrawal from a student's savings.
    OutTabungan,
}

serde_plain::derive_display_from_serialize!(KindArg);
serde_plain::derive_fromstr_from_deserialize!(KindArg);

impl From<KindArg> for TxKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Kas => TxKind::Kas,
            KindArg::Tabungan => TxKind::Tabungan,
            KindArg::OutKas => TxKind::OutKas,
            KindArg::OutTabungan => TxKind::OutTabungan,
        }
    }
}

/// (Not shown): Args for the `ekas tx add` command.
#[derive(Debug, Parser, Clone)]
pub struct TxAddArgs {
    /// The transaction kind.
    #[arg(long)]
    kind: KindArg,

    /// The amount in whole rupiah. Non-negative; the kind carries the sign.
    #[arg(long)]
    amount: u64,

    /// The id of the student this transaction belongs to. Required for
    /// tabungan kinds; omit for a general class-level kas entry.
    #[arg(long)]
    student: Option<String>,

    /// The transaction date as an RFC 3339 timestamp. Defaults to now; an
    /// earlier date backdates the entry.
    #[arg(long)]
    date: Option<DateTime<Utc>>,

    /// Free-form notes.
    #[arg(long)]
    notes: Option<String>,
}

impl TxAddArgs {
    pub fn kind(&self) -> KindArg {
        self.kind
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn student(&self) -> Option<&str> {
        self.student.as_deref()
    }

    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}

/// (Not shown): Args for delete-by-id commands.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the record to delete.
    id: String,
}

impl DeleteArgs {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum StudentsCommand {
    /// List the students.
    List,
    /// Add a student.
    Add(StudentAddArgs),
    /// Replace a student's record by id.
    Update(StudentUpdateArgs),
    /// Delete a student by id. Their past transactions are kept.
    Delete(DeleteArgs),
}

/// (Not shown): Args for the `ekas students add` command.
#[derive(Debug, Parser, Clone)]
pub struct StudentAddArgs {
    /// The student's name.
    #[arg(long)]
    name: String,

    /// The student number (NIS).
    #[arg(long)]
    nis: String,
}

impl StudentAddArgs {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nis(&self) -> &str {
        &self.nis
    }
}

/// (Not shown): Args for the `ekas students update` command.
#[derive(Debug, Parser, Clone)]
pub struct StudentUpdateArgs {
    /// The id of the student to update.
    id: String,

    /// The student's name.
    #[arg(long)]
    name: String,

    /// The student number (NIS).
    #[arg(long)]
    nis: String,
}

impl StudentUpdateArgs {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nis(&self) -> &str {
        &self.nis
    }
}

/// Which ledger the monthly report covers.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Kas,
    Tabungan,
}

serde_plain::derive_display_from_serialize!(ReportKind);
serde_plain::derive_fromstr_from_deserialize!(ReportKind);

/// (Not shown): Args for the `ekas report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The ledger to report on.
    #[arg(long, default_value_t = ReportKind::Kas)]
    kind: ReportKind,

    /// The month (1-12). Defaults to the current month.
    #[arg(long, default_value_t = Utc::now().month())]
    month: u32,

    /// The year. Defaults to the current year.
    #[arg(long, default_value_t = Utc::now().year())]
    year: i32,
}

impl ReportArgs {
    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Show the current settings.
    Show,
    /// Replace the settings.
    Update(SettingsUpdateArgs),
}

/// (Not shown): Args for the `ekas settings update` command.
#[derive(Debug, Parser, Clone)]
pub struct SettingsUpdateArgs {
    /// The title shown on the login screen.
    #[arg(long)]
    login_title: String,

    /// The description shown on the login screen.
    #[arg(long)]
    login_description: String,

    /// The starting balance of the kas ledger, in whole rupiah.
    #[arg(long)]
    initial_kas_balance: i64,
}

impl SettingsUpdateArgs {
    pub fn login_title(&self) -> &str {
        &self.login_title
    }

    pub fn login_description(&self) -> &str {
        &self.login_description
    }

    pub fn initial_kas_balance(&self) -> i64 {
        self.initial_kas_balance
    }
}

fn default_ekas_home() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join("ekas"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ekas-home or EKAS_HOME instead of relying on the default \
                ekas home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ekas")
        }
    }
}
