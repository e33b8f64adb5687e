//! The transaction log entry and its type discriminant.
//!
//! A `Transaction` is immutable once created; the only operations on the log
//! are add and delete. The direction of a movement is carried entirely by
//! `TxKind`; `amount` is always non-negative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

const KAS_STR: &str = "KAS";
const TABUNGAN_STR: &str = "TABUNGAN";
const OUT_KAS_STR: &str = "OUT_KAS";
const OUT_TABUNGAN_STR: &str = "OUT_TABUNGAN";

/// The ledger movement type of a transaction.
///
/// `Kas`/`OutKas` are deposits to and withdrawals from the shared class cash
/// fund; `Tabungan`/`OutTabungan` are deposits to and withdrawals from a
/// student's individual savings. Any other wire value is preserved verbatim in
/// `Other` so that forward-incompatible records survive round-trips; every
/// aggregation ignores `Other` with an explicit no-op arm.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TxKind {
    Kas,
    Tabungan,
    OutKas,
    OutTabungan,
    Other(String),
}

impl TxKind {
    /// Returns `true` for the deposit types that count toward period collections.
    pub fn is_income(&self) -> bool {
        matches!(self, TxKind::Kas | TxKind::Tabungan)
    }

    /// Returns `true` for the withdrawal types.
    pub fn is_expense(&self) -> bool {
        matches!(self, TxKind::OutKas | TxKind::OutTabungan)
    }

    fn as_wire_str(&self) -> &str {
        match self {
            TxKind::Kas => KAS_STR,
            TxKind::Tabungan => TABUNGAN_STR,
            TxKind::OutKas => OUT_KAS_STR,
            TxKind::OutTabungan => OUT_TABUNGAN_STR,
            TxKind::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for TxKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            KAS_STR => TxKind::Kas,
            TABUNGAN_STR => TxKind::Tabungan,
            OUT_KAS_STR => TxKind::OutKas,
            OUT_TABUNGAN_STR => TxKind::OutTabungan,
            _ => TxKind::Other(value),
        }
    }
}

impl From<TxKind> for String {
    fn from(value: TxKind) -> Self {
        value.as_wire_str().to_string()
    }
}

impl Display for TxKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire_str())
    }
}

/// A single entry in the transaction log.
///
/// `student_id` is a weak reference: it must name a known student at creation
/// time, but deleting a student later leaves the reference dangling on purpose
/// (historical transactions survive student removal). A `None` student is a
/// general class-level entry, valid only for the kas ledger types.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: TxKind,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
