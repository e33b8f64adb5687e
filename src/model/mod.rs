//! Types that represent the core data model, such as `Student` and `Transaction`.
mod settings;
mod snapshot;
mod student;
mod transaction;
mod user;

pub use settings::AppSettings;
pub use snapshot::RemoteSnapshot;
pub use student::Student;
pub use transaction::{Transaction, TxKind};
pub use user::{Role, User};

/// Formats an amount in the smallest currency unit as a rupiah string,
/// e.g. `-12500` -> `-Rp12,500`. Grouping is done on the integer digits, so
/// the result is exact for the full `i64` range.
pub fn format_rupiah(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}Rp{grouped}")
}
