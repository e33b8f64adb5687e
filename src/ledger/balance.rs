//! Running-balance and collection aggregations over the transaction log.
//!
//! The aggregations impose no ordering requirement on the log and are
//! order-independent. Transactions with an unrecognized kind are excluded from
//! every sum by the explicit `Other` no-op arms; they must never make an
//! aggregation fail.

use crate::model::{AppSettings, Student, Transaction, TxKind};
use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;

/// The dashboard stats bundle.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ClassStats {
    pub total_kas: i64,
    pub total_tabungan: i64,
    pub total_students: usize,
    /// Deposits (kas + tabungan) collected in the last 7 days.
    pub week_collection: u64,
}

/// A student's savings balance, used by the tabungan report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StudentBalance {
    pub student: Student,
    pub balance: i64,
}

/// The kas withdrawals of one calendar month and their total.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MonthExpenses {
    pub transactions: Vec<Transaction>,
    pub total: u64,
}

/// The current kas balance: `initial + Σ(KAS) − Σ(OUT_KAS)`.
pub fn kas_balance(initial: i64, log: &[Transaction]) -> i64 {
    log.iter().fold(initial, |sum, t| match t.kind {
        TxKind::Kas => sum + t.amount as i64,
        TxKind::OutKas => sum - t.amount as i64,
        TxKind::Tabungan | TxKind::OutTabungan | TxKind::Other(_) => sum,
    })
}

/// The class-wide savings balance: `Σ(TABUNGAN) − Σ(OUT_TABUNGAN)`, no
/// starting offset.
pub fn tabungan_balance(log: &[Transaction]) -> i64 {
    log.iter().fold(0, |sum, t| match t.kind {
        TxKind::Tabungan => sum + t.amount as i64,
        TxKind::OutTabungan => sum - t.amount as i64,
        TxKind::Kas | TxKind::OutKas | TxKind::Other(_) => sum,
    })
}

/// One student's savings balance. Over-withdrawal is permitted, so the result
/// can be negative.
pub fn student_tabungan_balance(log: &[Transaction], student_id: &str) -> i64 {
    let for_student: Vec<Transaction> = log
        .iter()
        .filter(|t| t.student_id.as_deref() == Some(student_id))
        .cloned()
        .collect();
    tabungan_balance(&for_student)
}

/// Total deposits (kas and tabungan) within `[now − days, now]`, inclusive of
/// the lower bound. This is a point-in-time snapshot: `now` is the wall clock
/// at computation time, passed in explicitly so the function stays
/// deterministic.
pub fn period_collection(log: &[Transaction], now: DateTime<Utc>, days: i64) -> u64 {
    let since = now - Duration::days(days);
    log.iter()
        .filter(|t| t.kind.is_income() && t.date >= since && t.date <= now)
        .map(|t| t.amount)
        .sum()
}

/// Computes the dashboard stats from the current state.
pub fn class_stats(
    students: &[Student],
    log: &[Transaction],
    settings: &AppSettings,
    now: DateTime<Utc>,
) -> ClassStats {
    ClassStats {
        total_kas: kas_balance(settings.initial_kas_balance, log),
        total_tabungan: tabungan_balance(log),
        total_students: students.len(),
        week_collection: period_collection(log, now, 7),
    }
}

/// Per-student savings balances, sorted by balance descending (the report
/// ranks the biggest savers first).
pub fn tabungan_summary(students: &[Student], log: &[Transaction]) -> Vec<StudentBalance> {
    let mut rows: Vec<StudentBalance> = students
        .iter()
        .map(|student| StudentBalance {
            student: student.clone(),
            balance: student_tabungan_balance(log, &student.id),
        })
        .collect();
    rows.sort_by(|a, b| b.balance.cmp(&a.balance));
    rows
}

/// The OUT_KAS transactions dated in the given calendar month, with their total.
pub fn month_expenses(log: &[Transaction], year: i32, month: u32) -> MonthExpenses {
    let transactions: Vec<Transaction> = log
        .iter()
        .filter(|t| {
            t.kind == TxKind::OutKas
                && t.date.year() == year
                && t.date.month() == month
        })
        .cloned()
        .collect();
    let total = transactions.iter().map(|t| t.amount).sum();
    MonthExpenses {
        transactions,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(id: &str, kind: TxKind, amount: u64, student_id: Option<&str>) -> Transaction {
        Transaction {
            id: id.to_string(),
            student_id: student_id.map(str::to_string),
            amount,
            kind,
            date: Utc.with_ymd_and_hms(2024, 5, 3, 8, 0, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_concrete_balances() {
        // initial 100_000; KAS 20_000; OUT_KAS 5_000; TABUNGAN 10_000 for S1.
        let log = vec![
            tx("TRX-1", TxKind::Kas, 20000, None),
            tx("TRX-2", TxKind::OutKas, 5000, None),
            tx("TRX-3", TxKind::Tabungan, 10000, Some("S1")),
        ];
        assert_eq!(kas_balance(100000, &log), 115000);
        assert_eq!(tabungan_balance(&log), 10000);
        assert_eq!(student_tabungan_balance(&log, "S1"), 10000);
    }

    #[test]
    fn test_kas_balance_is_order_independent() {
        let mut log = vec![
            tx("TRX-1", TxKind::Kas, 7000, None),
            tx("TRX-2", TxKind::OutKas, 2000, None),
            tx("TRX-3", TxKind::Kas, 1000, Some("S2")),
            tx("TRX-4", TxKind::Tabungan, 9999, Some("S2")),
        ];
        let forward = kas_balance(500, &log);
        log.reverse();
        assert_eq!(kas_balance(500, &log), forward);
        assert_eq!(forward, 500 + 7000 - 2000 + 1000);
    }

    #[test]
    fn test_unknown_kind_excluded_everywhere() {
        let log = vec![
            tx("TRX-1", TxKind::Kas, 1000, None),
            tx("TRX-2", TxKind::Other("DENDA".to_string()), 999999, Some("S1")),
            tx("TRX-3", TxKind::Tabungan, 2000, Some("S1")),
        ];
        assert_eq!(kas_balance(0, &log), 1000);
        assert_eq!(tabungan_balance(&log), 2000);
        assert_eq!(student_tabungan_balance(&log, "S1"), 2000);
        let now = Utc.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap();
        assert_eq!(period_collection(&log, now, 7), 3000);
    }

    #[test]
    fn test_student_balance_can_go_negative() {
        let log = vec![
            tx("TRX-1", TxKind::Tabungan, 5000, Some("S1")),
            tx("TRX-2", TxKind::OutTabungan, 8000, Some("S1")),
        ];
        assert_eq!(student_tabungan_balance(&log, "S1"), -3000);
    }

    #[test]
    fn test_period_collection_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        let mut on_boundary = tx("TRX-1", TxKind::Kas, 100, None);
        on_boundary.date = now - Duration::days(7); // exactly on the lower bound
        let mut too_old = tx("TRX-2", TxKind::Kas, 200, None);
        too_old.date = now - Duration::days(8);
        let mut future = tx("TRX-3", TxKind::Tabungan, 400, Some("S1"));
        future.date = now + Duration::hours(1); // backdated forward past "now"
        let mut outflow = tx("TRX-4", TxKind::OutKas, 800, None);
        outflow.date = now;

        let log = vec![on_boundary, too_old, future, outflow];
        assert_eq!(period_collection(&log, now, 7), 100);
    }

    #[test]
    fn test_tabungan_summary_sorted_descending() {
        let students = vec![
            Student::new("S1", "Andi", "001"),
            Student::new("S2", "Budi", "002"),
            Student::new("S3", "Citra", "003"),
        ];
        let log = vec![
            tx("TRX-1", TxKind::Tabungan, 1000, Some("S1")),
            tx("TRX-2", TxKind::Tabungan, 9000, Some("S3")),
            tx("TRX-3", TxKind::OutTabungan, 500, Some("S2")),
        ];
        let summary = tabungan_summary(&students, &log);
        let balances: Vec<i64> = summary.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![9000, 1000, -500]);
        assert_eq!(summary[0].student.id, "S3");
    }

    #[test]
    fn test_orphaned_transactions_still_count_class_wide() {
        // S9 does not exist in the student list; its transactions still count
        // toward class-wide sums.
        let students = vec![Student::new("S1", "Andi", "001")];
        let log = vec![
            tx("TRX-1", TxKind::Tabungan, 4000, Some("S9")),
            tx("TRX-2", TxKind::Tabungan, 1000, Some("S1")),
        ];
        assert_eq!(tabungan_balance(&log), 5000);
        // But the per-student summary only covers known students.
        let summary = tabungan_summary(&students, &log);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].balance, 1000);
    }

    #[test]
    fn test_month_expenses_filters_by_month() {
        let mut june = tx("TRX-1", TxKind::OutKas, 3000, None);
        june.date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let log = vec![
            tx("TRX-2", TxKind::OutKas, 1500, None), // May
            tx("TRX-3", TxKind::Kas, 9000, None),    // May, wrong kind
            june,
        ];
        let expenses = month_expenses(&log, 2024, 5);
        assert_eq!(expenses.total, 1500);
        assert_eq!(expenses.transactions.len(), 1);
    }
}
