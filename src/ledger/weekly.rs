//! The Friday-bounded weekly payment matrix for the monthly kas report.
//!
//! A "week" here is not an ISO week: the Fridays of the target month define
//! the week columns. Week 0 runs from the 1st through the first Friday; week i
//! covers the days after Friday i−1 through Friday i; and any payment dated
//! after the last Friday folds into the last week, because no further column
//! exists for the trailing days.

use crate::model::{Student, Transaction, TxKind};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// One row of the payment matrix: which week columns a student paid in, and
/// their total kas payments for the month.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatrixRow {
    pub student: Student,
    pub weeks_paid: Vec<bool>,
    pub total_month: u64,
}

/// The day-numbers of every Friday in the given month, ascending. `month` is
/// 1-12. Returns an empty list for an invalid month.
pub fn fridays_in_month(year: i32, month: u32) -> Vec<u32> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| d.weekday() == Weekday::Fri)
        .map(|d| d.day())
        .collect()
}

/// Builds the payment matrix for `(year, month)`: one row per student, sorted
/// by name ascending. The sort is a plain byte-wise comparison, which matches
/// alphabetical order for ASCII names but not for accented ones.
///
/// Multiple payments in the same week keep the week marked paid (boolean OR)
/// while each still adds to the monthly total. Recomputed from scratch on
/// every call; holds no state.
pub fn kas_matrix(
    students: &[Student],
    log: &[Transaction],
    year: i32,
    month: u32,
) -> Vec<MatrixRow> {
    let fridays = fridays_in_month(year, month);

    let mut rows: Vec<MatrixRow> = students
        .iter()
        .map(|student| {
            let mut weeks_paid = vec![false; fridays.len()];
            let mut total_month = 0u64;
            let in_month = log.iter().filter(|t| {
                t.kind == TxKind::Kas
                    && t.student_id.as_deref() == Some(student.id.as_str())
                    && t.date.year() == year
                    && t.date.month() == month
            });
            for t in in_month {
                total_month += t.amount;
                if let Some(i) = week_index(&fridays, t.date.day()) {
                    weeks_paid[i] = true;
                }
            }
            MatrixRow {
                student: student.clone(),
                weeks_paid,
                total_month,
            }
        })
        .collect();

    rows.sort_by(|a, b| a.student.name.cmp(&b.student.name));
    rows
}

/// Finds the week bucket for a day of the month: the first `i` with
/// `day > fridays[i−1] && day <= fridays[i]` (treating `fridays[−1]` as 0),
/// or the last bucket for days past the final Friday. `None` only when there
/// are no Fridays at all.
fn week_index(fridays: &[u32], day: u32) -> Option<usize> {
    let last = fridays.len().checked_sub(1)?;
    for (i, &friday) in fridays.iter().enumerate() {
        let prev = if i > 0 { fridays[i - 1] } else { 0 };
        if day > prev && day <= friday {
            return Some(i);
        }
    }
    // After the last Friday: fold into the final week.
    Some(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn kas_tx(id: &str, student_id: &str, amount: u64, year: i32, month: u32, day: u32) -> Transaction {
        Transaction {
            id: id.to_string(),
            student_id: Some(student_id.to_string()),
            amount,
            kind: TxKind::Kas,
            date: Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_fridays_in_april_2024() {
        // April 2024: Fridays on the 5th, 12th, 19th and 26th.
        assert_eq!(fridays_in_month(2024, 4), vec![5, 12, 19, 26]);
    }

    #[test]
    fn test_fridays_invalid_month_is_empty() {
        assert_eq!(fridays_in_month(2024, 13), Vec::<u32>::new());
    }

    #[test]
    fn test_payment_before_first_friday_is_week_zero() {
        // Fridays {5, 12, 19, 26}; a payment on the 1st lands in week 0.
        assert_eq!(week_index(&[5, 12, 19, 26], 1), Some(0));
        assert_eq!(week_index(&[5, 12, 19, 26], 5), Some(0));
    }

    #[test]
    fn test_payment_after_last_friday_folds_into_last_week() {
        // Fridays {5, 12, 19, 26}; day 30 has no week of its own, so it is
        // credited to week index 3.
        assert_eq!(week_index(&[5, 12, 19, 26], 30), Some(3));
    }

    #[test]
    fn test_interior_boundaries() {
        let fridays = [5, 12, 19, 26];
        assert_eq!(week_index(&fridays, 6), Some(1));
        assert_eq!(week_index(&fridays, 12), Some(1));
        assert_eq!(week_index(&fridays, 13), Some(2));
        assert_eq!(week_index(&fridays, 26), Some(3));
    }

    #[test]
    fn test_no_fridays_does_not_panic() {
        assert_eq!(week_index(&[], 15), None);
    }

    #[test]
    fn test_two_payments_same_week_or_not_double_marked() {
        // Budi pays 5000 twice on day 6 of April 2024 (week index 1). The week
        // is marked once; the monthly total sums both.
        let students = vec![Student::new("S1", "Budi", "001")];
        let log = vec![
            kas_tx("TRX-1", "S1", 5000, 2024, 4, 6),
            kas_tx("TRX-2", "S1", 5000, 2024, 4, 6),
        ];
        let matrix = kas_matrix(&students, &log, 2024, 4);
        assert_eq!(matrix.len(), 1);
        assert_eq!(matrix[0].weeks_paid, vec![false, true, false, false]);
        assert_eq!(matrix[0].total_month, 10000);
    }

    #[test]
    fn test_matrix_is_idempotent() {
        let students = vec![
            Student::new("S1", "Budi", "001"),
            Student::new("S2", "Andi", "002"),
        ];
        let log = vec![
            kas_tx("TRX-1", "S1", 2000, 2024, 4, 3),
            kas_tx("TRX-2", "S2", 2000, 2024, 4, 29),
        ];
        let first = kas_matrix(&students, &log, 2024, 4);
        let second = kas_matrix(&students, &log, 2024, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_matrix_sorted_by_name() {
        let students = vec![
            Student::new("S1", "Citra", "001"),
            Student::new("S2", "Andi", "002"),
            Student::new("S3", "Budi", "003"),
        ];
        let matrix = kas_matrix(&students, &[], 2024, 4);
        let names: Vec<&str> = matrix.iter().map(|r| r.student.name.as_str()).collect();
        assert_eq!(names, vec!["Andi", "Budi", "Citra"]);
    }

    #[test]
    fn test_matrix_ignores_other_months_and_kinds() {
        let students = vec![Student::new("S1", "Budi", "001")];
        let mut tabungan = kas_tx("TRX-1", "S1", 3000, 2024, 4, 6);
        tabungan.kind = TxKind::Tabungan;
        let log = vec![
            tabungan,
            kas_tx("TRX-2", "S1", 1000, 2024, 3, 6), // previous month
        ];
        let matrix = kas_matrix(&students, &log, 2024, 4);
        assert_eq!(matrix[0].total_month, 0);
        assert!(matrix[0].weeks_paid.iter().all(|paid| !paid));
    }
}
