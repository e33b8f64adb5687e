//! The ledger computations: balance aggregation and the Friday-bounded weekly
//! payment matrix.
//!
//! Everything in this module is a pure function of the transaction log (and an
//! explicit `now` where wall-clock time matters). Nothing here caches,
//! mutates, or performs I/O; callers recompute on every read.
mod balance;
mod weekly;

pub use balance::{
    class_stats, kas_balance, month_expenses, period_collection, student_tabungan_balance,
    tabungan_balance, tabungan_summary, ClassStats, MonthExpenses, StudentBalance,
};
pub use weekly::{fridays_in_month, kas_matrix, MatrixRow};
