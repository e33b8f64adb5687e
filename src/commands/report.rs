use crate::api::Mode;
use crate::args::ReportKind;
use crate::commands::{require_session, with_offline_notice, Out};
use crate::ledger::{
    fridays_in_month, kas_balance, kas_matrix, month_expenses, tabungan_summary,
};
use crate::model::format_rupiah;
use crate::{App, Config, Result};
use anyhow::ensure;
use serde_json::{json, Value};
use std::fmt::Write;

/// Shows the monthly report. For kas: the Friday-bounded payment matrix, the
/// month's expenses and the current balance. For tabungan: the per-student
/// savings ranking. Refreshes first; renders from the local cache either way.
pub async fn report(
    config: Config,
    mode: Mode,
    kind: ReportKind,
    year: i32,
    month: u32,
) -> Result<Out<Value>> {
    ensure!((1..=12).contains(&month), "Invalid month: {month}");
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.refresh().await?;

    let out = match kind {
        ReportKind::Kas => kas_report(&app, year, month)?,
        ReportKind::Tabungan => tabungan_report(&app)?,
    };
    Ok(out)
}

fn kas_report(app: &App, year: i32, month: u32) -> Result<Out<Value>> {
    let store = app.store();
    let fridays = fridays_in_month(year, month);
    let rows = kas_matrix(store.students(), store.transactions(), year, month);
    let expenses = month_expenses(store.transactions(), year, month);
    let balance = kas_balance(store.settings().initial_kas_balance, store.transactions());

    let mut message = String::new();
    writeln!(message, "Kas report for {year}-{month:02}")?;
    writeln!(message)?;

    if fridays.is_empty() {
        // A month with no Fridays cannot happen on the calendar, but the
        // matrix renders fine without columns either way.
        writeln!(message, "No collection weeks in this month")?;
    } else {
        let mut header = format!("{:<24}", "Student");
        for i in 1..=fridays.len() {
            header.push_str(&format!("  W{i}"));
        }
        header.push_str(&format!("  {:>12}", "Total"));
        writeln!(message, "{header}")?;
        for row in &rows {
            let mut line = format!("{:<24}", row.student.name);
            for &paid in &row.weeks_paid {
                line.push_str(if paid { "  ✓ " } else { "  - " });
            }
            line.push_str(&format!("  {:>12}", format_rupiah(row.total_month as i64)));
            writeln!(message, "{line}")?;
        }
    }

    writeln!(message)?;
    if expenses.transactions.is_empty() {
        writeln!(message, "No expenses this month")?;
    } else {
        writeln!(message, "Expenses:")?;
        for t in &expenses.transactions {
            writeln!(
                message,
                "  {}  {:>12}  {}",
                t.date.format("%Y-%m-%d"),
                format_rupiah(t.amount as i64),
                t.notes.as_deref().unwrap_or("")
            )?;
        }
        writeln!(
            message,
            "  Total: {}",
            format_rupiah(expenses.total as i64)
        )?;
    }
    writeln!(message)?;
    writeln!(message, "Current kas balance: {}", format_rupiah(balance))?;

    let structure = json!({
        "fridays": fridays,
        "rows": rows,
        "expenses": expenses,
        "balance": balance,
    });
    Ok(Out::new(with_offline_notice(app, message), structure))
}

fn tabungan_report(app: &App) -> Result<Out<Value>> {
    let store = app.store();
    let rows = tabungan_summary(store.students(), store.transactions());

    let mut message = String::new();
    writeln!(message, "Tabungan balances")?;
    writeln!(message)?;
    for row in &rows {
        writeln!(
            message,
            "{:<24}  {:>12}",
            row.student.name,
            format_rupiah(row.balance)
        )?;
    }
    let total: i64 = rows.iter().map(|r| r.balance).sum();
    writeln!(message, "{:<24}  {:>12}", "Total", format_rupiah(total))?;

    let structure = serde_json::to_value(&rows)?;
    Ok(Out::new(with_offline_notice(app, message), structure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_kas_report_from_seed() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        // Seed payments land on 2024-05-03, the first Friday of May 2024.
        let out = report(env.config(), Mode::Test, ReportKind::Kas, 2024, 5)
            .await
            .unwrap();
        let structure = out.structure().unwrap();
        assert_eq!(structure["fridays"], json!([3, 10, 17, 24, 31]));
        let andi = &structure["rows"][0];
        assert_eq!(andi["student"]["name"], "Andi Saputra");
        assert_eq!(andi["weeks_paid"][0], json!(true));
        assert_eq!(andi["weeks_paid"][1], json!(false));
        assert_eq!(structure["expenses"]["total"], json!(15000));
        assert_eq!(structure["balance"], json!(95000));
    }

    #[tokio::test]
    async fn test_tabungan_report_from_seed() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let out = report(env.config(), Mode::Test, ReportKind::Tabungan, 2024, 5)
            .await
            .unwrap();
        let rows = out.structure().unwrap();
        // Citra has the only savings deposit, so she ranks first.
        assert_eq!(rows[0]["student"]["name"], "Citra Lestari");
        assert_eq!(rows[0]["balance"], json!(20000));
    }

    #[tokio::test]
    async fn test_invalid_month_rejected() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let result = report(env.config(), Mode::Test, ReportKind::Kas, 2024, 13).await;
        assert!(result.is_err());
    }
}
