use crate::api::Mode;
use crate::commands::{require_session, with_offline_notice, Out};
use crate::ledger::{class_stats, ClassStats};
use crate::model::format_rupiah;
use crate::{App, Config, Result};
use chrono::Utc;
use std::fmt::Write;

/// How many log entries the dashboard shows as recent activity.
const RECENT_ACTIVITY: usize = 5;

/// Shows the class stats: balances, student count, the last week's collection
/// and the most recent log entries. Refreshes first; renders from the local
/// cache either way.
pub async fn dashboard(config: Config, mode: Mode) -> Result<Out<ClassStats>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.refresh().await?;

    let store = app.store();
    let stats = class_stats(
        store.students(),
        store.transactions(),
        store.settings(),
        Utc::now(),
    );

    let mut message = String::new();
    writeln!(message, "{}", store.settings().login_title)?;
    writeln!(message)?;
    writeln!(message, "Kas balance:      {}", format_rupiah(stats.total_kas))?;
    writeln!(
        message,
        "Tabungan balance: {}",
        format_rupiah(stats.total_tabungan)
    )?;
    writeln!(message, "Students:         {}", stats.total_students)?;
    writeln!(
        message,
        "Collected (7d):   {}",
        format_rupiah(stats.week_collection as i64)
    )?;

    if !store.transactions().is_empty() {
        writeln!(message)?;
        writeln!(message, "Recent activity:")?;
        for t in store.transactions().iter().take(RECENT_ACTIVITY) {
            let who = t
                .student_id
                .as_deref()
                .and_then(|id| store.student_by_id(id))
                .map_or("(class)", |s| s.name.as_str());
            writeln!(
                message,
                "  {}  {:<12}  {:>12}  {}",
                t.date.format("%Y-%m-%d"),
                t.kind,
                format_rupiah(t.amount as i64),
                who
            )?;
        }
    }

    Ok(Out::new(with_offline_notice(&app, message), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_dashboard_stats_from_seed() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let out = dashboard(env.config(), Mode::Test).await.unwrap();
        let stats = out.structure().unwrap();
        // Seed: initial 100_000 + 2x5_000 KAS - 15_000 OUT_KAS.
        assert_eq!(stats.total_kas, 95000);
        assert_eq!(stats.total_tabungan, 20000);
        assert_eq!(stats.total_students, 3);
        assert!(out.message().contains("Rp95,000"));
    }
}
