use crate::api::Mode;
use crate::commands::{require_session, with_offline_notice, Out};
use crate::model::{format_rupiah, Transaction};
use crate::store::NewTransaction;
use crate::{App, Config, Result};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Lists the transaction log, newest first. Refreshes first; renders from the
/// local cache either way.
pub async fn tx_list(config: Config, mode: Mode) -> Result<Out<Vec<Transaction>>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.refresh().await?;

    let store = app.store();
    let transactions = store.transactions().to_vec();
    if transactions.is_empty() {
        return Ok(Out::new(
            with_offline_notice(&app, "No transactions recorded yet".to_string()),
            transactions,
        ));
    }

    let mut message = String::new();
    for t in &transactions {
        let who = t
            .student_id
            .as_deref()
            .map(|id| {
                store
                    .student_by_id(id)
                    .map_or_else(|| format!("({id})"), |s| s.name.clone())
            })
            .unwrap_or_else(|| "(class)".to_string());
        writeln!(
            message,
            "{}  {}  {:<12}  {:>12}  {}  {}",
            t.id,
            t.date.format("%Y-%m-%d"),
            t.kind,
            format_rupiah(t.amount as i64),
            who,
            t.notes.as_deref().unwrap_or("")
        )?;
    }
    Ok(Out::new(with_offline_notice(&app, message), transactions))
}

/// Records a transaction locally and pushes the write intent.
pub async fn tx_add(
    config: Config,
    mode: Mode,
    new: NewTransaction,
    now: DateTime<Utc>,
) -> Result<Out<Transaction>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    let transaction = app.add_transaction(new, now).await?;
    let message = format!(
        "Recorded {} of {} as {}",
        transaction.kind,
        format_rupiah(transaction.amount as i64),
        transaction.id
    );
    Ok(Out::new(
        with_offline_notice(&app, message),
        transaction,
    ))
}

/// Deletes a transaction by id and pushes the write intent.
pub async fn tx_delete(config: Config, mode: Mode, id: &str) -> Result<Out<()>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.delete_transaction(id).await?;
    Ok(with_offline_notice(&app, format!("Deleted transaction '{id}'")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TxKind;
    use crate::test::TestEnv;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_tx_add_then_list_then_delete() {
        let env = TestEnv::new().await;
        let mut app = env.app().await;
        app.login("admin", "admin123").await.unwrap();

        let new = NewTransaction {
            student_id: None,
            amount: 7500,
            kind: TxKind::Kas,
            date: now(),
            notes: Some("Sisa fotokopi".to_string()),
        };
        let out = tx_add(env.config(), Mode::Test, new, now()).await.unwrap();
        let tx = out.structure().unwrap().clone();
        assert!(out.message().contains("Rp7,500"));

        let out = tx_list(env.config(), Mode::Test).await.unwrap();
        assert!(out.structure().unwrap().iter().any(|t| t.id == tx.id));

        tx_delete(env.config(), Mode::Test, &tx.id).await.unwrap();
        let out = tx_list(env.config(), Mode::Test).await.unwrap();
        assert!(!out.structure().unwrap().iter().any(|t| t.id == tx.id));
    }

    #[tokio::test]
    async fn test_tx_add_requires_session() {
        let env = TestEnv::new().await;
        let new = NewTransaction {
            student_id: None,
            amount: 1000,
            kind: TxKind::Kas,
            date: now(),
            notes: None,
        };
        assert!(tx_add(env.config(), Mode::Test, new, now()).await.is_err());
    }
}
