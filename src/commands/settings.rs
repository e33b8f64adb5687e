use crate::api::Mode;
use crate::commands::{require_session, with_offline_notice, Out};
use crate::model::{format_rupiah, AppSettings};
use crate::{App, Config, Result};
use std::fmt::Write;

/// Shows the current settings. Refreshes first; renders from the local cache
/// either way.
pub async fn settings_show(config: Config, mode: Mode) -> Result<Out<AppSettings>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.refresh().await?;

    let settings = app.store().settings().clone();
    let mut message = String::new();
    writeln!(message, "Login title:         {}", settings.login_title)?;
    writeln!(message, "Login description:   {}", settings.login_description)?;
    writeln!(
        message,
        "Initial kas balance: {}",
        format_rupiah(settings.initial_kas_balance)
    )?;
    Ok(Out::new(with_offline_notice(&app, message), settings))
}

/// Replaces the settings and pushes the write intent.
pub async fn settings_update(
    config: Config,
    mode: Mode,
    settings: AppSettings,
) -> Result<Out<AppSettings>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    app.update_settings(settings.clone()).await?;
    Ok(Out::new(
        with_offline_notice(&app, "Settings updated".to_string()),
        settings,
    ))
}
