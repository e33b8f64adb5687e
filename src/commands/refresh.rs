use crate::api::Mode;
use crate::commands::{require_session, Out};
use crate::{App, Config, Result};

/// Fetches the latest snapshot from the remote store into the local cache.
///
/// A fetch failure is not an error at this level: the cache keeps serving the
/// last-known state and the message says so.
pub async fn refresh(config: Config, mode: Mode) -> Result<Out<()>> {
    let mut app = App::open(config, mode).await?;
    require_session(&app)?;
    let applied = app.refresh().await?;
    if applied {
        let message = format!(
            "Refreshed from the remote store: {} students, {} transactions",
            app.store().students().len(),
            app.store().transactions().len()
        );
        Ok(message.into())
    } else {
        let notice = app.offline_notice().unwrap_or_default();
        Ok(format!("The remote store could not be reached. {notice}").into())
    }
}
