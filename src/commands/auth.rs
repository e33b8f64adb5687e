use crate::api::Mode;
use crate::commands::Out;
use crate::model::User;
use crate::{App, Config, Result};

/// Checks the credentials and stores the session in the cache. The session is
/// kept until `ekas logout`; no token or expiry is involved.
pub async fn login(
    config: Config,
    mode: Mode,
    username: &str,
    password: &str,
) -> Result<Out<User>> {
    let mut app = App::open(config, mode).await?;
    let user = app.login(username, password).await?;
    Ok(Out::new(
        format!("Logged in as '{}' ({})", user.username, user.role),
        user,
    ))
}

/// Clears the stored session.
pub async fn logout(config: Config, mode: Mode) -> Result<Out<()>> {
    let mut app = App::open(config, mode).await?;
    app.logout().await?;
    Ok("Logged out".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_login_then_logout() {
        let env = TestEnv::new().await;

        let result = login(env.config(), Mode::Test, "admin", "nope").await;
        assert!(result.is_err());

        let out = login(env.config(), Mode::Test, "admin", "admin123")
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().username, "admin");

        logout(env.config(), Mode::Test).await.unwrap();
        let app = env.app().await;
        assert!(app.store().user().is_none());
    }
}
