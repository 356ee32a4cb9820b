//! Account commands driven through the session service.

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::session::{AuthState, IdentityToolkitProvider, SessionService};

fn session_for(settings: &Settings) -> anyhow::Result<SessionService> {
    if settings.identity.api_key.is_none() {
        anyhow::bail!("IDENTITY_API_KEY not set; cannot reach the identity provider");
    }
    let provider = IdentityToolkitProvider::new(settings.identity.clone())?;
    let session = SessionService::new(Arc::new(provider));
    session.subscribe(|state| match state {
        AuthState::SignedIn(user) => tracing::info!("Session: signed in as {}", user.uid),
        AuthState::SignedOut => tracing::info!("Session: signed out"),
    });
    Ok(session)
}

pub async fn cmd_sign_up(
    settings: &Settings,
    email: &str,
    password: &str,
    display_name: Option<&str>,
) -> anyhow::Result<()> {
    let session = session_for(settings)?;
    let user = session.sign_up(email, password, display_name).await?;
    println!(
        "{} Created account {} ({})",
        style("✓").green(),
        user.email,
        user.uid
    );
    session.sign_out().await?;
    Ok(())
}

pub async fn cmd_sign_in(settings: &Settings, email: &str, password: &str) -> anyhow::Result<()> {
    let session = session_for(settings)?;
    let user = session.sign_in(email, password).await?;
    println!(
        "{} Signed in as {}{}",
        style("✓").green(),
        user.email,
        user.display_name
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default()
    );
    println!("  {} Account id: {}", style("→").dim(), user.uid);
    session.sign_out().await?;
    Ok(())
}

pub async fn cmd_reset_password(settings: &Settings, email: &str) -> anyhow::Result<()> {
    let session = session_for(settings)?;
    session.send_password_reset(email).await?;
    println!("{} Password reset email sent to {}", style("✓").green(), email);
    Ok(())
}
