//! Authentication commands.

use super::{prompt_line, prompt_password, Context};
use crate::output::{self, print_json};
use anyhow::Result;
use serde_json::json;

/// Login with email and password. Replaces any persisted session.
pub async fn login(ctx: &Context) -> Result<()> {
    let email = prompt_line("Email: ")?;
    let password = prompt_password("Password: ")?;

    let identity = ctx.store.login(&email, &password).await?;
    output::print_success(&format!("Logged in as {}", identity.email), ctx.format);
    Ok(())
}

/// Create an account and sign in.
pub async fn register(ctx: &Context) -> Result<()> {
    let email = prompt_line("Email: ")?;
    let password = prompt_password("Password: ")?;
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    let identity = ctx.store.register(&email, &password).await?;
    output::print_success(&format!("Registered and logged in as {}", identity.email), ctx.format);
    Ok(())
}

/// Logout and clear the persisted session.
pub async fn logout(ctx: &Context) -> Result<()> {
    if !ctx.store.has_session() {
        output::print_success("Not logged in", ctx.format);
        return Ok(());
    }

    ctx.store.logout().await;
    output::print_success("Logged out successfully", ctx.format);
    Ok(())
}

/// Show the signed-in user.
pub async fn whoami(ctx: &Context) -> Result<()> {
    ctx.require_session()?;
    let identity = ctx.store.fetch_identity().await?;

    if ctx.format.is_json() {
        print_json(&identity);
    } else {
        output::print_row("User ID", &identity.id.to_string());
        output::print_row("Email", &identity.email);
    }
    Ok(())
}

/// Check authentication status without failing when signed out.
pub async fn status(ctx: &Context) -> Result<()> {
    let identity = match ctx.store.restore().await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!(error = %e, "Persisted session rejected");
            None
        }
    };
    let state = ctx.store.state();

    if ctx.format.is_json() {
        print_json(&json!({
            "api_url": ctx.client().base_url(),
            "log_level": ctx.config.log_level,
            "state": state,
            "logged_in": identity.is_some(),
            "user": identity,
        }));
        return Ok(());
    }

    output::print_row("API", ctx.client().base_url());
    output::print_row("Config", &ctx.paths.config_file().display().to_string());
    output::print_row("Log level", &ctx.config.log_level);
    match identity {
        Some(identity) => {
            output::print_row("Auth", "logged in");
            output::print_row("Email", &identity.email);
        }
        None => output::print_row("Auth", "not logged in"),
    }
    Ok(())
}
