//! Account settings.

use super::{prompt_line, prompt_password, Context};
use crate::output;
use anyhow::Result;

/// Change the account email. Requires the current password.
pub async fn account_email(ctx: &Context, new_email: Option<String>) -> Result<()> {
    ctx.require_session()?;

    let new_email = match new_email {
        Some(email) => email,
        None => prompt_line("New email: ")?,
    };
    let current_password = prompt_password("Current password: ")?;

    let identity = ctx.store.change_email(&current_password, &new_email).await?;
    output::print_success(&format!("Email changed to {}", identity.email), ctx.format);
    Ok(())
}

/// Change the account password.
pub async fn account_password(ctx: &Context) -> Result<()> {
    ctx.require_session()?;

    let current_password = prompt_password("Current password: ")?;
    let new_password = prompt_password("New password: ")?;
    let confirm = prompt_password("Confirm new password: ")?;
    if new_password != confirm {
        anyhow::bail!("Passwords do not match");
    }

    ctx.store
        .change_password(&current_password, &new_password)
        .await?;
    output::print_success("Password changed", ctx.format);
    Ok(())
}
