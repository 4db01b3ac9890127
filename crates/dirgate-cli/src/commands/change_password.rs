//! change-password command - self-service password change

use super::CommandContext;
use crate::output::Report;
use anyhow::Result;

pub async fn execute(
    ctx: &CommandContext,
    username: &str,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    let principal = ctx.client.config().upn(username)?;

    ctx.client
        .change_password(username, old_password, new_password)
        .await?;

    ctx.report(&Report::new("change-password", "Password changed").detail("principal", principal));
    Ok(())
}
