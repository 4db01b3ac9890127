//! verify command - check a user's credentials

use super::CommandContext;
use crate::output::Report;
use anyhow::Result;

pub async fn execute(ctx: &CommandContext, username: &str, password: &str) -> Result<()> {
    let principal = ctx.client.config().upn(username)?;

    ctx.client
        .authenticate(username, password)
        .await?
        .into_result()?;

    ctx.report(&Report::new("verify", "Credentials accepted").detail("principal", principal));
    Ok(())
}
