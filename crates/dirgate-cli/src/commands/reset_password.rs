//! reset-password command - administrative password reset

use super::CommandContext;
use crate::output::Report;
use anyhow::Result;

pub async fn execute(
    ctx: &CommandContext,
    admin: &str,
    admin_password: &str,
    target: &str,
    new_password: &str,
) -> Result<()> {
    let config = ctx.client.config();
    let admin_principal = config.upn(admin)?;
    let target_principal = config.upn(target)?;

    ctx.client
        .admin_reset(admin, admin_password, target, new_password)
        .await?;

    ctx.report(
        &Report::new("reset-password", "Password reset")
            .detail("principal", target_principal)
            .detail("admin", admin_principal),
    );
    Ok(())
}
