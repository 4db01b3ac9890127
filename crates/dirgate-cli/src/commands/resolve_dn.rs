//! resolve-dn command - look up the DN of a directory entry

use super::CommandContext;
use crate::output::Report;
use anyhow::Result;
use dirgate_core::UPN_ATTRIBUTE;

/// Bind as `bind_user`, then find the entry whose `attribute` is `value`
///
/// For `userPrincipalName`, a bare username is completed with the domain.
pub async fn execute(
    ctx: &CommandContext,
    bind_user: &str,
    bind_password: &str,
    attribute: &str,
    value: &str,
) -> Result<()> {
    let config = ctx.client.config();
    let principal = config.upn(bind_user)?;
    let value = if attribute.eq_ignore_ascii_case(UPN_ATTRIBUTE) {
        config.upn(value)?.to_string()
    } else {
        value.to_string()
    };

    let mut conn = ctx.client.connect().await?;
    let result = match conn.bind(&principal, bind_password).await.into_result() {
        Ok(()) => conn.resolve_dn(attribute, &value).await,
        Err(e) => Err(e),
    };
    conn.close().await;

    let dn = result?;
    ctx.report(
        &Report::new("resolve-dn", dn.to_string())
            .detail("attribute", attribute)
            .detail("value", value)
            .detail("dn", dn),
    );
    Ok(())
}
