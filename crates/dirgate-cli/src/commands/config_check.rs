//! config-check command - validate settings, optionally try a connection

use super::CommandContext;
use crate::output::Report;
use anyhow::Result;

pub async fn execute(ctx: &CommandContext, connect: bool) -> Result<()> {
    let config = ctx.client.config();

    let trust = match &config.trust_roots {
        _ if !config.security.verifies_certificates() => "not verified".to_string(),
        Some(roots) => format!("{} configured CA certificate(s)", roots.len()),
        None => "system roots".to_string(),
    };
    let search_base = config
        .search_base()
        .unwrap_or_else(|_| "unset".to_string());
    let domain = config.domain.clone().unwrap_or_else(|| "unset".to_string());

    let mut report = Report::new("config-check", "Configuration is valid")
        .detail("server", &config.server)
        .detail("port", config.port)
        .detail("security", config.security)
        .detail("certificates", trust)
        .detail("domain", domain)
        .detail("search_base", search_base)
        .detail("timeout", format!("{}s", config.timeout.as_secs()));

    if connect {
        let conn = ctx.client.connect().await?;
        conn.close().await;
        report = report.detail("connection", "ok");
    }

    ctx.report(&report);
    Ok(())
}
