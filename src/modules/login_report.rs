// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::Result;
use async_trait::async_trait;

use super::{ModuleConnection, ModuleContext, ModuleHook, ScanModule};

/// Reports who we authenticated as and whether that grants admin access
#[derive(Debug, Default)]
pub struct LoginReport;

impl LoginReport {
    pub const NAME: &'static str = "login_report";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScanModule for LoginReport {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hooks(&self) -> &[ModuleHook] {
        &[ModuleHook::OnLogin, ModuleHook::OnAdminLogin]
    }

    async fn on_login(&self, ctx: &ModuleContext, conn: &mut ModuleConnection<'_>) -> Result<()> {
        let target = conn.target;
        match &target.authenticated_as {
            Some(identity) => {
                let principal = match &identity.domain {
                    Some(domain) => format!("{}\\{}", domain, identity.principal),
                    None => identity.principal.clone(),
                };
                ctx.log.success(&format!(
                    "{} authenticated as {} ({})",
                    conn.protocol.name(),
                    principal,
                    identity.kind
                ));
            }
            None => ctx.log.highlight(&format!("{} null session", conn.protocol.name())),
        }

        if let Some(domain) = &target.domain {
            ctx.log.info(&format!("Domain: {}", domain));
        }

        Ok(())
    }

    async fn on_admin_login(&self, ctx: &ModuleContext, conn: &mut ModuleConnection<'_>) -> Result<()> {
        ctx.log.highlight(&format!("Administrative access on {}", conn.target.host));
        Ok(())
    }
}
