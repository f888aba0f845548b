// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::Result;
use std::sync::Arc;

use super::{ConnectionInfo, ModuleConnection, ModuleContext, ModuleHook, ModuleLogger, ScanModule};
use crate::config::RunConfig;
use crate::protocol::Protocol;
use crate::scan_state::SharedScanState;
use crate::types::Target;

/// Run every loaded module against an authenticated connection.
///
/// Per module: `on_login`, then `on_admin_login` when the target is admin,
/// then `on_shutdown` unless the module is a listener. A failing hook ends
/// that module's pass; the next module still runs.
pub async fn dispatch(
    modules: &[Arc<dyn ScanModule>],
    target: &Target,
    protocol: &mut dyn Protocol,
    config: &Arc<RunConfig>,
    state: &SharedScanState,
) {
    for module in modules {
        let log = ModuleLogger::new(module.name(), &target.host, target.port, &target.hostname);
        log.debug(&format!("Loading module {}", module.name()));
        let ctx = ModuleContext::new(
            Arc::clone(state.store()),
            log,
            Arc::clone(config),
            target.local_ip.clone(),
        );

        if module.is_listener() {
            state.module_server().attach(
                ConnectionInfo::from_target(protocol.name(), target),
                target.local_ip.clone(),
            );
        }

        let mut conn = ModuleConnection {
            target,
            protocol: &mut *protocol,
        };

        if let Err(e) = run_hooks(module.as_ref(), &ctx, &mut conn).await {
            ctx.log.error(&format!("Error while loading module {}: {:#}", module.name(), e));
        }
    }
}

async fn run_hooks(
    module: &dyn ScanModule,
    ctx: &ModuleContext,
    conn: &mut ModuleConnection<'_>,
) -> Result<()> {
    if module.exposes(ModuleHook::OnLogin) {
        module.on_login(ctx, conn).await?;
    }

    if conn.target.is_admin && module.exposes(ModuleHook::OnAdminLogin) {
        module.on_admin_login(ctx, conn).await?;
    }

    if !module.is_listener() && module.exposes(ModuleHook::OnShutdown) {
        module.on_shutdown(ctx, conn).await?;
    }

    Ok(())
}
