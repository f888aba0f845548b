// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Post-authentication modules
//!
//! A module participates in dispatch through the hooks it declares, not
//! through its type. Listener-style modules (request/response hooks) outlive
//! the dispatch pass and are shut down externally.

pub mod context;
pub mod dispatch;
pub mod login_report;
pub mod registry;
pub mod server;

pub use context::{ModuleContext, ModuleLogger};
pub use dispatch::dispatch;
pub use registry::ModuleRegistry;
pub use server::{ConnectionInfo, ListenerRequest, ModuleServer};

use anyhow::Result;
use async_trait::async_trait;

use crate::protocol::Protocol;
use crate::types::Target;

/// Hooks a module may expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleHook {
    OnLogin,
    OnAdminLogin,
    OnRequest,
    HasResponse,
    OnShutdown,
}

/// Live connection handed to module hooks
pub struct ModuleConnection<'a> {
    pub target: &'a Target,
    pub protocol: &'a mut dyn Protocol,
}

#[async_trait]
pub trait ScanModule: Send + Sync {
    fn name(&self) -> &str;

    /// Hooks this module implements; dispatch only calls these
    fn hooks(&self) -> &[ModuleHook];

    fn exposes(&self, hook: ModuleHook) -> bool {
        self.hooks().contains(&hook)
    }

    /// Request- or response-style module
    fn is_listener(&self) -> bool {
        self.exposes(ModuleHook::OnRequest) || self.exposes(ModuleHook::HasResponse)
    }

    async fn on_login(&self, _ctx: &ModuleContext, _conn: &mut ModuleConnection<'_>) -> Result<()> {
        Ok(())
    }

    async fn on_admin_login(
        &self,
        _ctx: &ModuleContext,
        _conn: &mut ModuleConnection<'_>,
    ) -> Result<()> {
        Ok(())
    }

    /// Inbound traffic correlated back to a target by the module server
    async fn on_request(
        &self,
        _ctx: &ModuleContext,
        _connection: &ConnectionInfo,
        _request: &ListenerRequest,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn on_shutdown(
        &self,
        _ctx: &ModuleContext,
        _conn: &mut ModuleConnection<'_>,
    ) -> Result<()> {
        Ok(())
    }
}
