// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Shared endpoint for listener-style modules
//!
//! Listener modules receive inbound traffic after their dispatch pass has
//! finished. The server keeps a back-reference to the connection that last
//! dispatched a listener so that traffic can be attributed to a target.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ModuleContext, ModuleHook, ScanModule};
use crate::types::{AuthenticatedIdentity, Target};

/// Snapshot of the connection a listener module was dispatched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub protocol: String,
    pub hostname: String,
    pub host: String,
    pub port: u16,
    pub domain: Option<String>,
    pub is_admin: bool,
    pub authenticated_as: Option<AuthenticatedIdentity>,
}

impl ConnectionInfo {
    pub fn from_target(protocol: &str, target: &Target) -> Self {
        Self {
            protocol: protocol.to_string(),
            hostname: target.hostname.clone(),
            host: target.host.clone(),
            port: target.port,
            domain: target.domain.clone(),
            is_admin: target.is_admin,
            authenticated_as: target.authenticated_as.clone(),
        }
    }
}

/// Inbound request delivered to a listener module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerRequest {
    pub peer: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct ModuleServer {
    connection: RwLock<Option<ConnectionInfo>>,
    local_ip: RwLock<Option<String>>,
}

impl ModuleServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, connection: ConnectionInfo, local_ip: Option<String>) {
        debug!("Listener server attached to {}", connection.host);
        *self.connection.write() = Some(connection);
        *self.local_ip.write() = local_ip;
    }

    pub fn connection(&self) -> Option<ConnectionInfo> {
        self.connection.read().clone()
    }

    pub fn local_ip(&self) -> Option<String> {
        self.local_ip.read().clone()
    }

    /// Deliver one inbound request to a listener module.
    ///
    /// Returns `Ok(None)` when no connection is attached or the module does
    /// not take requests.
    pub async fn route(
        &self,
        module: &dyn ScanModule,
        ctx: &ModuleContext,
        request: &ListenerRequest,
    ) -> anyhow::Result<Option<String>> {
        if !module.exposes(ModuleHook::OnRequest) {
            return Ok(None);
        }

        let Some(connection) = self.connection() else {
            ctx.log.fail(&format!("Dropping request from {}: no connection attached", request.peer));
            return Ok(None);
        };

        module.on_request(ctx, &connection, request).await
    }
}
