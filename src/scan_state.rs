// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! State shared by every target run in one scan
//!
//! Owned explicitly and handed to each [`crate::connection::Connection`]
//! behind an `Arc`; there are no process globals.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::FailLimitConfig;
use crate::database::{CredentialStore, InMemoryCredentialStore};
use crate::fail_limit::{FailCounters, FailLimitBreaker};
use crate::modules::ModuleServer;

pub struct SharedScanState {
    /// Admits exactly one login attempt at a time across all targets
    auth_gate: Mutex<()>,
    fail_counters: Arc<FailCounters>,
    module_server: Arc<ModuleServer>,
    store: Arc<dyn CredentialStore>,
}

impl SharedScanState {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            auth_gate: Mutex::new(()),
            fail_counters: Arc::new(FailCounters::new()),
            module_server: Arc::new(ModuleServer::new()),
            store,
        }
    }

    /// Wait for the global authentication gate
    pub async fn auth_gate(&self) -> MutexGuard<'_, ()> {
        self.auth_gate.lock().await
    }

    pub fn fail_counters(&self) -> &Arc<FailCounters> {
        &self.fail_counters
    }

    pub fn breaker(&self, limits: FailLimitConfig) -> FailLimitBreaker {
        FailLimitBreaker::new(limits, Arc::clone(&self.fail_counters))
    }

    pub fn module_server(&self) -> &Arc<ModuleServer> {
        &self.module_server
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }
}

impl Default for SharedScanState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCredentialStore::new()))
    }
}
