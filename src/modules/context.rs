// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Span};

use crate::config::RunConfig;
use crate::database::CredentialStore;

/// Logger bound to one module running against one host
#[derive(Debug, Clone)]
pub struct ModuleLogger {
    span: Span,
    module: String,
}

impl ModuleLogger {
    pub fn new(module: &str, host: &str, port: u16, hostname: &str) -> Self {
        let module = module.to_uppercase();
        let span = info_span!("module", module = %module, host = %host, port, hostname = %hostname);
        Self { span, module }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn info(&self, message: &str) {
        self.span.in_scope(|| info!("{}", message));
    }

    pub fn success(&self, message: &str) {
        self.span.in_scope(|| info!("[+] {}", message));
    }

    pub fn highlight(&self, message: &str) {
        self.span.in_scope(|| info!("[*] {}", message));
    }

    pub fn fail(&self, message: &str) {
        self.span.in_scope(|| warn!("[-] {}", message));
    }

    pub fn error(&self, message: &str) {
        self.span.in_scope(|| error!("{}", message));
    }

    pub fn debug(&self, message: &str) {
        self.span.in_scope(|| debug!("{}", message));
    }
}

/// Everything a module hook may reach besides the connection itself
#[derive(Clone)]
pub struct ModuleContext {
    pub store: Arc<dyn CredentialStore>,
    pub log: ModuleLogger,
    pub config: Arc<RunConfig>,
    pub local_ip: Option<String>,
}

impl ModuleContext {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        log: ModuleLogger,
        config: Arc<RunConfig>,
        local_ip: Option<String>,
    ) -> Self {
        Self {
            store,
            log,
            config,
            local_ip,
        }
    }

    /// Options configured for this module, if any
    pub fn options(&self) -> Option<&HashMap<String, String>> {
        self.config
            .module_options
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(self.log.module()))
            .map(|(_, options)| options)
    }
}
