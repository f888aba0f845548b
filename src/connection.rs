// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Connection Lifecycle
 * Drives one target through resolution, session setup, authentication and
 * post-authentication work
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::bruteforce::BruteForceEngine;
use crate::config::RunConfig;
use crate::credentials::build_catalog;
use crate::errors::SweepError;
use crate::modules::{dispatch, ScanModule};
use crate::protocol::Protocol;
use crate::resolver::{DnsResolver, HostResolver, LiteralResolver};
use crate::scan_state::SharedScanState;
use crate::types::Target;

/// Lifecycle states, in the only order a run may visit them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Init,
    Resolved,
    ConnCreated,
    HostEnumerated,
    HostPrinted,
    Authenticated,
    Dispatched,
    Done,
}

/// Where a run got to and what it achieved
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Last state reached; anything short of `Done` means a guard halted the run
    pub state: LifecycleState,
    pub authenticated: bool,
    pub is_admin: bool,
    /// Login calls made by the authentication phase
    pub attempts: usize,
    pub target: Target,
}

impl RunReport {
    pub fn completed(&self) -> bool {
        self.state == LifecycleState::Done
    }
}

/// Outcome of an admin-guarded operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Privileged<T> {
    Granted(T),
    Unauthorized,
}

impl<T> Privileged<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Privileged::Granted(_))
    }
}

/// Await `op` only when the target's privilege flag is set; otherwise it is
/// dropped unpolled.
pub async fn requires_admin<Fut, T>(target: &Target, op: Fut) -> Privileged<T>
where
    Fut: Future<Output = T>,
{
    if !target.is_admin {
        return Privileged::Unauthorized;
    }
    Privileged::Granted(op.await)
}

/// One target run.
///
/// Constructed by the scheduler and consumed by [`Connection::run`].
pub struct Connection {
    target: Target,
    protocol: Box<dyn Protocol>,
    config: Arc<RunConfig>,
    state: Arc<SharedScanState>,
    resolver: Arc<dyn HostResolver>,
    modules: Vec<Arc<dyn ScanModule>>,
    attempts: usize,
    authenticated: bool,
}

impl Connection {
    pub fn new(
        hostname: impl Into<String>,
        protocol: Box<dyn Protocol>,
        config: Arc<RunConfig>,
        state: Arc<SharedScanState>,
    ) -> Self {
        let port = config.port.unwrap_or_else(|| protocol.default_port());
        let resolver: Arc<dyn HostResolver> = match DnsResolver::from_system_conf() {
            Ok(resolver) => Arc::new(resolver),
            Err(e) => {
                debug!("System DNS configuration unavailable, resolving literals only: {}", e);
                Arc::new(LiteralResolver)
            }
        };

        Self {
            target: Target::new(hostname, port),
            protocol,
            config,
            state,
            resolver,
            modules: Vec::new(),
            attempts: 0,
            authenticated: false,
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Modules dispatched after authentication when module mode is on
    pub fn with_modules(mut self, modules: Vec<Arc<dyn ScanModule>>) -> Self {
        self.modules = modules;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Drive the lifecycle to completion or to the first failing guard.
    pub async fn run(mut self) -> RunReport {
        let span = info_span!(
            "target",
            protocol = %self.protocol.name(),
            hostname = %self.target.hostname,
            port = self.target.port
        );

        let state = self.drive().instrument(span).await;

        RunReport {
            state,
            authenticated: self.authenticated,
            is_admin: self.target.is_admin,
            attempts: self.attempts,
            target: self.target,
        }
    }

    async fn drive(&mut self) -> LifecycleState {
        if !self.resolve().await {
            return LifecycleState::Init;
        }

        self.jitter().await;

        match self.protocol.create_connection(&mut self.target).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Could not create connection to {}", self.target.host);
                return LifecycleState::Resolved;
            }
            Err(e) => {
                debug!("Error creating connection to {}: {:#}", self.target.host, e);
                return LifecycleState::Resolved;
            }
        }

        if let Err(e) = self.protocol.enumerate_host_info(&mut self.target).await {
            error!("Host enumeration failed on {}: {:#}", self.target.host, e);
            return LifecycleState::ConnCreated;
        }
        self.target.local_ip = self.protocol.local_address();

        match self.protocol.print_host_info(&self.target).await {
            Ok(true) => {}
            Ok(false) => return LifecycleState::HostEnumerated,
            Err(e) => {
                error!("Failed to report host info for {}: {:#}", self.target.host, e);
                return LifecycleState::HostEnumerated;
            }
        }

        if !self.authenticate().await {
            return LifecycleState::HostPrinted;
        }

        self.target.is_admin = match self.protocol.check_if_admin(&self.target).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                debug!("Admin check failed on {}: {:#}", self.target.host, e);
                false
            }
        };

        if self.config.module_mode() {
            dispatch(
                &self.modules,
                &self.target,
                self.protocol.as_mut(),
                &self.config,
                &self.state,
            )
            .await;
        } else {
            self.run_actions().await;
        }

        LifecycleState::Done
    }

    async fn resolve(&mut self) -> bool {
        match self.resolver.resolve(&self.target.hostname).await {
            Ok(resolved) => {
                self.target.host = resolved.display_name();
            }
            Err(e) => {
                debug!("Error resolving hostname {}: {}", self.target.hostname, e);
                return false;
            }
        }

        if self.config.kerberos.enabled {
            self.target.host = self.target.hostname.clone();
        }

        true
    }

    async fn jitter(&self) {
        let Some(range) = self.config.jitter else {
            return;
        };

        let seconds = if range.min < range.max {
            rand::rng().random_range(range.min..range.max)
        } else {
            range.min
        };

        debug!("Jitter: sleeping {} second(s)", seconds);
        tokio::time::sleep(Duration::from_secs(seconds)).await;
    }

    /// Brute-force phase, or a null session when nothing was attempted.
    async fn authenticate(&mut self) -> bool {
        let default_domain = self
            .config
            .credentials
            .domain
            .clone()
            .or_else(|| self.target.domain.clone());

        let mut catalog = match build_catalog(
            &self.config.credentials,
            self.state.store().as_ref(),
            default_domain.as_deref(),
        )
        .await
        {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("{}", e);
                return false;
            }
        };

        let engine = BruteForceEngine::from_config(&self.state, &self.config);
        let outcome = engine
            .run(&mut catalog, &mut self.target, self.protocol.as_mut())
            .await;
        self.attempts = outcome.attempts;
        self.authenticated = outcome.authenticated();
        if !self.authenticated && self.target.is_null_session() {
            debug!("No credentials attempted on {}, continuing as null session", self.target.host);
            return true;
        }

        self.authenticated
    }

    /// Run directly-requested actions in configuration order.
    async fn run_actions(&mut self) {
        let actions: Vec<(String, serde_json::Value)> = self
            .config
            .actions
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for (name, value) in actions {
            if value.is_null() || value == serde_json::Value::Bool(false) {
                continue;
            }

            let Some(spec) = self
                .protocol
                .supported_actions()
                .iter()
                .find(|spec| spec.name == name)
                .copied()
            else {
                debug!("{} does not support action {}", self.protocol.name(), name);
                continue;
            };

            debug!("Calling {}()", name);

            let protocol = self.protocol.as_mut();
            let target = &self.target;

            let result = if spec.requires_admin {
                match requires_admin(target, protocol.run_action(&name, &value, target)).await {
                    Privileged::Granted(result) => result,
                    Privileged::Unauthorized => {
                        warn!("Skipping {}: administrative access required", name);
                        continue;
                    }
                }
            } else {
                protocol.run_action(&name, &value, target).await
            };

            match result {
                Ok(()) => info!("Action {} completed on {}", name, target.host),
                Err(e) => error!(
                    "{}",
                    SweepError::Action {
                        action: name.clone(),
                        reason: format!("{:#}", e),
                    }
                ),
            }
        }
    }
}
