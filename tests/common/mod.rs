// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scriptable protocol and module doubles shared by the integration tests

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use authsweep::config::RunConfig;
use authsweep::connection::Connection;
use authsweep::modules::{
    ConnectionInfo, ListenerRequest, ModuleConnection, ModuleContext, ModuleHook, ScanModule,
};
use authsweep::protocol::{ActionSpec, KerberosLogin, Protocol};
use authsweep::resolver::LiteralResolver;
use authsweep::scan_state::SharedScanState;
use authsweep::types::Target;

/// What the scripted protocol answers at each lifecycle step
#[derive(Debug, Clone)]
pub struct Script {
    pub create: bool,
    pub print: bool,
    pub admin: bool,
    pub fail_enumerate: bool,
    pub domain: Option<String>,
    /// Accepted (username, secret) pairs, for any login call
    pub valid: Vec<(String, String)>,
    pub actions: Vec<ActionSpec>,
    pub login_delay: Duration,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            create: true,
            print: true,
            admin: false,
            fail_enumerate: false,
            domain: None,
            valid: Vec::new(),
            actions: Vec::new(),
            login_delay: Duration::ZERO,
        }
    }
}

impl Script {
    pub fn accepting(username: &str, secret: &str) -> Self {
        Self {
            valid: vec![(username.to_string(), secret.to_string())],
            ..Default::default()
        }
    }
}

/// Call log and in-flight tracking, shared across every protocol instance
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn logins(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.contains("_login:"))
            .collect()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn push(&self, call: String) {
        self.calls.lock().push(call);
    }
}

pub struct ScriptedProtocol {
    script: Script,
    recorder: Arc<Recorder>,
}

impl ScriptedProtocol {
    pub fn new(script: Script, recorder: Arc<Recorder>) -> Self {
        Self { script, recorder }
    }

    async fn attempt(&self, call: String, username: &str, secret: &str) -> Result<bool> {
        self.recorder.push(call);
        let now = self.recorder.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.peak.fetch_max(now, Ordering::SeqCst);
        if !self.script.login_delay.is_zero() {
            tokio::time::sleep(self.script.login_delay).await;
        }
        self.recorder.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(self
            .script
            .valid
            .iter()
            .any(|(u, s)| u == username && s == secret))
    }
}

#[async_trait]
impl Protocol for ScriptedProtocol {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_port(&self) -> u16 {
        445
    }

    async fn create_connection(&mut self, _target: &mut Target) -> Result<bool> {
        self.recorder.push("create_connection".into());
        Ok(self.script.create)
    }

    async fn enumerate_host_info(&mut self, target: &mut Target) -> Result<()> {
        self.recorder.push("enumerate_host_info".into());
        if self.script.fail_enumerate {
            return Err(anyhow!("session dropped"));
        }
        target.domain = self.script.domain.clone();
        Ok(())
    }

    async fn print_host_info(&self, _target: &Target) -> Result<bool> {
        self.recorder.push("print_host_info".into());
        Ok(self.script.print)
    }

    async fn check_if_admin(&mut self, _target: &Target) -> Result<bool> {
        self.recorder.push("check_if_admin".into());
        Ok(self.script.admin)
    }

    async fn plaintext_login(
        &mut self,
        domain: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        let call = format!(
            "plaintext_login:{}\\{}:{}",
            domain.unwrap_or(""),
            username,
            password
        );
        self.attempt(call, username, password).await
    }

    async fn hash_login(
        &mut self,
        _domain: Option<&str>,
        username: &str,
        ntlm_hash: &str,
    ) -> Result<bool> {
        let call = format!("hash_login:{}:{}", username, ntlm_hash);
        self.attempt(call, username, ntlm_hash).await
    }

    async fn kerberos_login(&mut self, request: KerberosLogin<'_>) -> Result<bool> {
        let call = format!(
            "kerberos_login:{}:cache={}",
            request.username, request.use_cache
        );
        let secret = [request.password, request.ntlm_hash, request.aes_key].concat();
        self.attempt(call, request.username, &secret).await
    }

    fn local_address(&self) -> Option<String> {
        Some("10.0.0.250".to_string())
    }

    fn supported_actions(&self) -> &[ActionSpec] {
        &self.script.actions
    }

    async fn run_action(
        &mut self,
        name: &str,
        value: &serde_json::Value,
        _target: &Target,
    ) -> Result<()> {
        self.recorder.push(format!("action:{}={}", name, value));
        if name == "explode" {
            return Err(anyhow!("action blew up"));
        }
        Ok(())
    }
}

/// Module that records which hooks ran, optionally failing in one of them
pub struct RecordingModule {
    pub name: &'static str,
    pub hooks: Vec<ModuleHook>,
    pub fail_in: Option<ModuleHook>,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl RecordingModule {
    pub fn new(name: &'static str, hooks: Vec<ModuleHook>, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            name,
            hooks,
            fail_in: None,
            log,
        }
    }

    fn record(&self, hook: ModuleHook) -> Result<()> {
        self.log.lock().push(format!("{}:{:?}", self.name, hook));
        if self.fail_in == Some(hook) {
            return Err(anyhow!("{} failed", self.name));
        }
        Ok(())
    }
}

#[async_trait]
impl ScanModule for RecordingModule {
    fn name(&self) -> &str {
        self.name
    }

    fn hooks(&self) -> &[ModuleHook] {
        &self.hooks
    }

    async fn on_login(&self, _ctx: &ModuleContext, _conn: &mut ModuleConnection<'_>) -> Result<()> {
        self.record(ModuleHook::OnLogin)
    }

    async fn on_admin_login(
        &self,
        _ctx: &ModuleContext,
        _conn: &mut ModuleConnection<'_>,
    ) -> Result<()> {
        self.record(ModuleHook::OnAdminLogin)
    }

    async fn on_request(
        &self,
        _ctx: &ModuleContext,
        connection: &ConnectionInfo,
        request: &ListenerRequest,
    ) -> Result<Option<String>> {
        self.record(ModuleHook::OnRequest)?;
        Ok(Some(format!("{} from {} for {}", request.body, request.peer, connection.host)))
    }

    async fn on_shutdown(
        &self,
        _ctx: &ModuleContext,
        _conn: &mut ModuleConnection<'_>,
    ) -> Result<()> {
        self.record(ModuleHook::OnShutdown)
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Connection over the scripted protocol, resolving IP literals only
pub fn connection(
    host: &str,
    script: Script,
    recorder: &Arc<Recorder>,
    config: &Arc<RunConfig>,
    state: &Arc<SharedScanState>,
) -> Connection {
    Connection::new(
        host,
        Box::new(ScriptedProtocol::new(script, Arc::clone(recorder))),
        Arc::clone(config),
        Arc::clone(state),
    )
    .with_resolver(Arc::new(LiteralResolver))
}
