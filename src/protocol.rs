// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Contract every protocol implementation supplies to the lifecycle
//!
//! The lifecycle calls these in a fixed order; transport, handshakes and
//! hashing stay behind this boundary.

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Target;

/// Arguments of one Kerberos login call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KerberosLogin<'a> {
    pub domain: Option<&'a str>,
    pub username: &'a str,
    pub password: &'a str,
    pub ntlm_hash: &'a str,
    pub aes_key: &'a str,
    pub kdc_host: Option<&'a str>,
    /// Authenticate from the local credential cache
    pub use_cache: bool,
}

/// A directly-runnable named action exposed by a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionSpec {
    pub name: &'static str,
    /// Only runs when the target's privilege flag is set
    pub requires_admin: bool,
}

#[async_trait]
pub trait Protocol: Send + Sync {
    /// Short protocol name, also used in log output
    fn name(&self) -> &str;

    fn default_port(&self) -> u16;

    /// Establish the session; `false` halts the run.
    async fn create_connection(&mut self, target: &mut Target) -> Result<bool>;

    /// Collect host metadata, filling `target.domain` when discovered.
    async fn enumerate_host_info(&mut self, target: &mut Target) -> Result<()>;

    /// Report host metadata; `false` excludes the host from authentication.
    async fn print_host_info(&self, target: &Target) -> Result<bool>;

    /// Probe whether the current session holds administrative rights.
    async fn check_if_admin(&mut self, target: &Target) -> Result<bool>;

    async fn plaintext_login(
        &mut self,
        domain: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<bool>;

    async fn hash_login(
        &mut self,
        domain: Option<&str>,
        username: &str,
        ntlm_hash: &str,
    ) -> Result<bool>;

    async fn kerberos_login(&mut self, request: KerberosLogin<'_>) -> Result<bool>;

    /// Local address of the live session, handed to listener modules
    fn local_address(&self) -> Option<String> {
        None
    }

    fn supported_actions(&self) -> &[ActionSpec] {
        &[]
    }

    /// Run one directly-requested action with its configured value.
    async fn run_action(
        &mut self,
        name: &str,
        _value: &serde_json::Value,
        _target: &Target,
    ) -> Result<()> {
        Err(anyhow::anyhow!("{} does not implement action {}", self.name(), name))
    }
}
