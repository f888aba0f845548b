// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - HTTP Basic Protocol
 * Password authentication against HTTP endpoints guarded by Basic auth
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, SERVER, WWW_AUTHENTICATE};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::protocol::{ActionSpec, KerberosLogin, Protocol};
use crate::types::Target;

const DEFAULT_PORT: u16 = 80;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ACTIONS: &[ActionSpec] = &[
    ActionSpec {
        name: "headers",
        requires_admin: false,
    },
    ActionSpec {
        name: "fetch",
        requires_admin: true,
    },
];

/// Settings read from `protocol_options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpBasicOptions {
    pub scheme: String,
    /// Path guarded by Basic auth
    pub path: String,
    /// Path only administrators may read; no admin probe when unset
    pub admin_path: Option<String>,
    pub timeout_secs: u64,
}

impl Default for HttpBasicOptions {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            path: "/".to_string(),
            admin_path: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpBasicOptions {
    pub fn from_map(options: &HashMap<String, String>) -> Result<Self> {
        let mut parsed = Self::default();

        if let Some(scheme) = options.get("scheme") {
            match scheme.as_str() {
                "http" | "https" => parsed.scheme = scheme.clone(),
                other => bail!("Unsupported scheme '{}'", other),
            }
        }
        if let Some(path) = options.get("path") {
            parsed.path = normalize_path(path);
        }
        if let Some(admin_path) = options.get("admin_path") {
            parsed.admin_path = Some(normalize_path(admin_path));
        }
        if let Some(timeout) = options.get("timeout_secs") {
            parsed.timeout_secs = timeout
                .parse()
                .with_context(|| format!("Invalid timeout_secs '{}'", timeout))?;
        }

        Ok(parsed)
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Host info gathered from the unauthenticated probe
#[derive(Debug, Clone, Default)]
struct HostInfo {
    server: Option<String>,
    challenge: Option<String>,
    realm: Option<String>,
}

pub struct HttpBasicProtocol {
    client: Client,
    options: HttpBasicOptions,
    base_url: Option<String>,
    probe_headers: HeaderMap,
    info: HostInfo,
    local_ip: Option<String>,
    /// Credentials of the authenticated session, already domain-qualified
    session: Option<(String, String)>,
}

impl HttpBasicProtocol {
    pub const NAME: &'static str = "http_basic";

    pub fn new(options: HttpBasicOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("authsweep/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            options,
            base_url: None,
            probe_headers: HeaderMap::new(),
            info: HostInfo::default(),
            local_ip: None,
            session: None,
        })
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Self::new(HttpBasicOptions::from_map(&config.protocol_options)?)
    }

    fn url(&self, path: &str) -> Result<String> {
        match &self.base_url {
            Some(base) => Ok(format!("{}{}", base, path)),
            None => bail!("No connection established"),
        }
    }

    async fn get(&self, path: &str, credentials: Option<(&str, &str)>) -> Result<Response> {
        let url = self.url(path)?;
        let mut request = self.client.get(&url);
        if let Some((username, password)) = credentials {
            request = request.basic_auth(username, Some(password));
        }
        request
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))
    }

    fn session_credentials(&self) -> Option<(&str, &str)> {
        self.session
            .as_ref()
            .map(|(username, password)| (username.as_str(), password.as_str()))
    }

    async fn probe_local_address(host: &str, port: u16) -> Option<String> {
        let bind = match host.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => "[::]:0",
            _ => "0.0.0.0:0",
        };
        let socket = UdpSocket::bind(bind).await.ok()?;
        socket.connect((host, port)).await.ok()?;
        socket.local_addr().ok().map(|addr| addr.ip().to_string())
    }
}

/// Bracket bare IPv6 literals for use in a URL authority
fn url_host(host: &str) -> String {
    match host.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{}]", host),
        Err(_) => host.to_string(),
    }
}

/// Extract `realm="..."` from a `WWW-Authenticate` challenge
fn parse_realm(challenge: &str) -> Option<String> {
    let lower = challenge.to_ascii_lowercase();
    let start = lower.find("realm=")? + "realm=".len();
    let rest = &challenge[start..];
    let realm = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split([',', ' ']).next()?,
    };
    (!realm.is_empty()).then(|| realm.to_string())
}

#[async_trait]
impl Protocol for HttpBasicProtocol {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn default_port(&self) -> u16 {
        if self.options.scheme == "https" {
            443
        } else {
            DEFAULT_PORT
        }
    }

    async fn create_connection(&mut self, target: &mut Target) -> Result<bool> {
        let base_url = format!(
            "{}://{}:{}",
            self.options.scheme,
            url_host(&target.host),
            target.port
        );
        self.base_url = Some(base_url);

        let response = match self.get(&self.options.path, None).await {
            Ok(response) => response,
            Err(e) => {
                debug!("{:#}", e);
                return Ok(false);
            }
        };

        debug!("Probe of {} returned {}", target.host, response.status());
        self.probe_headers = response.headers().clone();
        self.local_ip = Self::probe_local_address(&target.host, target.port).await;
        Ok(true)
    }

    async fn enumerate_host_info(&mut self, target: &mut Target) -> Result<()> {
        let header = |name: HeaderName| {
            self.probe_headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let challenge = header(WWW_AUTHENTICATE);
        let info = HostInfo {
            server: header(SERVER),
            realm: challenge.as_deref().and_then(parse_realm),
            challenge,
        };

        if target.domain.is_none() {
            target.domain = info.realm.clone();
        }
        self.info = info;
        Ok(())
    }

    async fn print_host_info(&self, target: &Target) -> Result<bool> {
        info!(
            "{}:{} (server:{}) (realm:{})",
            target.host,
            target.port,
            self.info.server.as_deref().unwrap_or("unknown"),
            self.info.realm.as_deref().unwrap_or("none")
        );

        match &self.info.challenge {
            Some(challenge) if !challenge.to_ascii_lowercase().starts_with("basic") => {
                info!("{} does not offer Basic authentication ({})", target.host, challenge);
                Ok(false)
            }
            _ => Ok(true),
        }
    }

    async fn check_if_admin(&mut self, _target: &Target) -> Result<bool> {
        let Some(admin_path) = self.options.admin_path.clone() else {
            return Ok(false);
        };
        let response = self.get(&admin_path, self.session_credentials()).await?;
        Ok(response.status().is_success())
    }

    async fn plaintext_login(
        &mut self,
        domain: Option<&str>,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        let user = match domain {
            Some(domain) if !domain.is_empty() => format!("{}\\{}", domain, username),
            _ => username.to_string(),
        };

        let response = self.get(&self.options.path, Some((&user, password))).await?;
        let status = response.status();
        debug!("Basic auth as {} returned {}", user, status);

        if status.is_success() {
            self.session = Some((user, password.to_string()));
            return Ok(true);
        }
        Ok(false)
    }

    async fn hash_login(
        &mut self,
        _domain: Option<&str>,
        _username: &str,
        _ntlm_hash: &str,
    ) -> Result<bool> {
        bail!("HTTP Basic authentication does not accept NTLM hashes")
    }

    async fn kerberos_login(&mut self, _request: KerberosLogin<'_>) -> Result<bool> {
        bail!("HTTP Basic authentication does not support Kerberos")
    }

    fn local_address(&self) -> Option<String> {
        self.local_ip.clone()
    }

    fn supported_actions(&self) -> &[ActionSpec] {
        ACTIONS
    }

    async fn run_action(
        &mut self,
        name: &str,
        value: &serde_json::Value,
        target: &Target,
    ) -> Result<()> {
        match name {
            "headers" => {
                let response = self.get(&self.options.path, self.session_credentials()).await?;
                for (header, value) in response.headers() {
                    info!(
                        "{} {}: {}",
                        target.host,
                        header,
                        value.to_str().unwrap_or("<binary>")
                    );
                }
                Ok(())
            }
            "fetch" => {
                let path = match value {
                    serde_json::Value::String(path) => normalize_path(path),
                    _ => self.options.path.clone(),
                };
                let response = self.get(&path, self.session_credentials()).await?;
                let status = response.status();
                let body = response.text().await.context("Failed to read response body")?;
                info!("{} {} -> {} ({} bytes)", target.host, path, status, body.len());
                Ok(())
            }
            other => bail!("Unknown action {}", other),
        }
    }
}
