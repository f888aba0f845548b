// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use validator::Validate;

/// Run-scoped configuration consumed by the authentication core
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RunConfig {
    #[serde(default)]
    pub credentials: CredentialSources,

    #[validate(nested)]
    #[serde(default)]
    pub limits: FailLimitConfig,

    #[serde(default)]
    pub kerberos: KerberosConfig,

    #[serde(default)]
    pub bruteforce: BruteForceConfig,

    /// Randomized startup delay, whole seconds in `[min, max)`
    #[serde(default)]
    pub jitter: Option<JitterRange>,

    /// Modules to load; when non-empty, module dispatch replaces actions
    #[serde(default)]
    pub modules: Vec<String>,

    /// Per-module options, keyed by module name
    #[serde(default)]
    pub module_options: HashMap<String, HashMap<String, String>>,

    /// Directly-requested protocol actions, keyed by action name
    #[serde(default)]
    pub actions: BTreeMap<String, serde_json::Value>,

    /// Port override; protocols fall back to their default port
    #[serde(default)]
    pub port: Option<u16>,

    /// Protocol-specific settings, interpreted by the selected protocol
    #[serde(default)]
    pub protocol_options: HashMap<String, String>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialSources {
    /// Usernames or paths to username files (`DOMAIN\user` accepted)
    #[serde(default)]
    pub usernames: Vec<String>,

    /// Passwords or paths to password files
    #[serde(default)]
    pub passwords: Vec<String>,

    /// NTLM hashes or paths to hash files
    #[serde(default)]
    pub hashes: Vec<String>,

    /// Kerberos AES keys or paths to key files
    #[serde(default)]
    pub aes_keys: Vec<String>,

    /// Credential store selectors: an id, a range `a-b`, or `all`
    #[serde(default)]
    pub cred_ids: Vec<String>,

    /// Domain override applied to usernames without a `DOMAIN\` prefix
    #[serde(default)]
    pub domain: Option<String>,
}

impl CredentialSources {
    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty() && self.cred_ids.is_empty()
    }
}

/// Lockout-avoidance thresholds; `None` disables that axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FailLimitConfig {
    /// Failed logins across every target and principal
    #[validate(range(min = 1))]
    #[serde(default)]
    pub global: Option<u32>,

    /// Failed logins against one target
    #[validate(range(min = 1))]
    #[serde(default)]
    pub per_target: Option<u32>,

    /// Failed logins for one principal across every target
    #[validate(range(min = 1))]
    #[serde(default)]
    pub per_principal: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KerberosConfig {
    /// Route plaintext/hash attempts through Kerberos and address the target
    /// by its literal hostname
    #[serde(default)]
    pub enabled: bool,

    /// Authenticate once from the credential cache, skipping brute force
    #[serde(default)]
    pub use_kcache: bool,

    #[serde(default)]
    pub kdc_host: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BruteForceConfig {
    /// Paired mode: one secret per principal, matched by index
    #[serde(default)]
    pub no_bruteforce: bool,

    #[serde(default)]
    pub continue_on_success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JitterRange {
    pub min: u64,
    pub max: u64,
}

impl std::str::FromStr for JitterRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = match s.split_once('-') {
            Some((min, max)) => (min.trim(), max.trim()),
            None => ("0", s.trim()),
        };

        Ok(Self {
            min: min
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid jitter lower bound: {}", min))?,
            max: max
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid jitter upper bound: {}", max))?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Mirror log output into this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    #[serde(default)]
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_file: None,
            log_json: false,
        }
    }
}

impl RunConfig {
    /// Module mode takes precedence over directly-requested actions
    pub fn module_mode(&self) -> bool {
        !self.modules.is_empty()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jitter_from_str() {
        let range: JitterRange = "2-5".parse().unwrap();
        assert_eq!(range, JitterRange { min: 2, max: 5 });

        let range: JitterRange = "3".parse().unwrap();
        assert_eq!(range, JitterRange { min: 0, max: 3 });

        assert!("a-b".parse::<JitterRange>().is_err());
    }

    #[test]
    fn test_defaults_deserialize_from_empty_document() {
        let config: RunConfig = serde_json::from_str("{}").unwrap();
        assert!(config.limits.global.is_none());
        assert!(!config.bruteforce.no_bruteforce);
        assert!(!config.module_mode());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = RunConfig {
            limits: FailLimitConfig {
                global: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
