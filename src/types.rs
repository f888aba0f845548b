// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of secret, selects which login call is used
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SecretKind {
    Plaintext,
    Hash,
    AesKey,
}

impl std::fmt::Display for SecretKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SecretKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SecretKind::Plaintext => "plaintext",
            SecretKind::Hash => "hash",
            SecretKind::AesKey => "aesKey",
        }
    }
}

impl FromStr for SecretKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plaintext" => Ok(SecretKind::Plaintext),
            "hash" => Ok(SecretKind::Hash),
            "aeskey" | "aes_key" => Ok(SecretKind::AesKey),
            _ => Err(format!("Unknown secret kind: {}", s)),
        }
    }
}

/// Credential that authenticated successfully against a target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub domain: Option<String>,
    pub principal: String,
    pub kind: SecretKind,
}

/// One network endpoint under test.
///
/// Lives for exactly one lifecycle run. The per-target failure counter and
/// the privilege flag are only ever touched by the task driving that run.
#[derive(Debug, Clone)]
pub struct Target {
    /// Hostname as supplied by the user
    pub hostname: String,

    /// Resolved address or canonical name
    pub host: String,

    pub port: u16,

    /// Domain discovered during host enumeration
    pub domain: Option<String>,

    pub is_admin: bool,

    /// Failed attempts against this target in the current run
    pub failed_logins: u32,

    /// Last attempted principal, empty until an attempt is made
    pub username: String,

    /// Last attempted secret, empty until an attempt is made
    pub secret: String,

    pub local_ip: Option<String>,

    pub authenticated_as: Option<AuthenticatedIdentity>,
}

impl Target {
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        let hostname = hostname.into();
        Self {
            host: hostname.clone(),
            hostname,
            port,
            domain: None,
            is_admin: false,
            failed_logins: 0,
            username: String::new(),
            secret: String::new(),
            local_ip: None,
            authenticated_as: None,
        }
    }

    /// Null session: nothing (or only empty strings) was attempted.
    pub fn is_null_session(&self) -> bool {
        self.username.is_empty() && self.secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_kind_serde_names() {
        let json = serde_json::to_string(&SecretKind::AesKey).unwrap();
        assert_eq!(json, "\"aesKey\"");
        let kind: SecretKind = serde_json::from_str("\"plaintext\"").unwrap();
        assert_eq!(kind, SecretKind::Plaintext);
    }

    #[test]
    fn test_secret_kind_from_str() {
        assert_eq!("HASH".parse::<SecretKind>().unwrap(), SecretKind::Hash);
        assert_eq!("aes_key".parse::<SecretKind>().unwrap(), SecretKind::AesKey);
        assert!("ticket".parse::<SecretKind>().is_err());
    }

    #[test]
    fn test_new_target_is_null_session() {
        let target = Target::new("dc01.corp.local", 445);
        assert!(target.is_null_session());
        assert_eq!(target.host, "dc01.corp.local");
        assert!(!target.is_admin);
    }
}
