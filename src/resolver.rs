// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Host Resolution
 * Single best-effort lookup: IPv6 with canonical name, IPv4 fallback
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioResolver;
use std::net::IpAddr;
use tracing::debug;

use crate::errors::{SweepError, SweepResult};

/// Outcome of resolving a target hostname
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    pub address: IpAddr,
    pub canonical_name: Option<String>,
}

impl ResolvedHost {
    /// Canonical name when known, otherwise the address
    pub fn display_name(&self) -> String {
        match &self.canonical_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self.address.to_string(),
        }
    }
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, hostname: &str) -> SweepResult<ResolvedHost>;
}

/// Resolver backed by the system DNS configuration
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    pub fn from_system_conf() -> anyhow::Result<Self> {
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())?.build();
        Ok(Self { resolver })
    }

    async fn lookup(&self, hostname: &str, record_type: RecordType) -> Option<ResolvedHost> {
        let lookup = match self.resolver.lookup(hostname, record_type).await {
            Ok(lookup) => lookup,
            Err(e) => {
                debug!("{:?} lookup failed for {}: {}", record_type, hostname, e);
                return None;
            }
        };

        let mut address = None;
        let mut canonical_name = None;

        for record in lookup.record_iter() {
            match record.data() {
                RData::AAAA(aaaa) if address.is_none() => address = Some(IpAddr::V6(aaaa.0)),
                RData::A(a) if address.is_none() => address = Some(IpAddr::V4(a.0)),
                RData::CNAME(cname) => canonical_name = Some(trim_root(&cname.0.to_utf8())),
                _ => {}
            }
        }

        address.map(|address| ResolvedHost {
            address,
            canonical_name: canonical_name.or_else(|| Some(trim_root(hostname))),
        })
    }
}

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, hostname: &str) -> SweepResult<ResolvedHost> {
        if let Ok(address) = hostname.parse::<IpAddr>() {
            return Ok(ResolvedHost {
                address,
                canonical_name: None,
            });
        }

        if let Some(resolved) = self.lookup(hostname, RecordType::AAAA).await {
            return Ok(resolved);
        }

        self.lookup(hostname, RecordType::A)
            .await
            .ok_or_else(|| SweepError::Resolution {
                host: hostname.to_string(),
                reason: "no AAAA or A records".to_string(),
            })
    }
}

/// Resolves IP literals only; anything else fails
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralResolver;

#[async_trait]
impl HostResolver for LiteralResolver {
    async fn resolve(&self, hostname: &str) -> SweepResult<ResolvedHost> {
        hostname
            .parse::<IpAddr>()
            .map(|address| ResolvedHost {
                address,
                canonical_name: None,
            })
            .map_err(|e| SweepError::Resolution {
                host: hostname.to_string(),
                reason: e.to_string(),
            })
    }
}

fn trim_root(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}
