// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Credential Store
 * Narrow query interface over previously captured credentials
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::SecretKind;

/// One stored credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub id: i64,
    #[serde(default)]
    pub domain: Option<String>,
    pub username: String,
    pub secret: String,
    pub kind: SecretKind,
    /// Host the credential was captured from, if any
    #[serde(default)]
    pub pillaged_from: Option<String>,
}

/// Query filter accepted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFilter {
    All,
    Id(i64),
    /// Inclusive id range
    Range(i64, i64),
}

/// Credential store collaborator.
///
/// An unknown id yields `Ok(vec![])`; `Err` is reserved for the store itself
/// failing.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get_credentials(&self, filter: CredentialFilter) -> Result<Vec<StoredCredential>>;
}

/// Volatile store, used when no credential file is configured
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<Vec<StoredCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<StoredCredential>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Insert a credential, assigning the next free id
    pub fn add(
        &self,
        domain: Option<String>,
        username: &str,
        secret: &str,
        kind: SecretKind,
        pillaged_from: Option<String>,
    ) -> i64 {
        let mut records = self.records.write();
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(StoredCredential {
            id,
            domain,
            username: username.to_string(),
            secret: secret.to_string(),
            kind,
            pillaged_from,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn query(&self, filter: CredentialFilter) -> Vec<StoredCredential> {
        let records = self.records.read();
        match filter {
            CredentialFilter::All => records.clone(),
            CredentialFilter::Id(id) => records.iter().filter(|r| r.id == id).cloned().collect(),
            CredentialFilter::Range(start, end) => {
                let mut found: Vec<_> = records
                    .iter()
                    .filter(|r| (start..=end).contains(&r.id))
                    .cloned()
                    .collect();
                found.sort_by_key(|r| r.id);
                found
            }
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get_credentials(&self, filter: CredentialFilter) -> Result<Vec<StoredCredential>> {
        Ok(self.query(filter))
    }
}

/// Store backed by a JSON array of [`StoredCredential`] records on disk
pub struct JsonCredentialStore {
    path: PathBuf,
    inner: InMemoryCredentialStore,
}

impl JsonCredentialStore {
    /// Open the store; a missing file is treated as an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records: Vec<StoredCredential> = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read credential store: {:?}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse credential store: {:?}", path))?
        } else {
            debug!("Credential store {:?} does not exist yet, starting empty", path);
            Vec::new()
        };

        info!("Credential store opened: {:?} ({} records)", path, records.len());

        Ok(Self {
            path,
            inner: InMemoryCredentialStore::with_records(records),
        })
    }

    pub fn add(
        &self,
        domain: Option<String>,
        username: &str,
        secret: &str,
        kind: SecretKind,
        pillaged_from: Option<String>,
    ) -> i64 {
        self.inner.add(domain, username, secret, kind, pillaged_from)
    }

    /// Write all records back to disk
    pub fn flush(&self) -> Result<()> {
        let records = self.inner.query(CredentialFilter::All);
        let content = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credential store: {:?}", self.path))?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn get_credentials(&self, filter: CredentialFilter) -> Result<Vec<StoredCredential>> {
        self.inner.get_credentials(filter).await
    }
}
