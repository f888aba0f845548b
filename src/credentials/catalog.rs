// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Credential Catalog
 * Ordered principals and secrets sourced from arguments, files and the store
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use tracing::{debug, error};

use super::selector::CredentialSelector;
use super::source::{expand_source, split_username};
use crate::database::{CredentialFilter, CredentialStore, StoredCredential};
use crate::errors::{SweepError, SweepResult};
use crate::types::SecretKind;

/// Principal side of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalEntry {
    pub domain: Option<String>,
    pub name: String,
    /// A valid credential is already known for this principal
    pub owned: bool,
    /// Pulled from the credential store rather than supplied by the user
    pub stored: bool,
}

/// Secret side of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub value: String,
    pub kind: SecretKind,
    pub stored: bool,
}

/// Candidate credentials for one run.
///
/// Principals and secrets are independent ordered lists; in spray mode every
/// secret is paired with every principal, in paired mode they are matched by
/// index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialCatalog {
    principals: Vec<PrincipalEntry>,
    secrets: Vec<SecretEntry>,
}

impl CredentialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from command-line literals or files.
    ///
    /// Secrets are ordered passwords, then hashes, then AES keys.
    pub fn from_args(
        usernames: &[String],
        passwords: &[String],
        hashes: &[String],
        aes_keys: &[String],
        default_domain: Option<&str>,
    ) -> SweepResult<Self> {
        let mut catalog = Self::new();

        for arg in usernames {
            for raw in expand_source(arg)? {
                let (domain, name) = split_username(&raw, default_domain);
                catalog.push_principal(domain, name, false);
            }
        }

        for (args, kind) in [
            (passwords, SecretKind::Plaintext),
            (hashes, SecretKind::Hash),
            (aes_keys, SecretKind::AesKey),
        ] {
            for arg in args {
                for value in expand_source(arg)? {
                    catalog.push_secret(value, kind);
                }
            }
        }

        debug!(
            "Parsed {} principal(s) and {} secret(s) from arguments",
            catalog.principals.len(),
            catalog.secrets.len()
        );

        Ok(catalog)
    }

    /// Build from the credential store.
    ///
    /// Unknown ids and malformed selectors are reported and skipped; the
    /// catalog holds whatever did resolve. An `all` selector replaces what
    /// earlier selectors collected.
    pub async fn from_store(store: &dyn CredentialStore, selectors: &[String]) -> Self {
        let mut records: Vec<StoredCredential> = Vec::new();

        for raw in selectors {
            let selector: CredentialSelector = match raw.parse() {
                Ok(selector) => selector,
                Err(e) => {
                    error!("{}", e);
                    continue;
                }
            };

            let filter = selector.filter();
            let found = match store.get_credentials(filter).await {
                Ok(found) => found,
                Err(e) => {
                    error!("Failed to query credential store for '{}': {:#}", raw, e);
                    continue;
                }
            };

            match filter {
                CredentialFilter::All => records = found,
                CredentialFilter::Id(id) if found.is_empty() => {
                    error!("{}", SweepError::InvalidCredentialId(id));
                }
                CredentialFilter::Range(start, end) if found.is_empty() => {
                    error!("No stored credentials with IDs {}-{}", start, end);
                }
                _ => records.extend(found),
            }
        }

        let mut catalog = Self::new();
        for record in records {
            catalog.principals.push(PrincipalEntry {
                domain: record.domain,
                name: record.username,
                owned: true,
                stored: true,
            });
            catalog.secrets.push(SecretEntry {
                value: record.secret,
                kind: record.kind,
                stored: true,
            });
        }

        debug!("Loaded {} credential(s) from store", catalog.principals.len());
        catalog
    }

    /// Append another catalog, keeping both sides in source order
    pub fn extend(&mut self, other: CredentialCatalog) {
        self.principals.extend(other.principals);
        self.secrets.extend(other.secrets);
    }

    pub fn push_principal(&mut self, domain: Option<String>, name: impl Into<String>, owned: bool) {
        self.principals.push(PrincipalEntry {
            domain,
            name: name.into(),
            owned,
            stored: false,
        });
    }

    pub fn push_secret(&mut self, value: impl Into<String>, kind: SecretKind) {
        self.secrets.push(SecretEntry {
            value: value.into(),
            kind,
            stored: false,
        });
    }

    pub fn principals(&self) -> &[PrincipalEntry] {
        &self.principals
    }

    pub fn secrets(&self) -> &[SecretEntry] {
        &self.secrets
    }

    /// First user-supplied principal and password, ignoring store records
    pub fn first_supplied(&self) -> (Option<&PrincipalEntry>, Option<&SecretEntry>) {
        (
            self.principals.iter().find(|p| !p.stored),
            self.secrets
                .iter()
                .find(|s| !s.stored && s.kind == SecretKind::Plaintext),
        )
    }

    pub fn mark_owned(&mut self, index: usize) {
        if let Some(principal) = self.principals.get_mut(index) {
            principal.owned = true;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty() && self.secrets.is_empty()
    }
}
