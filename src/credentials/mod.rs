// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod catalog;
pub mod selector;
pub mod source;

pub use catalog::{CredentialCatalog, PrincipalEntry, SecretEntry};
pub use selector::CredentialSelector;
pub use source::{expand_source, split_username};

use crate::config::CredentialSources;
use crate::database::CredentialStore;
use crate::errors::SweepResult;

/// Assemble the run catalog: store credentials first, then arguments.
pub async fn build_catalog(
    sources: &CredentialSources,
    store: &dyn CredentialStore,
    default_domain: Option<&str>,
) -> SweepResult<CredentialCatalog> {
    let mut catalog = CredentialCatalog::new();

    if !sources.cred_ids.is_empty() {
        catalog.extend(CredentialCatalog::from_store(store, &sources.cred_ids).await);
    }

    if !sources.usernames.is_empty() {
        catalog.extend(CredentialCatalog::from_args(
            &sources.usernames,
            &sources.passwords,
            &sources.hashes,
            &sources.aes_keys,
            default_domain,
        )?);
    }

    Ok(catalog)
}
