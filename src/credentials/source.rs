// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Literal-or-file credential arguments and `DOMAIN\user` notation

use std::path::Path;
use tracing::debug;

use crate::errors::{SweepError, SweepResult};

/// Expand one argument into entries.
///
/// An argument naming an existing regular file yields one entry per
/// non-blank line, whitespace-trimmed. Anything else is taken literally.
pub fn expand_source(arg: &str) -> SweepResult<Vec<String>> {
    let path = Path::new(arg);
    if !path.is_file() {
        return Ok(vec![arg.to_string()]);
    }

    let content = std::fs::read_to_string(path).map_err(|source| SweepError::CredentialFile {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    debug!("Loaded {} entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Split `DOMAIN\user`; without a separator the default domain applies.
///
/// Only the first backslash separates, so `CORP\svc\x` keeps `svc\x` as
/// the principal. An empty domain part (`\user`) means no domain.
pub fn split_username(raw: &str, default_domain: Option<&str>) -> (Option<String>, String) {
    match raw.split_once('\\') {
        Some((domain, user)) => {
            let domain = domain.trim();
            let domain = (!domain.is_empty()).then(|| domain.to_string());
            (domain, user.trim().to_string())
        }
        None => (default_domain.map(str::to_string), raw.to_string()),
    }
}
