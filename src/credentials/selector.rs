// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use std::str::FromStr;

use crate::database::CredentialFilter;
use crate::errors::SweepError;

/// Which stored credentials to pull into the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSelector {
    All,
    Id(i64),
    /// Inclusive id range, `a-b`
    Range(i64, i64),
}

impl FromStr for CredentialSelector {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(CredentialSelector::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            let start: i64 = start
                .trim()
                .parse()
                .map_err(|_| SweepError::InvalidSelector(s.to_string()))?;
            let end: i64 = end
                .trim()
                .parse()
                .map_err(|_| SweepError::InvalidSelector(s.to_string()))?;
            if start > end {
                return Err(SweepError::InvalidSelector(s.to_string()));
            }
            return Ok(CredentialSelector::Range(start, end));
        }

        s.parse()
            .map(CredentialSelector::Id)
            .map_err(|_| SweepError::InvalidSelector(s.to_string()))
    }
}

impl CredentialSelector {
    /// Store query for this selector; ranges are matched by the store, never expanded
    pub fn filter(&self) -> CredentialFilter {
        match *self {
            CredentialSelector::All => CredentialFilter::All,
            CredentialSelector::Id(id) => CredentialFilter::Id(id),
            CredentialSelector::Range(start, end) => CredentialFilter::Range(start, end),
        }
    }
}
