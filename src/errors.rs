// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Sweep Error Types
 * Error taxonomy for credential sourcing, lifecycle guards and dispatch
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the authentication core
#[derive(Error, Debug)]
pub enum SweepError {
    /// Hostname could not be resolved to an address
    #[error("DNS resolution failed for {host}: {reason}")]
    Resolution {
        host: String,
        reason: String,
    },

    /// Invalid run configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Paired mode requires one secret per principal
    #[error("Number provided of usernames ({principals}) and passwords/hashes ({secrets}) do not match")]
    CredentialCountMismatch {
        principals: usize,
        secrets: usize,
    },

    /// Credential identifier that the store does not know about
    #[error("Invalid database credential ID {0}")]
    InvalidCredentialId(i64),

    /// Credential selector that is neither an id, a range nor `all`
    #[error("Invalid credential selector '{0}'")]
    InvalidSelector(String),

    /// Failure inside the credential store collaborator
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// File-sourced credential list could not be read
    #[error("Failed to read credential file {path:?}: {source}")]
    CredentialFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A module hook raised
    #[error("Module {module} failed in {hook}: {reason}")]
    Module {
        module: String,
        hook: &'static str,
        reason: String,
    },

    /// A directly-requested action raised
    #[error("Action {action} failed: {reason}")]
    Action {
        action: String,
        reason: String,
    },
}

/// Result type for core operations
pub type SweepResult<T> = Result<T, SweepError>;
