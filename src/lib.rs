// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - authsweep Library
 * Authentication and enumeration core: connection lifecycle, credential
 * brute-forcing under fail limits, post-authentication module dispatch
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod database;
pub mod errors;
pub mod types;

// Credential sourcing and the brute-force engine
pub mod bruteforce;
pub mod credentials;
pub mod fail_limit;
pub mod scan_state;

// Lifecycle and protocol contract
pub mod connection;
pub mod protocol;
pub mod resolver;

// Post-authentication modules
pub mod modules;

// Protocol adapters and registry
pub mod protocols;
pub mod registry;

pub use bruteforce::{BruteForceEngine, BruteForceMode, BruteForceOutcome, EngineOptions};
pub use config::RunConfig;
pub use connection::{requires_admin, Connection, LifecycleState, Privileged, RunReport};
pub use errors::{SweepError, SweepResult};
pub use protocol::{ActionSpec, KerberosLogin, Protocol};
pub use scan_state::SharedScanState;
pub use types::{AuthenticatedIdentity, SecretKind, Target};
