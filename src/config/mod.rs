// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use core::{
    BruteForceConfig, CredentialSources, FailLimitConfig, JitterRange, KerberosConfig,
    ObservabilityConfig, RunConfig,
};

pub use loader::{load_from_env, ConfigFormat, ConfigLoader};

pub use validation::ConfigValidator;
