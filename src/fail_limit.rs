// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Fail-Limit Breaker
 * Lockout avoidance through global, per-target and per-principal budgets
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::FailLimitConfig;
use crate::types::Target;

#[derive(Debug, Default)]
struct CounterState {
    global: u32,
    per_principal: HashMap<String, u32>,
}

/// Process-wide failure counters shared by every target in a scan.
///
/// Never reset; they model one lockout budget for the whole scan.
#[derive(Debug, Default)]
pub struct FailCounters {
    state: Mutex<CounterState>,
}

/// Point-in-time view of the shared counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailCounterSnapshot {
    pub global: u32,
    pub per_principal: HashMap<String, u32>,
}

impl FailCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FailCounterSnapshot {
        let state = self.state.lock();
        FailCounterSnapshot {
            global: state.global,
            per_principal: state.per_principal.clone(),
        }
    }

    pub fn global(&self) -> u32 {
        self.state.lock().global
    }

    pub fn principal(&self, principal: &str) -> u32 {
        self.state.lock().per_principal.get(principal).copied().unwrap_or(0)
    }
}

/// Gate consulted before every login attempt against one target
#[derive(Debug, Clone)]
pub struct FailLimitBreaker {
    limits: FailLimitConfig,
    counters: Arc<FailCounters>,
}

impl FailLimitBreaker {
    pub fn new(limits: FailLimitConfig, counters: Arc<FailCounters>) -> Self {
        Self { limits, counters }
    }

    pub fn limits(&self) -> &FailLimitConfig {
        &self.limits
    }

    /// Count one failed attempt on all three axes.
    ///
    /// Returns true when this failure spent a budget. The trip is logged
    /// here once; later skips only show up at debug level.
    pub fn record_failure(&self, target: &mut Target, principal: &str) -> bool {
        let (global, user) = {
            let mut guard = self.counters.state.lock();
            let state = &mut *guard;
            state.global += 1;
            let user = state.per_principal.entry(principal.to_string()).or_insert(0);
            *user += 1;
            (state.global, *user)
        };
        target.failed_logins += 1;

        debug!(
            "Failed login for {} on {}: global={}, principal={}, target={}",
            principal, target.host, global, user, target.failed_logins
        );

        let mut tripped = false;
        if self.limits.global == Some(global) {
            warn!("Global fail limit reached ({})", global);
            tripped = true;
        }
        if self.limits.per_target == Some(target.failed_logins) {
            warn!("Fail limit reached for {} ({})", target.host, target.failed_logins);
            tripped = true;
        }
        if self.limits.per_principal == Some(user) {
            warn!("Fail limit reached for principal {} ({})", principal, user);
            tripped = true;
        }
        tripped
    }

    /// True once any configured budget is exactly spent.
    ///
    /// Equality is the trip condition; counters stop moving once a trip is
    /// observed because no further attempts are made along that axis.
    pub fn over_limit(&self, target: &Target, principal: &str) -> bool {
        let state = self.counters.state.lock();

        if self.limits.global == Some(state.global) {
            debug!("Skipping {}: global fail limit spent", principal);
            return true;
        }

        if self.limits.per_target == Some(target.failed_logins) {
            debug!("Skipping {}: fail limit spent on {}", principal, target.host);
            return true;
        }

        if let (Some(limit), Some(count)) =
            (self.limits.per_principal, state.per_principal.get(principal))
        {
            if limit == *count {
                debug!("Skipping {}: principal fail limit spent ({})", principal, count);
                return true;
            }
        }

        false
    }
}
