// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Brute-Force Engine
 * Password spraying and paired credential checks under a global gate
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::credentials::CredentialCatalog;
use crate::errors::SweepError;
use crate::fail_limit::FailLimitBreaker;
use crate::protocol::{KerberosLogin, Protocol};
use crate::scan_state::SharedScanState;
use crate::types::{AuthenticatedIdentity, SecretKind, Target};

/// Iteration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BruteForceMode {
    /// Every secret against every principal, secret-major
    #[default]
    Spray,
    /// secret[i] against principal[i] only
    Paired,
}

/// Engine switches derived from the run configuration
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub mode: BruteForceMode,
    pub continue_on_success: bool,
    /// Route plaintext and hash secrets through Kerberos
    pub kerberos: bool,
    pub use_kcache: bool,
    pub kdc_host: Option<String>,
}

impl EngineOptions {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            mode: if config.bruteforce.no_bruteforce {
                BruteForceMode::Paired
            } else {
                BruteForceMode::Spray
            },
            continue_on_success: config.bruteforce.continue_on_success,
            kerberos: config.kerberos.enabled,
            use_kcache: config.kerberos.use_kcache,
            kdc_host: config.kerberos.kdc_host.clone(),
        }
    }
}

/// Result of one authentication phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BruteForceOutcome {
    /// Login calls actually made
    pub attempts: usize,
    pub successes: Vec<AuthenticatedIdentity>,
    /// Phase aborted before any attempt because of bad input
    pub configuration_error: Option<String>,
}

impl BruteForceOutcome {
    pub fn authenticated(&self) -> bool {
        !self.successes.is_empty()
    }
}

pub struct BruteForceEngine<'a> {
    state: &'a SharedScanState,
    breaker: FailLimitBreaker,
    options: EngineOptions,
}

impl<'a> BruteForceEngine<'a> {
    pub fn new(state: &'a SharedScanState, breaker: FailLimitBreaker, options: EngineOptions) -> Self {
        Self {
            state,
            breaker,
            options,
        }
    }

    pub fn from_config(state: &'a SharedScanState, config: &RunConfig) -> Self {
        Self::new(state, state.breaker(config.limits), EngineOptions::from_config(config))
    }

    /// Authenticate against `target` with the catalog.
    ///
    /// Never fails: attempt errors are counted as failures and logged.
    pub async fn run(
        &self,
        catalog: &mut CredentialCatalog,
        target: &mut Target,
        protocol: &mut dyn Protocol,
    ) -> BruteForceOutcome {
        if self.options.use_kcache {
            return self.kerberos_cache_login(catalog, target, protocol).await;
        }

        match self.options.mode {
            BruteForceMode::Spray => self.spray(catalog, target, protocol).await,
            BruteForceMode::Paired => self.paired(catalog, target, protocol).await,
        }
    }

    async fn spray(
        &self,
        catalog: &mut CredentialCatalog,
        target: &mut Target,
        protocol: &mut dyn Protocol,
    ) -> BruteForceOutcome {
        let mut outcome = BruteForceOutcome::default();

        for secret_idx in 0..catalog.secrets().len() {
            for principal_idx in 0..catalog.principals().len() {
                if self
                    .try_credentials(catalog, principal_idx, secret_idx, target, protocol, &mut outcome)
                    .await
                {
                    catalog.mark_owned(principal_idx);
                    if !self.options.continue_on_success {
                        return outcome;
                    }
                }
            }
        }

        outcome
    }

    async fn paired(
        &self,
        catalog: &mut CredentialCatalog,
        target: &mut Target,
        protocol: &mut dyn Protocol,
    ) -> BruteForceOutcome {
        let mut outcome = BruteForceOutcome::default();

        let principals = catalog.principals().len();
        let secrets = catalog.secrets().len();
        if principals != secrets {
            let err = SweepError::CredentialCountMismatch {
                principals,
                secrets,
            };
            error!("{}", err);
            outcome.configuration_error = Some(err.to_string());
            return outcome;
        }

        for idx in 0..principals {
            if self
                .try_credentials(catalog, idx, idx, target, protocol, &mut outcome)
                .await
            {
                catalog.mark_owned(idx);
                if !self.options.continue_on_success {
                    return outcome;
                }
            }
        }

        outcome
    }

    /// One guarded attempt. Returns true on successful authentication.
    async fn try_credentials(
        &self,
        catalog: &CredentialCatalog,
        principal_idx: usize,
        secret_idx: usize,
        target: &mut Target,
        protocol: &mut dyn Protocol,
        outcome: &mut BruteForceOutcome,
    ) -> bool {
        let principal = &catalog.principals()[principal_idx];
        let secret = &catalog.secrets()[secret_idx];

        if self.options.continue_on_success && principal.owned {
            return false;
        }

        let _gate = self.state.auth_gate().await;

        if self.breaker.over_limit(target, &principal.name) {
            return false;
        }

        target.username = principal.name.clone();
        target.secret = secret.value.clone();
        outcome.attempts += 1;

        let domain = principal.domain.as_deref();
        let result = self
            .login(protocol, domain, &principal.name, &secret.value, secret.kind)
            .await;

        match result {
            Ok(true) => {
                info!(
                    "Authenticated to {} as {}{} ({})",
                    target.host,
                    domain.map(|d| format!("{}\\", d)).unwrap_or_default(),
                    principal.name,
                    secret.kind
                );
                let identity = AuthenticatedIdentity {
                    domain: principal.domain.clone(),
                    principal: principal.name.clone(),
                    kind: secret.kind,
                };
                if target.authenticated_as.is_none() {
                    target.authenticated_as = Some(identity.clone());
                }
                outcome.successes.push(identity);
                true
            }
            Ok(false) => {
                self.breaker.record_failure(target, &principal.name);
                false
            }
            Err(e) => {
                warn!("Login attempt for {} on {} raised: {:#}", principal.name, target.host, e);
                self.breaker.record_failure(target, &principal.name);
                false
            }
        }
    }

    async fn login(
        &self,
        protocol: &mut dyn Protocol,
        domain: Option<&str>,
        username: &str,
        secret: &str,
        kind: SecretKind,
    ) -> anyhow::Result<bool> {
        let kdc_host = self.options.kdc_host.as_deref();

        match kind {
            SecretKind::Plaintext if self.options.kerberos => {
                protocol
                    .kerberos_login(KerberosLogin {
                        domain,
                        username,
                        password: secret,
                        ntlm_hash: "",
                        aes_key: "",
                        kdc_host,
                        use_cache: false,
                    })
                    .await
            }
            SecretKind::Plaintext => protocol.plaintext_login(domain, username, secret).await,
            SecretKind::Hash if self.options.kerberos => {
                protocol
                    .kerberos_login(KerberosLogin {
                        domain,
                        username,
                        password: "",
                        ntlm_hash: secret,
                        aes_key: "",
                        kdc_host,
                        use_cache: false,
                    })
                    .await
            }
            SecretKind::Hash => protocol.hash_login(domain, username, secret).await,
            SecretKind::AesKey => {
                protocol
                    .kerberos_login(KerberosLogin {
                        domain,
                        username,
                        password: "",
                        ntlm_hash: "",
                        aes_key: secret,
                        kdc_host,
                        use_cache: false,
                    })
                    .await
            }
        }
    }

    /// Single cache-backed Kerberos call; success is reported regardless of
    /// what the protocol returns.
    async fn kerberos_cache_login(
        &self,
        catalog: &CredentialCatalog,
        target: &mut Target,
        protocol: &mut dyn Protocol,
    ) -> BruteForceOutcome {
        let (principal, secret) = catalog.first_supplied();
        let username = principal.map(|p| p.name.clone()).unwrap_or_default();
        let password = secret.map(|s| s.value.clone()).unwrap_or_default();
        let domain = target
            .domain
            .clone()
            .or_else(|| principal.and_then(|p| p.domain.clone()));

        target.username = username.clone();
        target.secret = password.clone();

        let _gate = self.state.auth_gate().await;

        let result = protocol
            .kerberos_login(KerberosLogin {
                domain: domain.as_deref(),
                username: &username,
                password: &password,
                ntlm_hash: "",
                aes_key: "",
                kdc_host: self.options.kdc_host.as_deref(),
                use_cache: true,
            })
            .await;

        if let Err(e) = result {
            debug!("Kerberos cache login on {} raised: {:#}", target.host, e);
        }

        info!("Successfully authenticated to {} using Kerberos cache", target.host);

        let identity = AuthenticatedIdentity {
            domain,
            principal: username,
            kind: SecretKind::Plaintext,
        };
        target.authenticated_as = Some(identity.clone());

        BruteForceOutcome {
            attempts: 1,
            successes: vec![identity],
            configuration_error: None,
        }
    }
}
