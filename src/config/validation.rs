// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::RunConfig;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate_run_config(config: &RunConfig) -> Result<()> {
        config.validate()
            .context("Configuration validation failed")?;

        Self::validate_jitter(config)?;
        Self::validate_credentials(config)?;
        Self::validate_kerberos(config)?;

        Ok(())
    }

    fn validate_jitter(config: &RunConfig) -> Result<()> {
        if let Some(jitter) = config.jitter {
            if jitter.min >= jitter.max {
                return Err(anyhow::anyhow!(
                    "Jitter range must satisfy min < max (got {}-{})",
                    jitter.min,
                    jitter.max
                ));
            }
        }

        Ok(())
    }

    fn validate_credentials(config: &RunConfig) -> Result<()> {
        let sources = &config.credentials;

        let has_secrets = !sources.passwords.is_empty()
            || !sources.hashes.is_empty()
            || !sources.aes_keys.is_empty();

        if has_secrets
            && sources.usernames.is_empty()
            && sources.cred_ids.is_empty()
            && !config.kerberos.use_kcache
        {
            return Err(anyhow::anyhow!(
                "Passwords, hashes or AES keys were given without any username"
            ));
        }

        if let Some(domain) = &sources.domain {
            if domain.contains('\\') {
                return Err(anyhow::anyhow!("Domain override cannot contain a backslash"));
            }
        }

        Ok(())
    }

    fn validate_kerberos(config: &RunConfig) -> Result<()> {
        if let Some(kdc) = &config.kerberos.kdc_host {
            if kdc.trim().is_empty() {
                return Err(anyhow::anyhow!("KDC host cannot be empty"));
            }
        }

        Ok(())
    }
}
