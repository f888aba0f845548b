// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::core::RunConfig;
use super::validation::ConfigValidator;

pub struct ConfigLoader {
    config_path: PathBuf,
    format: ConfigFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let path = config_path.as_ref().to_path_buf();
        let format = Self::detect_format(&path)?;

        Ok(Self {
            config_path: path,
            format,
        })
    }

    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| anyhow::anyhow!("Could not determine config file format"))?;

        match extension {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(anyhow::anyhow!("Unsupported config file format: {}", extension)),
        }
    }

    pub fn load_config(&self) -> Result<RunConfig> {
        let content = std::fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {:?}", self.config_path))?;

        let mut config = Self::parse(&content, self.format)?;

        apply_env_overrides(&mut config)?;

        ConfigValidator::validate_run_config(&config)?;

        Ok(config)
    }

    pub fn parse(content: &str, format: ConfigFormat) -> Result<RunConfig> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .context("Failed to parse YAML config")?,
            ConfigFormat::Toml => toml::from_str(content)
                .context("Failed to parse TOML config")?,
            ConfigFormat::Json => serde_json::from_str(content)
                .context("Failed to parse JSON config")?,
        };
        Ok(config)
    }
}

/// Load configuration from environment variables on top of defaults
///
/// Supports the following environment variables:
/// - AUTHSWEEP_LOG_LEVEL: Logging level
/// - AUTHSWEEP_LOG_FILE: Mirror logs into this file
/// - AUTHSWEEP_DOMAIN: Default domain for bare usernames
/// - AUTHSWEEP_KDC_HOST: Kerberos KDC host
/// - AUTHSWEEP_GFAIL_LIMIT / AUTHSWEEP_FAIL_LIMIT / AUTHSWEEP_UFAIL_LIMIT:
///   global, per-target and per-principal fail limits
pub fn load_from_env() -> Result<RunConfig> {
    let mut config = RunConfig::default();
    apply_env_overrides(&mut config)?;
    ConfigValidator::validate_run_config(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut RunConfig) -> Result<()> {
    if let Ok(log_level) = std::env::var("AUTHSWEEP_LOG_LEVEL") {
        config.observability.log_level = log_level;
    }

    if let Ok(log_file) = std::env::var("AUTHSWEEP_LOG_FILE") {
        config.observability.log_file = Some(PathBuf::from(log_file));
    }

    if let Ok(domain) = std::env::var("AUTHSWEEP_DOMAIN") {
        config.credentials.domain = Some(domain);
    }

    if let Ok(kdc_host) = std::env::var("AUTHSWEEP_KDC_HOST") {
        config.kerberos.kdc_host = Some(kdc_host);
    }

    if let Ok(limit) = std::env::var("AUTHSWEEP_GFAIL_LIMIT") {
        config.limits.global = Some(limit.parse().context("Invalid AUTHSWEEP_GFAIL_LIMIT")?);
    }

    if let Ok(limit) = std::env::var("AUTHSWEEP_FAIL_LIMIT") {
        config.limits.per_target = Some(limit.parse().context("Invalid AUTHSWEEP_FAIL_LIMIT")?);
    }

    if let Ok(limit) = std::env::var("AUTHSWEEP_UFAIL_LIMIT") {
        config.limits.per_principal = Some(limit.parse().context("Invalid AUTHSWEEP_UFAIL_LIMIT")?);
    }

    Ok(())
}
