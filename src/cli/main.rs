// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * authsweep - Network Authentication Sweeper
 * Standalone CLI driving one connection lifecycle per target
 *
 * Features:
 * - Password spraying and paired credential checks
 * - Global, per-target and per-principal fail limits
 * - Credentials from arguments, files or a JSON credential store
 * - Post-authentication modules and protocol actions
 *
 * (c) 2026 Bountyy Oy
 */

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

use authsweep::config::{load_from_env, ConfigLoader, ConfigValidator, JitterRange, RunConfig};
use authsweep::connection::Connection;
use authsweep::credentials::expand_source;
use authsweep::database::{CredentialStore, InMemoryCredentialStore, JsonCredentialStore};
use authsweep::modules::ModuleRegistry;
use authsweep::registry::ProtocolRegistry;
use authsweep::scan_state::SharedScanState;

/// authsweep - Network Authentication Sweeper
#[derive(Parser, Debug)]
#[command(name = "authsweep")]
#[command(author = "Bountyy Oy <info@bountyy.fi>")]
#[command(version)]
#[command(about = "Sweep credentials across hosts under fail limits, then run modules.", long_about = None)]
struct Cli {
    /// Target hosts, or files with one host per line
    #[arg(required_unless_present_any = ["list_protocols", "list_modules"])]
    targets: Vec<String>,

    /// Protocol to authenticate with
    #[arg(short = 'P', long, default_value = "http_basic")]
    protocol: String,

    /// Username(s) or file(s) containing usernames (DOMAIN\user accepted)
    #[arg(short, long, num_args = 1..)]
    username: Vec<String>,

    /// Password(s) or file(s) containing passwords
    #[arg(short, long, num_args = 1..)]
    password: Vec<String>,

    /// NTLM hash(es) or file(s) containing NTLM hashes
    #[arg(short = 'H', long, num_args = 1..)]
    hash: Vec<String>,

    /// AES key(s) for Kerberos authentication
    #[arg(long = "aes-key", num_args = 1..)]
    aes_key: Vec<String>,

    /// Credential store id(s): an id, a range such as 3-7, or "all"
    #[arg(long = "cred-id", num_args = 1..)]
    cred_id: Vec<String>,

    /// Domain for usernames without one
    #[arg(short, long)]
    domain: Option<String>,

    /// Authenticate with Kerberos
    #[arg(short, long)]
    kerberos: bool,

    /// Authenticate with the local Kerberos credential cache
    #[arg(long)]
    use_kcache: bool,

    /// KDC host
    #[arg(long)]
    kdc_host: Option<String>,

    /// Random startup delay in seconds, "max" or "min-max"
    #[arg(long)]
    jitter: Option<JitterRange>,

    /// Max failed logins across all targets
    #[arg(long)]
    gfail_limit: Option<u32>,

    /// Max failed logins per target
    #[arg(long)]
    fail_limit: Option<u32>,

    /// Max failed logins per username
    #[arg(long)]
    ufail_limit: Option<u32>,

    /// Pair usernames and secrets by position instead of spraying
    #[arg(long)]
    no_bruteforce: bool,

    /// Keep going after a successful login
    #[arg(long)]
    continue_on_success: bool,

    /// Module(s) to run after authentication
    #[arg(short = 'M', long = "module")]
    module: Vec<String>,

    /// Module option KEY=VALUE, applied to every selected module
    #[arg(short = 'o', long = "module-option")]
    module_option: Vec<String>,

    /// Protocol option KEY=VALUE
    #[arg(long = "option")]
    protocol_option: Vec<String>,

    /// Protocol action NAME or NAME=VALUE, run when no module is selected
    #[arg(short, long)]
    action: Vec<String>,

    /// Port override
    #[arg(long)]
    port: Option<u16>,

    /// Configuration file (yaml, toml or json)
    #[arg(short, long, env = "AUTHSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// JSON credential store
    #[arg(long, env = "AUTHSWEEP_DB")]
    db: Option<PathBuf>,

    /// Mirror log output into this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// List available protocols
    #[arg(long)]
    list_protocols: bool,

    /// List available modules
    #[arg(long)]
    list_modules: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    init_logging(&cli, &config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus::get())
        .thread_name("authsweep")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli, config))
}

/// File config (or defaults plus environment), then command-line flags on top
fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::new(path)?.load_config()?,
        None => load_from_env()?,
    };

    let creds = &mut config.credentials;
    creds.usernames.extend(cli.username.iter().cloned());
    creds.passwords.extend(cli.password.iter().cloned());
    creds.hashes.extend(cli.hash.iter().cloned());
    creds.aes_keys.extend(cli.aes_key.iter().cloned());
    creds.cred_ids.extend(cli.cred_id.iter().cloned());
    if cli.domain.is_some() {
        creds.domain = cli.domain.clone();
    }

    config.kerberos.enabled |= cli.kerberos;
    config.kerberos.use_kcache |= cli.use_kcache;
    if cli.kdc_host.is_some() {
        config.kerberos.kdc_host = cli.kdc_host.clone();
    }

    if cli.jitter.is_some() {
        config.jitter = cli.jitter;
    }

    let limits = &mut config.limits;
    limits.global = cli.gfail_limit.or(limits.global);
    limits.per_target = cli.fail_limit.or(limits.per_target);
    limits.per_principal = cli.ufail_limit.or(limits.per_principal);

    config.bruteforce.no_bruteforce |= cli.no_bruteforce;
    config.bruteforce.continue_on_success |= cli.continue_on_success;

    config.modules.extend(cli.module.iter().cloned());
    let module_options = parse_key_values(&cli.module_option)?;
    if !module_options.is_empty() {
        for module in &config.modules {
            config
                .module_options
                .entry(module.clone())
                .or_default()
                .extend(module_options.clone());
        }
    }

    config
        .protocol_options
        .extend(parse_key_values(&cli.protocol_option)?);

    for action in &cli.action {
        let (name, value) = match action.split_once('=') {
            Some((name, value)) => (name, serde_json::Value::String(value.to_string())),
            None => (action.as_str(), serde_json::Value::Bool(true)),
        };
        config.actions.insert(name.to_string(), value);
    }

    if cli.port.is_some() {
        config.port = cli.port;
    }

    if cli.log.is_some() {
        config.observability.log_file = cli.log.clone();
    }
    config.observability.log_json |= cli.json_logs;

    ConfigValidator::validate_run_config(&config)?;
    Ok(config)
}

fn parse_key_values(pairs: &[String]) -> Result<HashMap<String, String>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("Expected KEY=VALUE, got '{}'", pair))
        })
        .collect()
}

fn init_logging(cli: &Cli, config: &RunConfig) -> Result<()> {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else if cli.verbose {
        EnvFilter::new("authsweep=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.observability.log_level))
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.observability.log_json {
        layers.push(tracing_subscriber::fmt::layer().json().boxed());
    } else {
        layers.push(tracing_subscriber::fmt::layer().with_target(false).boxed());
    }

    if let Some(path) = &config.observability.log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).with(filter).init();
    Ok(())
}

async fn async_main(cli: Cli, config: RunConfig) -> Result<()> {
    let protocols = ProtocolRegistry::new();
    let modules = ModuleRegistry::new();

    if cli.list_protocols {
        for metadata in protocols.get_all() {
            println!("{:<16} {:>5}  {}", metadata.name, metadata.default_port, metadata.description);
        }
        return Ok(());
    }

    if cli.list_modules {
        for name in modules.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let factory = protocols.factory(&cli.protocol)?;

    let store: Arc<dyn CredentialStore> = match &cli.db {
        Some(path) => Arc::new(JsonCredentialStore::open(path)?),
        None => Arc::new(InMemoryCredentialStore::new()),
    };
    let state = Arc::new(SharedScanState::new(store));

    let loaded = modules.load(&config.modules, &config.module_options);
    if config.module_mode() && loaded.is_empty() {
        warn!("No requested module could be loaded");
    }

    let mut hosts = Vec::new();
    for target in &cli.targets {
        hosts.extend(expand_source(target)?);
    }

    let config = Arc::new(config);
    let start = Instant::now();
    info!("Sweeping {} target(s) with {}", hosts.len(), cli.protocol);

    let mut handles = Vec::with_capacity(hosts.len());
    for host in hosts {
        let protocol = factory(&config)?;
        let connection = Connection::new(host, protocol, Arc::clone(&config), Arc::clone(&state))
            .with_modules(loaded.clone());
        handles.push(tokio::spawn(connection.run()));
    }

    let mut authenticated = 0;
    let mut admin = 0;
    for result in futures::future::join_all(handles).await {
        match result {
            Ok(report) => {
                authenticated += usize::from(report.authenticated);
                admin += usize::from(report.is_admin);
            }
            Err(e) => error!("Target task failed: {}", e),
        }
    }

    info!(
        "Done in {:.1}s: {} authenticated, {} with admin access",
        start.elapsed().as_secs_f64(),
        authenticated,
        admin
    );

    Ok(())
}
