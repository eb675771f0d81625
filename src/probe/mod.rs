//! Concurrent SSH reachability prober
//!
//! The key is checked once, locally, before anything touches the network.
//! After that every address gets exactly one connection attempt; all attempts
//! run concurrently and each is bounded by the configured timeout. Outcomes
//! are collected back in input order.

use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::{Error, ValidationError, ValidationErrors};
use crate::plan::SshConfig;
use crate::ssh::SshClient;
use crate::validate::Validator;

/// Environment variable overriding the per-attempt timeout, in seconds
pub const TIMEOUT_ENV: &str = "PREFLIGHT_SSH_TIMEOUT_SECS";

/// Environment variable overriding the `ssh` binary
pub const SSH_BINARY_ENV: &str = "PREFLIGHT_SSH_BINARY";

/// Prober settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound on a single connection attempt
    pub connect_timeout: Duration,
    /// Program used by [`crate::ssh::OpenSshClient`]
    pub ssh_binary: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connect_timeout: crate::DEFAULT_SSH_CONNECT_TIMEOUT,
            ssh_binary: "ssh".to_string(),
        }
    }
}

impl ProbeConfig {
    /// Defaults, overridden by `PREFLIGHT_SSH_TIMEOUT_SECS` and `PREFLIGHT_SSH_BINARY`
    ///
    /// Unset, empty, or unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(secs) = lookup(TIMEOUT_ENV)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
        {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(binary) = lookup(SSH_BINARY_ENV).filter(|v| !v.trim().is_empty()) {
            config.ssh_binary = binary;
        }
        config
    }
}

/// Credentials plus the addresses to probe with them
#[derive(Debug, Clone)]
pub struct ConnectionSet {
    /// User, key, and port shared by every attempt
    pub ssh: SshConfig,
    /// Target addresses, already deduplicated
    pub addresses: Vec<String>,
}

impl ConnectionSet {
    /// Create a set probing `addresses` with `ssh`
    pub fn new(ssh: SshConfig, addresses: Vec<String>) -> Self {
        Self { ssh, addresses }
    }
}

/// Probe every address in `set`, returning one error per unreachable address
pub async fn probe_connections<C: SshClient + ?Sized>(
    client: &C,
    set: &ConnectionSet,
    config: &ProbeConfig,
) -> Result<(), ValidationErrors> {
    let key = Path::new(&set.ssh.key);
    if let Err(e) = client.validate_unencrypted_key(key).await {
        warn!(key = %set.ssh.key, error = %e, "SSH key rejected, skipping connection attempts");
        return Err(ValidationError::key_format(format!("error parsing SSH key: {}", e)).into());
    }

    let attempts = set
        .addresses
        .iter()
        .map(|ip| attempt(client, &set.ssh, ip, config.connect_timeout));
    let outcomes = join_all(attempts).await;

    let mut v = Validator::new();
    for (ip, outcome) in set.addresses.iter().zip(outcomes) {
        if let Err(e) = outcome {
            warn!(ip = %ip, error = %e, "SSH connectivity check failed");
            v.add_error(ValidationError::connectivity(format!(
                "SSH connectivity validation failed for {:?}: {}",
                ip, e
            )));
        }
    }

    let result = v.finish();
    info!(
        addresses = set.addresses.len(),
        unreachable = result.as_ref().err().map_or(0, ValidationErrors::len),
        "SSH probe finished"
    );
    result
}

async fn attempt<C: SshClient + ?Sized>(
    client: &C,
    ssh: &SshConfig,
    ip: &str,
    limit: Duration,
) -> Result<(), Error> {
    debug!(ip, port = ssh.port, user = %ssh.user, "Probing SSH connectivity");
    let connect = client.test_connection(ip, ssh.port, &ssh.user, Path::new(&ssh.key));
    match tokio::time::timeout(limit, connect).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(limit)),
    }
}
