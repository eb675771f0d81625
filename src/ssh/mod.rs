//! SSH primitives used by the reachability prober
//!
//! [`SshClient`] is the seam between the prober and the network. The real
//! implementation, [`OpenSshClient`], inspects keys locally and shells out
//! to the system `ssh` binary for connection tests.

mod key;

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::process::Command;
use tracing::debug;

use crate::error::Error;
use crate::probe::ProbeConfig;

pub use key::check_unencrypted;

/// Operations the prober needs from an SSH implementation
///
/// This trait abstracts the SSH transport for testability.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SshClient: Send + Sync {
    /// Fail unless the key can be used without a passphrase
    async fn validate_unencrypted_key(&self, key: &Path) -> Result<(), Error>;

    /// Open a session to `user@ip:port` with `key` and close it again
    async fn test_connection(&self, ip: &str, port: i64, user: &str, key: &Path)
        -> Result<(), Error>;
}

// =============================================================================
// Real Implementation
// =============================================================================

/// [`SshClient`] backed by the OpenSSH command-line client
#[derive(Debug, Clone)]
pub struct OpenSshClient {
    binary: String,
    connect_timeout: Duration,
}

impl OpenSshClient {
    /// Create a client using the binary and timeout from `config`
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            binary: config.ssh_binary.clone(),
            connect_timeout: config.connect_timeout,
        }
    }

    fn command(&self, ip: &str, port: i64, user: &str, key: &Path) -> Command {
        let connect_secs = self.connect_timeout.as_secs().max(1);
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-o", "BatchMode=yes"])
            .arg("-o")
            .arg(format!("ConnectTimeout={}", connect_secs))
            .args(["-o", "StrictHostKeyChecking=no"])
            .args(["-o", "UserKnownHostsFile=/dev/null"])
            .args(["-o", "LogLevel=ERROR"])
            .arg("-i")
            .arg(key)
            .arg("-p")
            .arg(port.to_string())
            .arg(format!("{}@{}", user, ip))
            .arg("exit")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SshClient for OpenSshClient {
    async fn validate_unencrypted_key(&self, key: &Path) -> Result<(), Error> {
        check_unencrypted(key).await
    }

    async fn test_connection(
        &self,
        ip: &str,
        port: i64,
        user: &str,
        key: &Path,
    ) -> Result<(), Error> {
        let mut cmd = self.command(ip, port, user, key);
        debug!(command = ?cmd.as_std(), "Executing ssh");

        let output = tokio::time::timeout(self.connect_timeout, cmd.output())
            .await
            .map_err(|_| Error::Timeout(self.connect_timeout))?
            .map_err(|e| Error::command(&self.binary, format!("failed to execute: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                s => s.to_string(),
            };
            return Err(Error::command(&self.binary, message));
        }
        Ok(())
    }
}
