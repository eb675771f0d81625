//! Shared fixtures for the pre-flight integration tests

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use install_preflight::plan::Plan;
use install_preflight::ssh::{check_unencrypted, SshClient};
use install_preflight::Error;
use tempfile::TempDir;

/// Scratch directory holding the SSH key and the plan's other files
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    /// Copy the key fixture `name` into the workspace and return its path
    pub fn write_key(&self, name: &str) -> String {
        let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/keys")
            .join(name);
        let path = self.dir.path().join(name);
        std::fs::copy(&fixture, &path).unwrap();
        path.to_str().unwrap().to_string()
    }

    pub fn write_file(&self, name: &str, contents: &str) -> String {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path.to_str().unwrap().to_string()
    }
}

/// Render the installer plan used across stories with the given key path
pub fn plan_yaml(key: &str) -> String {
    format!(
        r#"
cluster:
  name: kubernetes
  admin_password: secret
  networking:
    type: overlay
    pod_cidr_block: 172.16.0.0/16
    service_cidr_block: 172.20.0.0/16
  certificates:
    expiry: 17520h
  ssh:
    user: ubuntu
    ssh_key: {key}
    ssh_port: 22
docker_registry:
  setup_internal: true
etcd:
  expected_count: 3
  nodes:
  - host: node01
    ip: 10.0.0.1
  - host: node02
    ip: 10.0.0.2
  - host: node03
    ip: 10.0.0.3
master:
  expected_count: 2
  nodes:
  - host: node01
    ip: 10.0.0.1
  - host: node02
    ip: 10.0.0.2
  load_balanced_fqdn: master.example.com
  load_balanced_short_name: master
worker:
  expected_count: 2
  nodes:
  - host: worker01
    ip: 10.0.0.11
  - host: worker02
    ip: 10.0.0.12
nfs:
  nfs_volume:
  - nfs_host: 10.0.0.50
    mount_path: /exports
storage_volumes:
- name: data
  size_gb: 100
  replicate_count: 2
  distribution_count: 1
  allow_ip:
  - 10.0.*.*
"#
    )
}

pub fn parse_plan(yaml: &str) -> Plan {
    serde_yaml::from_str(yaml).unwrap()
}

/// SSH client that inspects real key files and fakes connections
///
/// Connections to addresses in `unreachable` fail; every attempt is counted.
#[derive(Default)]
pub struct CountingSshClient {
    pub unreachable: HashSet<String>,
    pub attempts: AtomicUsize,
    pub probed: Mutex<Vec<String>>,
}

impl CountingSshClient {
    pub fn unreachable(addresses: &[&str]) -> Self {
        Self {
            unreachable: addresses.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SshClient for CountingSshClient {
    async fn validate_unencrypted_key(&self, key: &Path) -> Result<(), Error> {
        check_unencrypted(key).await
    }

    async fn test_connection(
        &self,
        ip: &str,
        _port: i64,
        _user: &str,
        _key: &Path,
    ) -> Result<(), Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(ip.to_string());
        if self.unreachable.contains(ip) {
            return Err(Error::command("ssh", "Connection timed out"));
        }
        Ok(())
    }
}
