//! Rules for cluster-wide settings

use std::path::Path;

use super::format::{parse_cidr, parse_duration};
use super::{Validate, Validator};
use crate::error::{ValidationError, ValidationErrors};
use crate::plan::{CertsConfig, Cluster, NetworkConfig, SshConfig};

/// Networking modes the installer can set up
const NETWORK_TYPES: &[&str] = &["routed", "overlay"];

impl Validate for Cluster {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.name.is_empty() {
            v.add_error(ValidationError::missing("Cluster name cannot be empty"));
        }
        if self.admin_password.is_empty() {
            v.add_error(ValidationError::missing("Admin password cannot be empty"));
        }
        v.validate(&self.networking);
        v.validate(&self.certificates);
        v.validate(&self.ssh);
        v.finish()
    }
}

impl Validate for NetworkConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.type_.is_empty() {
            v.add_error(ValidationError::missing("Networking type cannot be empty"));
        }
        if !NETWORK_TYPES.contains(&self.type_.as_str()) {
            v.add_error(ValidationError::invalid(format!(
                "Invalid networking type {:?} was provided",
                self.type_
            )));
        }
        check_cidr(&mut v, "Pod", &self.pod_cidr_block);
        check_cidr(&mut v, "Service", &self.service_cidr_block);
        v.finish()
    }
}

fn check_cidr(v: &mut Validator, label: &str, block: &str) {
    if block.is_empty() {
        v.add_error(ValidationError::missing(format!(
            "{} CIDR block cannot be empty",
            label
        )));
        return;
    }
    if let Err(e) = parse_cidr(block) {
        v.add_error(ValidationError::invalid(format!(
            "Invalid {} CIDR block provided: {}",
            label, e
        )));
    }
}

impl Validate for CertsConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if let Err(e) = parse_duration(&self.expiry) {
            v.add_error(ValidationError::invalid(format!(
                "Invalid certificate expiry {:?} provided: {}",
                self.expiry, e
            )));
        }
        v.finish()
    }
}

impl Validate for SshConfig {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.user.is_empty() {
            v.add_error(ValidationError::missing("SSH user field is required"));
        }
        if self.key.is_empty() {
            v.add_error(ValidationError::missing("SSH key field is required"));
        }
        if !file_exists(&self.key) {
            v.add_error(ValidationError::invalid(format!(
                "SSH Key file was not found at {:?}",
                self.key
            )));
        }
        if !Path::new(&self.key).is_absolute() {
            v.add_error(ValidationError::invalid(
                "SSH Key field must be an absolute path",
            ));
        }
        if !crate::port_in_range(self.port) {
            v.add_error(ValidationError::invalid(format!(
                "SSH port {} is invalid. Port must be in the range {}-{}",
                self.port,
                crate::MIN_PORT,
                crate::MAX_PORT
            )));
        }
        v.finish()
    }
}

/// True unless the path is known not to exist
///
/// Permission errors count as existing; reading the file is the job of a
/// later check.
pub(super) fn file_exists(path: &str) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}
