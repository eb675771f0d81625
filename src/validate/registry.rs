//! Rules for the Docker registry and NFS shares

use std::collections::HashSet;

use super::cluster::file_exists;
use super::{Validate, Validator};
use crate::error::{ValidationError, ValidationErrors};
use crate::plan::{DockerRegistry, Nfs};

impl Validate for DockerRegistry {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        let has_address = !self.address.is_empty();
        let has_ca = !self.ca.is_empty();

        if self.setup_internal && (has_address || has_ca) {
            v.add_error(ValidationError::exclusive(
                "Cannot setup internal registry when DockerRegistry address or CA is provided",
            ));
        }
        if !has_address && has_ca {
            v.add_error(ValidationError::missing(
                "Docker Registry address cannot be empty when CA is provided",
            ));
        }
        if has_address && !crate::port_in_range(self.port) {
            v.add_error(ValidationError::invalid(format!(
                "Docker Registry port {} is invalid. Port must be in the range {}-{}",
                self.port,
                crate::MIN_PORT,
                crate::MAX_PORT
            )));
        }
        if has_address && !has_ca {
            v.add_error(ValidationError::missing(
                "Docker Registry CA cannot be empty when registry address is provided",
            ));
        }
        if has_ca && !file_exists(&self.ca) {
            v.add_error(ValidationError::invalid(format!(
                "Docker Registry CA file was not found at {:?}",
                self.ca
            )));
        }
        v.finish()
    }
}

impl Validate for Nfs {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        let mut seen = HashSet::new();
        for volume in &self.volumes {
            if !seen.insert(volume) {
                v.add_error(ValidationError::duplicate(format!(
                    "Duplicate NFS volume {}",
                    volume
                )));
            }
        }
        v.finish()
    }
}
