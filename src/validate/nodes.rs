//! Rules for node topology

use super::format::parse_ip;
use super::{Validate, Validator};
use crate::error::{ValidationError, ValidationErrors};
use crate::plan::{MasterNodeGroup, Node, NodeGroup, OptionalNodeGroup};

fn count_mismatch(expected: i64, actual: usize) -> ValidationError {
    ValidationError::count_mismatch(format!(
        "Expected node count ({}) does not match the number of nodes provided ({})",
        expected, actual
    ))
}

impl Validate for NodeGroup {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.nodes.is_empty() {
            v.add_error(ValidationError::missing("At least one node is required"));
        }
        if self.expected_count <= 0 {
            v.add_error(ValidationError::count_mismatch(
                "Node count must be greater than 0",
            ));
        }
        if !self.nodes.is_empty()
            && self.expected_count > 0
            && self.nodes.len() as i64 != self.expected_count
        {
            v.add_error(count_mismatch(self.expected_count, self.nodes.len()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            v.validate_with_prefix(&format!("Node #{}", i + 1), node);
        }
        v.finish()
    }
}

impl Validate for OptionalNodeGroup {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.is_absent() {
            return Ok(());
        }
        // Reported on its own: the regular group rules would add confusing
        // follow-ups such as "at least one node is required".
        if self.nodes.len() as i64 != self.expected_count {
            return Err(count_mismatch(self.expected_count, self.nodes.len()).into());
        }
        self.0.validate()
    }
}

impl Validate for MasterNodeGroup {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.validate(&self.group);
        if self.load_balanced_fqdn.is_empty() {
            v.add_error(ValidationError::missing("Load balanced FQDN is required"));
        }
        if self.load_balanced_short_name.is_empty() {
            v.add_error(ValidationError::missing(
                "Load balanced shortname is required",
            ));
        }
        v.finish()
    }
}

impl Validate for Node {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.host.is_empty() {
            v.add_error(ValidationError::missing("Node host field is required"));
        }
        if self.ip.is_empty() {
            v.add_error(ValidationError::missing("Node IP field is required"));
        }
        if parse_ip(&self.ip).is_none() {
            v.add_error(ValidationError::invalid("Invalid IP provided"));
        }
        if !self.internal_ip.is_empty() && parse_ip(&self.internal_ip).is_none() {
            v.add_error(ValidationError::invalid("Invalid InternalIP provided"));
        }
        v.finish()
    }
}
