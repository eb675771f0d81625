//! Rules for storage volumes

use std::sync::LazyLock;

use regex::Regex;

use super::{Validate, Validator};
use crate::error::{ValidationError, ValidationErrors};
use crate::plan::StorageVolume;

/// Characters a volume name may not contain (the space is part of the set)
const DISALLOWED_NAME_CHARS: &str = ": / \\ & < > |";

/// Four dot-separated groups of one to three digits or wildcards
static ADDRESS_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9*]{1,3}\.[0-9*]{1,3}\.[0-9*]{1,3}\.[0-9*]{1,3}$")
        .expect("valid address pattern")
});

impl Validate for StorageVolume {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        if self.name.contains(|c: char| DISALLOWED_NAME_CHARS.contains(c)) {
            v.add_error(ValidationError::invalid(format!(
                "Volume name may not contain spaces or any of the following characters: {:?}",
                DISALLOWED_NAME_CHARS
            )));
        }
        if self.size_gb < 1 {
            v.add_error(ValidationError::invalid("Volume size must be 1GB or larger"));
        }
        if self.distribution_count < 1 {
            v.add_error(ValidationError::invalid(
                "Distribution count must be greater than zero",
            ));
        }
        if self.replicate_count < 1 {
            v.add_error(ValidationError::invalid(
                "Replication count must be greater than zero",
            ));
        }
        for address in &self.allow_addresses {
            if !validate_allowed_address(address) {
                v.add_error(ValidationError::invalid(format!(
                    "Invalid address {:?} in the list of allowed addresses",
                    address
                )));
            }
        }
        v.finish()
    }
}

/// Check an allowed-address pattern such as `10.10.*.*`
///
/// The shape is gated by a regex, then every octet is re-checked on its own:
/// it must be `*` or a base-10 number in 0-255. This rejects octets like
/// `1*` or `999` that the shape alone lets through.
pub fn validate_allowed_address(address: &str) -> bool {
    if !ADDRESS_SHAPE.is_match(address) {
        return false;
    }
    address.split('.').all(|octet| {
        octet == "*" || octet.parse::<u16>().is_ok_and(|n| n <= 255)
    })
}
