//! Plan validation
//!
//! Every plan substructure implements [`Validate`]. Parents build a
//! [`Validator`], feed it their own findings and their children's results, and
//! return the merged outcome. A failing child never stops its siblings from
//! running, so one pass reports every problem in the plan.
//!
//! The entry points at the bottom of this module are what callers use:
//! [`validate_plan`], [`validate_node`], [`validate_plan_ssh_connections`],
//! [`validate_ssh_connection`], [`validate_certificates`] and
//! [`validate_storage_volume`]. Each returns `Ok(())` when valid, otherwise
//! every problem found in the order the checks ran.

mod cluster;
mod format;
mod nodes;
mod registry;
mod storage;

use tracing::info;

use crate::error::{ValidationError, ValidationErrors};
use crate::pki::CertificateValidator;
use crate::plan::{Node, Plan, SshConnection, StorageVolume};
use crate::probe::{self, ConnectionSet, ProbeConfig};
use crate::ssh::SshClient;

pub use format::{parse_cidr, parse_duration, parse_ip};
pub use storage::validate_allowed_address;

/// Principals whose certificates are checked alongside the node certificates
pub const CERTIFICATE_PRINCIPALS: &[&str] = &["admin"];

/// Prefix applied to reachability failures of a whole plan
pub const NODE_CONNECTION_PREFIX: &str = "Node Connection";

/// Something that can report whether its current state is valid
pub trait Validate {
    /// Check this value, returning every problem found
    fn validate(&self) -> Result<(), ValidationErrors>;
}

impl<T: Validate + ?Sized> Validate for &T {
    fn validate(&self) -> Result<(), ValidationErrors> {
        (**self).validate()
    }
}

/// Error accumulator threaded through nested validation
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationError>,
}

impl Validator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single problem
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record several problems, keeping their order
    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Run `obj`'s checks and keep its errors verbatim
    pub fn validate(&mut self, obj: &(impl Validate + ?Sized)) {
        self.merge(obj.validate());
    }

    /// Run `obj`'s checks and label each error with `prefix`
    pub fn validate_with_prefix(&mut self, prefix: &str, obj: &(impl Validate + ?Sized)) {
        self.merge_with_prefix(prefix, obj.validate());
    }

    /// Run the checks of every object in `objs`, labelling errors with `prefix`
    pub fn validate_each_with_prefix<I>(&mut self, prefix: &str, objs: I)
    where
        I: IntoIterator,
        I::Item: Validate,
    {
        for obj in objs {
            self.validate_with_prefix(prefix, &obj);
        }
    }

    /// Keep the errors of an already computed result
    pub fn merge(&mut self, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            self.add_errors(errors);
        }
    }

    /// Keep the errors of an already computed result, labelled with `prefix`
    pub fn merge_with_prefix(&mut self, prefix: &str, result: Result<(), ValidationErrors>) {
        if let Err(errors) = result {
            self.add_errors(errors.into_iter().map(|e| e.with_prefix(prefix)));
        }
    }

    /// True while no problem has been recorded
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The final verdict
    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ValidationErrors::new(self.errors))
        }
    }
}

impl Validate for Plan {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();

        v.validate(&self.cluster);
        v.validate(&self.docker_registry);
        v.validate_with_prefix("Etcd nodes", &self.etcd);
        v.validate_with_prefix("Master nodes", &self.master);
        v.validate_with_prefix("Worker nodes", &self.worker);
        v.validate_with_prefix("Ingress nodes", &self.ingress);
        v.validate(&self.nfs);
        v.validate_with_prefix("Storage nodes", &self.storage);
        for volume in &self.storage_volumes {
            v.validate_with_prefix(&format!("Storage volume {:?}", volume.name), volume);
        }

        v.finish()
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Validate the user input of an installation plan
pub fn validate_plan(plan: &Plan) -> Result<(), ValidationErrors> {
    let result = plan.validate();
    info!(
        cluster = %plan.cluster.name,
        nodes = plan.all_nodes().len(),
        errors = result.as_ref().err().map_or(0, ValidationErrors::len),
        "plan validated"
    );
    result
}

/// Validate a single node, e.g. one being added to an existing cluster
pub fn validate_node(node: &Node) -> Result<(), ValidationErrors> {
    let mut v = Validator::new();
    v.validate(node);
    v.finish()
}

/// Probe every distinct node of the plan over SSH
pub async fn validate_plan_ssh_connections<C: SshClient + ?Sized>(
    plan: &Plan,
    client: &C,
    config: &ProbeConfig,
) -> Result<(), ValidationErrors> {
    let set = ConnectionSet::new(plan.cluster.ssh.clone(), plan.unique_node_ips());
    info!(nodes = set.addresses.len(), "validating SSH connectivity");

    let mut v = Validator::new();
    v.merge_with_prefix(
        NODE_CONNECTION_PREFIX,
        probe::probe_connections(client, &set, config).await,
    );
    v.finish()
}

/// Probe a single node over SSH, labelling any failure with `prefix`
pub async fn validate_ssh_connection<C: SshClient + ?Sized>(
    connection: &SshConnection,
    prefix: &str,
    client: &C,
    config: &ProbeConfig,
) -> Result<(), ValidationErrors> {
    let set = ConnectionSet::new(
        connection.ssh_config.clone(),
        vec![connection.node.ip.clone()],
    );

    let mut v = Validator::new();
    v.merge_with_prefix(prefix, probe::probe_connections(client, &set, config).await);
    v.finish()
}

/// Check the cluster certificates, reporting errors first and then warnings
///
/// Warnings are reported as failures too; the caller decides whether to
/// continue.
pub fn validate_certificates<P: CertificateValidator + ?Sized>(
    plan: &Plan,
    pki: &P,
) -> Result<(), ValidationErrors> {
    let report = pki.validate_cluster_certificates(plan, CERTIFICATE_PRINCIPALS);

    let mut v = Validator::new();
    v.add_errors(report.errors);
    v.add_errors(report.warnings);
    v.finish()
}

/// Validate the attributes of a storage volume
pub fn validate_storage_volume(volume: &StorageVolume) -> Result<(), ValidationErrors> {
    volume.validate()
}
