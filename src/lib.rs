//! install-preflight - pre-flight validation for cluster installation plans
//!
//! Before an installer touches any machine, the plan describing the cluster
//! (node topology, networking, certificates, SSH credentials, storage) is
//! checked for internal consistency, and every target node is probed over SSH.
//!
//! # Architecture
//!
//! - Every plan substructure implements [`validate::Validate`]
//! - A [`validate::Validator`] accumulates errors across nested checks, optionally
//!   labelling them with a prefix, and never stops at the first failure
//! - The [`probe`] module fans out one SSH attempt per node and joins the
//!   outcomes back in input order
//! - SSH and certificate primitives sit behind traits ([`ssh::SshClient`],
//!   [`pki::CertificateValidator`]) so they can be swapped in tests
//!
//! # Modules
//!
//! - [`plan`] - Installation plan data model
//! - [`validate`] - Accumulator, structural rules, and entry points
//! - [`probe`] - Concurrent SSH reachability prober
//! - [`ssh`] - SSH key inspection and connection testing
//! - [`pki`] - Cluster certificate validation
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```no_run
//! use install_preflight::plan::Plan;
//! use install_preflight::ssh::OpenSshClient;
//! use install_preflight::{validate_plan, validate_plan_ssh_connections, ProbeConfig};
//!
//! # async fn run(plan: Plan) {
//! if let Err(errors) = validate_plan(&plan) {
//!     for e in errors.iter() {
//!         eprintln!("- {e}");
//!     }
//!     return;
//! }
//!
//! let config = ProbeConfig::from_env();
//! let client = OpenSshClient::new(&config);
//! if let Err(errors) = validate_plan_ssh_connections(&plan, &client, &config).await {
//!     eprintln!("{errors}");
//! }
//! # }
//! ```

#![deny(missing_docs)]

pub mod error;
pub mod pki;
pub mod plan;
pub mod probe;
pub mod ssh;
pub mod validate;

pub use error::{Error, ValidationError, ValidationErrors};
pub use probe::ProbeConfig;
pub use validate::{
    validate_allowed_address, validate_certificates, validate_node, validate_plan,
    validate_plan_ssh_connections, validate_ssh_connection, validate_storage_volume, Validate,
    Validator,
};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================
// Shared by the plan defaults, the prober configuration, and test fixtures.

/// Default SSH port assumed when a plan omits one
pub const DEFAULT_SSH_PORT: i64 = 22;

/// Default per-attempt timeout for an SSH reachability probe
pub const DEFAULT_SSH_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Lowest valid TCP port
pub const MIN_PORT: i64 = 1;

/// Highest valid TCP port
pub const MAX_PORT: i64 = 65535;

/// Returns true if `port` is a usable TCP port
pub(crate) fn port_in_range(port: i64) -> bool {
    (MIN_PORT..=MAX_PORT).contains(&port)
}
