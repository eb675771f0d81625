//! Supporting types for the installation plan

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

/// Cluster-wide settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Cluster {
    /// Cluster name
    pub name: String,

    /// Password for the cluster admin user
    pub admin_password: String,

    /// Pod and service networking
    pub networking: NetworkConfig,

    /// Certificate settings
    pub certificates: CertsConfig,

    /// Credentials used to reach every node
    pub ssh: SshConfig,
}

/// Pod and service network configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Networking mode, `routed` or `overlay`
    #[serde(rename = "type")]
    pub type_: String,

    /// CIDR block pods are allocated from
    pub pod_cidr_block: String,

    /// CIDR block services are allocated from
    pub service_cidr_block: String,
}

/// Certificate settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CertsConfig {
    /// Validity of generated certificates, as a duration string (e.g. `17520h`)
    pub expiry: String,
}

/// SSH credentials for reaching the nodes
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SshConfig {
    /// Remote user
    pub user: String,

    /// Absolute path to an unencrypted private key
    #[serde(rename = "ssh_key")]
    pub key: String,

    /// SSH port; signed so out-of-range input is reported instead of rejected
    #[serde(rename = "ssh_port")]
    pub port: i64,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            key: String::new(),
            port: crate::DEFAULT_SSH_PORT,
        }
    }
}

/// A single machine in the cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct Node {
    /// Hostname
    pub host: String,

    /// Address the installer connects to
    pub ip: String,

    /// Address used for cluster-internal traffic, when different from `ip`
    #[serde(rename = "internalip", skip_serializing_if = "String::is_empty")]
    pub internal_ip: String,
}

impl Node {
    /// Create a node with a host and IP
    pub fn new(host: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ip: ip.into(),
            internal_ip: String::new(),
        }
    }
}

/// A required group of nodes with an expected size
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NodeGroup {
    /// Number of nodes the user says the group has
    pub expected_count: i64,

    /// The nodes, in the order they were listed
    pub nodes: Vec<Node>,
}

impl NodeGroup {
    /// Create a group whose expected count matches the nodes given
    pub fn with_nodes(nodes: Vec<Node>) -> Self {
        Self {
            expected_count: nodes.len() as i64,
            nodes,
        }
    }

    /// True when the group lists no nodes and expects none
    pub fn is_absent(&self) -> bool {
        self.nodes.is_empty() && self.expected_count == 0
    }
}

/// A node group that may be left out of the plan entirely
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct OptionalNodeGroup(pub NodeGroup);

impl Deref for OptionalNodeGroup {
    type Target = NodeGroup;

    fn deref(&self) -> &NodeGroup {
        &self.0
    }
}

impl DerefMut for OptionalNodeGroup {
    fn deref_mut(&mut self) -> &mut NodeGroup {
        &mut self.0
    }
}

impl From<NodeGroup> for OptionalNodeGroup {
    fn from(group: NodeGroup) -> Self {
        Self(group)
    }
}

/// Master nodes, fronted by a load balancer
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MasterNodeGroup {
    /// Count and node list
    #[serde(flatten)]
    pub group: NodeGroup,

    /// Fully qualified name of the API server load balancer
    pub load_balanced_fqdn: String,

    /// Short name of the API server load balancer
    pub load_balanced_short_name: String,
}

/// Docker registry used by the cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DockerRegistry {
    /// Stand up a registry inside the cluster
    pub setup_internal: bool,

    /// Address of an existing registry
    pub address: String,

    /// Port of an existing registry
    pub port: i64,

    /// Path to the CA certificate of an existing registry
    #[serde(alias = "CA")]
    pub ca: String,
}

/// NFS shares made available to the cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Nfs {
    /// Shares, each of which must be unique
    #[serde(rename = "nfs_volume")]
    pub volumes: Vec<NfsVolume>,
}

/// A single NFS share
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct NfsVolume {
    /// NFS server
    pub nfs_host: String,

    /// Exported path
    pub mount_path: String,
}

impl std::fmt::Display for NfsVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.nfs_host, self.mount_path)
    }
}

/// A storage volume to create on the storage nodes
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StorageVolume {
    /// Volume name
    pub name: String,

    /// Size in gigabytes
    pub size_gb: i64,

    /// Number of replicas of each brick
    pub replicate_count: i64,

    /// Number of bricks data is distributed over
    pub distribution_count: i64,

    /// Address patterns allowed to mount the volume, e.g. `10.10.*.*`
    #[serde(rename = "allow_ip", skip_serializing_if = "Vec::is_empty")]
    pub allow_addresses: Vec<String>,
}

/// The details needed to reach one node over SSH
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SshConnection {
    /// Credentials
    pub ssh_config: SshConfig,

    /// Target node
    pub node: Node,
}
