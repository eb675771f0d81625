//! Installation plan data model
//!
//! The plan is the full declarative description of a cluster to install. It is
//! deserialized by the caller and only ever borrowed by the validator.

mod types;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub use types::{
    CertsConfig, Cluster, DockerRegistry, MasterNodeGroup, NetworkConfig, Nfs, NfsVolume, Node,
    NodeGroup, OptionalNodeGroup, SshConfig, SshConnection, StorageVolume,
};

/// The installation plan
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Plan {
    /// Cluster-wide settings
    pub cluster: Cluster,

    /// Docker registry settings
    pub docker_registry: DockerRegistry,

    /// etcd nodes
    pub etcd: NodeGroup,

    /// Master nodes
    pub master: MasterNodeGroup,

    /// Worker nodes
    pub worker: NodeGroup,

    /// Ingress nodes (optional)
    pub ingress: OptionalNodeGroup,

    /// Storage nodes (optional)
    pub storage: OptionalNodeGroup,

    /// NFS shares
    pub nfs: Nfs,

    /// Storage volumes to create
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub storage_volumes: Vec<StorageVolume>,
}

impl Plan {
    /// Every node in the plan, group by group (etcd, master, worker, ingress, storage)
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.etcd
            .nodes
            .iter()
            .chain(&self.master.group.nodes)
            .chain(&self.worker.nodes)
            .chain(&self.ingress.nodes)
            .chain(&self.storage.nodes)
            .collect()
    }

    /// Distinct node IPs in first-seen order
    ///
    /// A machine can play several roles; it is only probed once.
    pub fn unique_node_ips(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.all_nodes()
            .into_iter()
            .filter(|&n| seen.insert(n.ip.as_str()))
            .map(|n| n.ip.clone())
            .collect()
    }
}
