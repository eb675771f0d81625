//! Stories about checking a plan file before installation

use install_preflight::plan::Plan;
use install_preflight::{
    validate_allowed_address, validate_node, validate_plan, ValidationError,
};

use super::helpers::{parse_plan, plan_yaml, Workspace};

fn messages(plan: &Plan) -> Vec<String> {
    match validate_plan(plan) {
        Ok(()) => vec![],
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    }
}

/// Story: an operator writes a consistent plan and it passes
#[test]
fn story_consistent_plan_passes() {
    let ws = Workspace::new();
    let key = ws.write_key("id_ed25519");

    let plan = parse_plan(&plan_yaml(&key));

    assert_eq!(validate_plan(&plan), Ok(()));
}

/// Story: an operator lists fewer etcd nodes than they asked for
///
/// The count mismatch is reported under the group's label, never silently
/// accepted.
#[test]
fn story_missing_etcd_node_is_a_count_mismatch() {
    let ws = Workspace::new();
    let key = ws.write_key("id_ed25519");
    let mut plan = parse_plan(&plan_yaml(&key));
    plan.etcd.nodes.pop();

    let errors = validate_plan(&plan).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.errors()[0], ValidationError::CountMismatch(_)));
    assert_eq!(
        errors.to_string(),
        "Etcd nodes: Expected node count (3) does not match the number of nodes provided (2)"
    );
}

/// Story: one pass reports problems in every section of the plan
#[test]
fn story_all_problems_reported_at_once() {
    let ws = Workspace::new();
    let key = ws.write_key("id_ed25519");
    let ca = ws.write_file("registry-ca.pem", "ca");
    let mut plan = parse_plan(&plan_yaml(&key));

    plan.cluster.networking.pod_cidr_block = "172.16.0.0".to_string();
    plan.docker_registry.address = "registry.local".to_string();
    plan.docker_registry.port = 443;
    plan.docker_registry.ca = ca;
    plan.worker.nodes[1].ip = "worker02.local".to_string();
    plan.nfs.volumes.push(plan.nfs.volumes[0].clone());
    plan.storage_volumes[0].allow_addresses.push("10.0.0".to_string());

    assert_eq!(
        messages(&plan),
        vec![
            "Invalid Pod CIDR block provided: invalid CIDR address: 172.16.0.0",
            "Cannot setup internal registry when DockerRegistry address or CA is provided",
            "Worker nodes: Node #2: Invalid IP provided",
            "Duplicate NFS volume 10.0.0.50:/exports",
            "Storage volume \"data\": Invalid address \"10.0.0\" in the list of allowed addresses",
        ]
    );
}

/// Story: optional groups left out of the plan are never a problem
#[test]
fn story_optional_groups_can_be_omitted() {
    let ws = Workspace::new();
    let key = ws.write_key("id_ed25519");
    let plan = parse_plan(&plan_yaml(&key));

    assert!(plan.ingress.is_absent());
    assert!(plan.storage.is_absent());
    assert!(validate_plan(&plan).is_ok());
}

/// Story: a node being added later is checked on its own
#[test]
fn story_single_node_check() {
    let node = install_preflight::plan::Node::new("worker03", "10.0.0.13");
    assert!(validate_node(&node).is_ok());

    let bad = install_preflight::plan::Node::new("worker03", "10.0.0");
    assert_eq!(
        validate_node(&bad).unwrap_err().to_string(),
        "Invalid IP provided"
    );
}

#[test]
fn allowed_address_patterns() {
    assert!(validate_allowed_address("192.168.*.1"));
    assert!(!validate_allowed_address("192.168.1"));
    assert!(!validate_allowed_address("999.1.1.1"));
}
