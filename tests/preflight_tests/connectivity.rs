//! Stories about probing a plan's nodes over SSH

use install_preflight::plan::{SshConnection, Node};
use install_preflight::{
    validate_plan_ssh_connections, validate_ssh_connection, ProbeConfig, ValidationError,
};

use super::helpers::{parse_plan, plan_yaml, CountingSshClient, Workspace};

/// Story: every node answers, so the probe passes
///
/// Nodes shared between groups are only probed once.
#[tokio::test]
async fn story_reachable_cluster_passes() {
    let ws = Workspace::new();
    let plan = parse_plan(&plan_yaml(&ws.write_key("id_ed25519")));
    let client = CountingSshClient::default();

    let result = validate_plan_ssh_connections(&plan, &client, &ProbeConfig::default()).await;

    assert!(result.is_ok());
    assert_eq!(client.attempts(), 5);
    let mut probed = client.probed.lock().unwrap().clone();
    probed.sort();
    assert_eq!(
        probed,
        vec!["10.0.0.1", "10.0.0.11", "10.0.0.12", "10.0.0.2", "10.0.0.3"]
    );
}

/// Story: two workers are down
///
/// Each unreachable address yields exactly one error, in plan order.
#[tokio::test]
async fn story_each_unreachable_node_is_reported_once() {
    let ws = Workspace::new();
    let plan = parse_plan(&plan_yaml(&ws.write_key("id_ed25519")));
    let client = CountingSshClient::unreachable(&["10.0.0.12", "10.0.0.2"]);

    let errors = validate_plan_ssh_connections(&plan, &client, &ProbeConfig::default())
        .await
        .unwrap_err();

    assert_eq!(client.attempts(), 5);
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e, ValidationError::Connectivity(_))));
    let msgs: Vec<_> = errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        msgs,
        vec![
            "Node Connection: SSH connectivity validation failed for \"10.0.0.2\": command failed: ssh - Connection timed out",
            "Node Connection: SSH connectivity validation failed for \"10.0.0.12\": command failed: ssh - Connection timed out",
        ]
    );
}

/// Story: the operator's key has a passphrase
///
/// The installer cannot use it unattended, so no node is contacted at all.
#[tokio::test]
async fn story_encrypted_key_stops_before_any_connection() {
    let ws = Workspace::new();
    let plan = parse_plan(&plan_yaml(&ws.write_key("id_ed25519_passphrase")));
    let client = CountingSshClient::default();

    let errors = validate_plan_ssh_connections(&plan, &client, &ProbeConfig::default())
        .await
        .unwrap_err();

    assert_eq!(client.attempts(), 0);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.errors()[0], ValidationError::KeyFormat(_)));
    assert!(errors.errors()[0]
        .message()
        .starts_with("Node Connection: error parsing SSH key: "));
}

/// Story: a key file that is not a private key at all
#[tokio::test]
async fn story_public_key_in_place_of_private_key() {
    let ws = Workspace::new();
    let key = ws.write_file("id_rsa.pub", "ssh-rsa AAAAB3NzaC1yc2E user@host\n");
    let connection = SshConnection {
        ssh_config: parse_plan(&plan_yaml(&key)).cluster.ssh,
        node: Node::new("worker03", "10.0.0.13"),
    };
    let client = CountingSshClient::default();

    let errors = validate_ssh_connection(&connection, "New worker", &client, &ProbeConfig::default())
        .await
        .unwrap_err();

    assert_eq!(client.attempts(), 0);
    assert!(errors.errors()[0]
        .message()
        .starts_with("New worker: error parsing SSH key: invalid private key"));
}

/// Story: the key file was truncated while being copied to the installer host
///
/// The damage is caught by the key check, so the operator sees one key error
/// instead of every node reported as unreachable.
#[tokio::test]
async fn story_truncated_key_stops_before_any_connection() {
    let ws = Workspace::new();
    let full = std::fs::read_to_string(ws.write_key("id_ed25519")).unwrap();
    let block = pem::parse(&full).unwrap();
    let truncated = &block.contents()[..block.contents().len() / 2];
    let key = ws.write_file(
        "id_truncated",
        &pem::encode(&pem::Pem::new("OPENSSH PRIVATE KEY", truncated.to_vec())),
    );
    let plan = parse_plan(&plan_yaml(&key));
    let client = CountingSshClient::default();

    let errors = validate_plan_ssh_connections(&plan, &client, &ProbeConfig::default())
        .await
        .unwrap_err();

    assert_eq!(client.attempts(), 0);
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.errors()[0], ValidationError::KeyFormat(_)));
    assert!(errors.errors()[0]
        .message()
        .starts_with("Node Connection: error parsing SSH key: invalid private key"));
}
