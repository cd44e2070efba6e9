mod common;

use cloudgrid_registry::{
    CreateRequest, FirewallRule, Registry, RegistryError, SecurityGroup, SecurityGroupReq,
    VNetReq,
};
use common::{CONN, FakeProxy, NS};
use std::sync::Arc;

async fn setup() -> (Registry, Arc<FakeProxy>) {
    let (registry, proxy, _) = common::registry();
    registry
        .create(
            NS,
            CreateRequest::VNet(VNetReq {
                name: "vnet01".to_string(),
                connection_name: CONN.to_string(),
                cidr_block: "10.0.0.0/16".to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    registry
        .create(
            NS,
            CreateRequest::SecurityGroup(SecurityGroupReq {
                name: "sg01".to_string(),
                connection_name: CONN.to_string(),
                vnet_id: "vnet01".to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    (registry, proxy)
}

fn ssh_rule() -> FirewallRule {
    FirewallRule::new("22", "TCP", "inbound", "0.0.0.0/0")
}

/// Stored rules equal the proxy's set, compared in canonical form
async fn assert_in_sync(registry: &Registry, proxy: &FakeProxy) {
    let sg: SecurityGroup = registry.get_as(NS, "sg01").await.unwrap();
    let provider: Vec<FirewallRule> = proxy
        .rules_of("ns01-sg01")
        .iter()
        .map(FirewallRule::from_wire)
        .collect();
    assert_eq!(sg.firewall_rules, provider);
}

#[tokio::test]
async fn test_add_rule_to_empty_group_then_duplicate() {
    let (registry, proxy) = setup().await;

    let sg = registry.add_rules(NS, "sg01", &[ssh_rule()]).await.unwrap();
    assert_eq!(sg.firewall_rules, vec![ssh_rule()]);
    assert_in_sync(&registry, &proxy).await;

    // same rule again, in different casing
    let err = registry
        .add_rules(NS, "sg01", &[FirewallRule::new("22", "tcp", "INBOUND", "0.0.0.0/0")])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRule(_)));

    let sg: SecurityGroup = registry.get_as(NS, "sg01").await.unwrap();
    assert_eq!(sg.firewall_rules, vec![ssh_rule()]);
    assert_eq!(proxy.call_count("add_rules"), 1);
}

#[tokio::test]
async fn test_single_port_range_is_a_duplicate_of_the_port() {
    let (registry, proxy) = setup().await;
    registry.add_rules(NS, "sg01", &[ssh_rule()]).await.unwrap();

    let err = registry
        .add_rules(NS, "sg01", &[FirewallRule::new("22-22", "TCP", "inbound", "0.0.0.0/0")])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRule(_)));

    let sg: SecurityGroup = registry.get_as(NS, "sg01").await.unwrap();
    assert_eq!(sg.firewall_rules, vec![ssh_rule()]);
    assert_eq!(proxy.call_count("add_rules"), 1);
}

#[tokio::test]
async fn test_duplicate_anywhere_rejects_whole_batch() {
    let (registry, proxy) = setup().await;
    registry.add_rules(NS, "sg01", &[ssh_rule()]).await.unwrap();

    let batch = [
        FirewallRule::new("80", "TCP", "inbound", "0.0.0.0/0"),
        ssh_rule(),
    ];
    let err = registry.add_rules(NS, "sg01", &batch).await.unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRule(_)));
    assert_eq!(proxy.rules_of("ns01-sg01").len(), 1);

    // duplicates inside one batch are rejected too
    let http = FirewallRule::new("80", "TCP", "inbound", "0.0.0.0/0");
    let err = registry
        .add_rules(NS, "sg01", &[http.clone(), http])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRule(_)));
}

#[tokio::test]
async fn test_delete_rules_removes_only_matches() {
    let (registry, proxy) = setup().await;
    let rules = [
        ssh_rule(),
        FirewallRule::new("80-90", "TCP", "inbound", "0.0.0.0/0"),
        FirewallRule::new("-1", "ICMP", "inbound", "10.0.0.0/8"),
    ];
    registry.add_rules(NS, "sg01", &rules).await.unwrap();

    let targets = [
        FirewallRule::new("80-90", "tcp", "inbound", "0.0.0.0/0"),
        FirewallRule::new("443", "TCP", "inbound", "0.0.0.0/0"),
    ];
    let sg = registry.delete_rules(NS, "sg01", &targets).await.unwrap();

    assert_eq!(
        sg.firewall_rules,
        vec![ssh_rule(), FirewallRule::new("-1", "ICMP", "inbound", "10.0.0.0/8")]
    );
    assert_in_sync(&registry, &proxy).await;
}

#[tokio::test]
async fn test_delete_unknown_rule_fails() {
    let (registry, proxy) = setup().await;
    registry.add_rules(NS, "sg01", &[ssh_rule()]).await.unwrap();

    let err = registry
        .delete_rules(NS, "sg01", &[FirewallRule::new("3389", "TCP", "inbound", "0.0.0.0/0")])
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::RuleNotFound(_)));
    assert_eq!(proxy.call_count("remove_rules"), 0);
}

#[tokio::test]
async fn test_provider_failure_leaves_stored_rules() {
    let (registry, proxy) = setup().await;
    proxy.fail_on("add_rules");

    let err = registry.add_rules(NS, "sg01", &[ssh_rule()]).await.unwrap_err();
    assert!(matches!(err, RegistryError::Provider(_)));

    let sg: SecurityGroup = registry.get_as(NS, "sg01").await.unwrap();
    assert!(sg.firewall_rules.is_empty());
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let (registry, _) = setup().await;
    let err = registry.add_rules(NS, "sg99", &[ssh_rule()]).await.unwrap_err();
    assert!(err.is_not_found());
}
