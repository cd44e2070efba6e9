//! Security group and firewall rules

use super::{KeyValue, key_values};
use crate::error::{RegistryError, Result};
use cloudgrid_proxy::SecurityRuleInfo;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub connection_name: String,
    pub vnet_id: String,
    pub csp_resource_name: String,
    pub csp_resource_id: String,

    /// Mirrors the proxy's authoritative rule set after every mutation
    pub firewall_rules: Vec<FirewallRule>,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupReq {
    pub name: String,
    pub connection_name: String,
    pub vnet_id: String,
    #[serde(default)]
    pub firewall_rules: Vec<FirewallRule>,
    #[serde(default)]
    pub description: String,
}

/// One firewall rule. Two rules are duplicates iff all four fields are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    /// `"22"`, `"1-65535"`, or `"-1"` for protocols without ports
    pub port: String,

    /// TCP, UDP, ICMP or ALL (uppercase once normalized)
    pub protocol: String,

    /// inbound or outbound (lowercase once normalized)
    pub direction: String,

    pub cidr: String,
}

impl fmt::Display for FirewallRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} {}",
            self.direction, self.protocol, self.port, self.cidr
        )
    }
}

const PROTOCOLS: [&str; 4] = ["TCP", "UDP", "ICMP", "ALL"];
const DIRECTIONS: [&str; 2] = ["inbound", "outbound"];

impl FirewallRule {
    pub fn new(
        port: impl Into<String>,
        protocol: impl Into<String>,
        direction: impl Into<String>,
        cidr: impl Into<String>,
    ) -> Self {
        Self {
            port: port.into(),
            protocol: protocol.into(),
            direction: direction.into(),
            cidr: cidr.into(),
        }
    }

    /// Uppercase protocol, lowercase direction, trimmed fields, validated values
    pub fn normalized(&self) -> Result<Self> {
        let rule = Self {
            port: canonical_port(&self.port),
            protocol: self.protocol.trim().to_uppercase(),
            direction: self.direction.trim().to_lowercase(),
            cidr: self.cidr.trim().to_string(),
        };

        if !PROTOCOLS.contains(&rule.protocol.as_str()) {
            return Err(RegistryError::InvalidArgument(format!(
                "unsupported protocol '{}' (expected one of {:?})",
                self.protocol, PROTOCOLS
            )));
        }
        if !DIRECTIONS.contains(&rule.direction.as_str()) {
            return Err(RegistryError::InvalidArgument(format!(
                "unsupported direction '{}' (expected inbound or outbound)",
                self.direction
            )));
        }
        if rule.cidr.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "firewall rule CIDR must not be empty".to_string(),
            ));
        }
        validate_port(&rule.port)?;

        Ok(rule)
    }

    /// `(from, to)` as the proxy expects them
    fn port_bounds(&self) -> (String, String) {
        match self.port.split_once('-') {
            Some((from, to)) if !from.is_empty() => (from.to_string(), to.to_string()),
            _ => (self.port.clone(), self.port.clone()),
        }
    }

    pub fn to_wire(&self) -> SecurityRuleInfo {
        let (from_port, to_port) = self.port_bounds();
        SecurityRuleInfo {
            from_port,
            to_port,
            ip_protocol: self.protocol.clone(),
            direction: self.direction.clone(),
            cidr: self.cidr.clone(),
        }
    }

    /// Canonical rule from the proxy's representation.
    ///
    /// Provider casing varies, so the result is normalized without validation.
    pub fn from_wire(info: &SecurityRuleInfo) -> Self {
        Self {
            port: join_port(&info.from_port, &info.to_port),
            protocol: info.ip_protocol.trim().to_uppercase(),
            direction: info.direction.trim().to_lowercase(),
            cidr: info.cidr.trim().to_string(),
        }
    }
}

/// `"22-22"` and `" 80 - 90 "` become `"22"` and `"80-90"`; `"-1"` is left alone
fn canonical_port(port: &str) -> String {
    match port.split_once('-') {
        Some((from, to)) if !from.trim().is_empty() => join_port(from, to),
        _ => port.trim().to_string(),
    }
}

fn join_port(from: &str, to: &str) -> String {
    let (from, to) = (from.trim(), to.trim());
    if from == to || to.is_empty() {
        from.to_string()
    } else {
        format!("{}-{}", from, to)
    }
}

fn validate_port(port: &str) -> Result<()> {
    if port.is_empty() || port == "-1" {
        return Ok(());
    }

    let invalid = || RegistryError::InvalidArgument(format!("invalid port range '{}'", port));
    let parse = |s: &str| s.parse::<u16>().map_err(|_| invalid());

    match port.split_once('-') {
        Some((from, to)) => {
            if parse(from)? > parse(to)? {
                return Err(invalid());
            }
        }
        None => {
            parse(port)?;
        }
    }
    Ok(())
}

impl SecurityGroup {
    /// Replace the stored rules with the proxy's authoritative list
    pub(crate) fn apply_provider(&mut self, info: &cloudgrid_proxy::SecurityInfo) {
        self.csp_resource_name = info.iid.name_id.clone();
        self.csp_resource_id = info.iid.system_id.clone();
        self.firewall_rules = info.security_rules.iter().map(FirewallRule::from_wire).collect();
        self.key_value_list = key_values(&info.key_value_list);
    }
}
