//! Firewall rule reconciliation
//!
//! Rule mutations go to the proxy first. Afterwards the group is re-fetched
//! and the stored rule list is overwritten with the proxy's set, so local
//! state never diverges from what the provider reports.

use crate::error::{RegistryError, Result};
use crate::model::{FirewallRule, Resource, ResourceKind, SecurityGroup};
use crate::registry::{Registry, normalize_pair};
use cloudgrid_proxy::SecurityRuleInfo;
use cloudgrid_store::resource_key;
use tracing::{debug, info};

impl Registry {
    /// Add rules to a security group.
    ///
    /// The whole batch is rejected with `DuplicateRule` if any candidate equals
    /// an existing rule or another candidate.
    #[tracing::instrument(skip(self, rules), fields(count = rules.len()))]
    pub async fn add_rules(
        &self,
        ns: &str,
        sg_id: &str,
        rules: &[FirewallRule],
    ) -> Result<SecurityGroup> {
        let (ns, sg_id) = normalize_pair(ns, sg_id)?;
        if rules.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "at least one firewall rule is required".to_string(),
            ));
        }
        let candidates = rules
            .iter()
            .map(FirewallRule::normalized)
            .collect::<Result<Vec<_>>>()?;

        let key = resource_key(&ns, ResourceKind::SecurityGroup.as_str(), &sg_id);
        let _guard = self.locks.lock(&key).await;
        let sg: SecurityGroup = self.load_as(&key, &sg_id).await?;

        for (i, candidate) in candidates.iter().enumerate() {
            if sg.firewall_rules.contains(candidate) || candidates[..i].contains(candidate) {
                return Err(RegistryError::DuplicateRule(candidate.to_string()));
            }
        }

        let wire: Vec<SecurityRuleInfo> = candidates.iter().map(FirewallRule::to_wire).collect();
        self.proxy
            .add_rules(&sg.connection_name, &sg.csp_resource_name, &wire)
            .await?;

        let sg = self.refresh_rules(&key, sg).await?;
        info!(ns = %ns, id = %sg_id, added = candidates.len(), total = sg.firewall_rules.len(), "Added firewall rules");
        Ok(sg)
    }

    /// Remove rules from a security group.
    ///
    /// Targets are matched field-wise; only the matched subset is sent to the
    /// proxy. Fails with `RuleNotFound` when nothing matches.
    #[tracing::instrument(skip(self, rules), fields(count = rules.len()))]
    pub async fn delete_rules(
        &self,
        ns: &str,
        sg_id: &str,
        rules: &[FirewallRule],
    ) -> Result<SecurityGroup> {
        let (ns, sg_id) = normalize_pair(ns, sg_id)?;
        if rules.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "at least one firewall rule is required".to_string(),
            ));
        }
        let targets = rules
            .iter()
            .map(FirewallRule::normalized)
            .collect::<Result<Vec<_>>>()?;

        let key = resource_key(&ns, ResourceKind::SecurityGroup.as_str(), &sg_id);
        let _guard = self.locks.lock(&key).await;
        let sg: SecurityGroup = self.load_as(&key, &sg_id).await?;

        let mut matched: Vec<&FirewallRule> = Vec::new();
        for target in &targets {
            if sg.firewall_rules.contains(target) && !matched.contains(&target) {
                matched.push(target);
            } else {
                debug!(rule = %target, "No stored rule matches");
            }
        }
        if matched.is_empty() {
            let wanted: Vec<String> = targets.iter().map(ToString::to_string).collect();
            return Err(RegistryError::RuleNotFound(wanted.join(", ")));
        }

        let wire: Vec<SecurityRuleInfo> = matched.iter().map(|r| r.to_wire()).collect();
        self.proxy
            .remove_rules(&sg.connection_name, &sg.csp_resource_name, &wire)
            .await?;

        let removed = matched.len();
        let sg = self.refresh_rules(&key, sg).await?;
        info!(ns = %ns, id = %sg_id, removed, total = sg.firewall_rules.len(), "Deleted firewall rules");
        Ok(sg)
    }

    /// Overwrite the stored group with the proxy's current view.
    ///
    /// Caller holds the key lock.
    async fn refresh_rules(&self, key: &str, mut sg: SecurityGroup) -> Result<SecurityGroup> {
        let info = self
            .proxy
            .get_security_group(&sg.connection_name, &sg.csp_resource_name)
            .await?;
        sg.apply_provider(&info);
        self.put(key, &Resource::SecurityGroup(sg.clone())).await?;
        Ok(sg)
    }
}
