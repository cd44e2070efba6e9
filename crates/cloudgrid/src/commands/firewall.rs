//! cgctl sg

use super::{done, print_json};
use crate::{RuleArgs, SgCommands};
use cloudgrid_registry::{FirewallRule, Registry};

impl From<RuleArgs> for FirewallRule {
    fn from(args: RuleArgs) -> Self {
        FirewallRule::new(args.port, args.protocol, args.direction, args.cidr)
    }
}

pub async fn handle(registry: &Registry, ns: &str, action: SgCommands) -> anyhow::Result<()> {
    match action {
        SgCommands::AddRule { sg, rule } => {
            let rule = FirewallRule::from(rule);
            let group = registry.add_rules(ns, &sg, &[rule.clone()]).await?;
            done(format!("Added rule '{}' to '{}'", rule, group.id));
            print_json(&group.firewall_rules)
        }
        SgCommands::DeleteRule { sg, rule } => {
            let rule = FirewallRule::from(rule);
            let group = registry.delete_rules(ns, &sg, &[rule.clone()]).await?;
            done(format!("Deleted rule '{}' from '{}'", rule, group.id));
            print_json(&group.firewall_rules)
        }
    }
}
