//! cgctl assoc

use super::print_json;
use crate::AssocCommands;
use anyhow::bail;
use cloudgrid_registry::{AssociationOp, Registry, ResourceKind};

pub async fn handle(registry: &Registry, ns: &str, action: AssocCommands) -> anyhow::Result<()> {
    match action {
        AssocCommands::Count { kind, id, vnet } => {
            let count = if kind == ResourceKind::Subnet {
                let vnet = require_vnet(vnet)?;
                registry
                    .get_subnet(ns, &vnet, &id)
                    .await?
                    .associated_object_list
                    .len()
            } else {
                registry.get_associated_object_count(ns, kind, &id).await?
            };
            print_json(&serde_json::json!({ "count": count }))
        }
        AssocCommands::Add {
            kind,
            id,
            consumer,
            vnet,
        } => update(registry, ns, kind, &id, vnet, AssociationOp::Add, &consumer).await,
        AssocCommands::Remove {
            kind,
            id,
            consumer,
            vnet,
        } => update(registry, ns, kind, &id, vnet, AssociationOp::Delete, &consumer).await,
    }
}

async fn update(
    registry: &Registry,
    ns: &str,
    kind: ResourceKind,
    id: &str,
    vnet: Option<String>,
    op: AssociationOp,
    consumer: &str,
) -> anyhow::Result<()> {
    let list = if kind == ResourceKind::Subnet {
        let vnet = require_vnet(vnet)?;
        registry
            .update_subnet_associated_object_list(ns, &vnet, id, op, consumer)
            .await?
    } else {
        registry
            .update_associated_object_list(ns, kind, id, op, consumer)
            .await?
    };
    print_json(&list)
}

fn require_vnet(vnet: Option<String>) -> anyhow::Result<String> {
    match vnet {
        Some(vnet) => Ok(vnet),
        None => bail!("--vnet is required for subnets"),
    }
}
