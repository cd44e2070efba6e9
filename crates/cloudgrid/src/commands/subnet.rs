//! cgctl subnet

use super::{done, print_json};
use crate::SubnetCommands;
use cloudgrid_registry::{Registry, SubnetReq};

pub async fn handle(registry: &Registry, ns: &str, action: SubnetCommands) -> anyhow::Result<()> {
    match action {
        SubnetCommands::Create {
            vnet,
            name,
            cidr,
            zone,
            description,
        } => {
            let req = SubnetReq {
                name,
                ipv4_cidr: cidr,
                zone,
                description,
            };
            let subnet = registry.create_subnet(ns, &vnet, req).await?;
            done(format!("Created subnet '{}' in vNet '{}'", subnet.id, vnet));
            print_json(&subnet)
        }
        SubnetCommands::Get { vnet, id } => print_json(&registry.get_subnet(ns, &vnet, &id).await?),
        SubnetCommands::List { vnet } => print_json(&registry.list_subnets(ns, &vnet).await?),
        SubnetCommands::Delete { vnet, id, force } => {
            registry.delete_subnet(ns, &vnet, &id, force).await?;
            done(format!("Deleted subnet '{}' from vNet '{}'", id, vnet));
            Ok(())
        }
    }
}
