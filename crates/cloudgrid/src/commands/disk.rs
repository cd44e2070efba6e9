//! cgctl disk

use super::{done, print_json};
use crate::DiskCommands;
use cloudgrid_registry::Registry;

pub async fn handle(registry: &Registry, ns: &str, action: DiskCommands) -> anyhow::Result<()> {
    match action {
        DiskCommands::Upsize { id, size } => {
            let disk = registry.upsize_data_disk(ns, &id, size).await?;
            done(format!("Upsized '{}' to {}GB", disk.id, disk.disk_size));
            print_json(&disk)
        }
    }
}
