//! cgctl resource

use super::{done, print_json};
use crate::ResourceCommands;
use anyhow::Context;
use cloudgrid_registry::{CreateRequest, Registry, RegistryError};
use colored::Colorize;

pub async fn handle(registry: &Registry, ns: &str, action: ResourceCommands) -> anyhow::Result<()> {
    match action {
        ResourceCommands::Create { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let request: CreateRequest = serde_json::from_str(&content)
                .with_context(|| format!("invalid create request in {}", file.display()))?;

            let resource = registry.create(ns, request).await?;
            done(format!("Created {} '{}'", resource.kind(), resource.id()));
            print_json(&resource.to_json()?)
        }
        ResourceCommands::Check { kind, id } => {
            let exists = registry.check_resource(ns, kind, &id).await?;
            print_json(&serde_json::json!({ "exists": exists }))
        }
        ResourceCommands::Get { kind, id } => {
            let resource = registry.get(ns, kind, &id).await?;
            print_json(&resource.to_json()?)
        }
        ResourceCommands::List { kind, ids } => {
            if ids {
                return print_json(&registry.list_ids(ns, kind).await?);
            }
            let values = registry
                .list(ns, kind)
                .await?
                .iter()
                .map(|r| r.to_json())
                .collect::<Result<Vec<_>, _>>()?;
            print_json(&values)
        }
        ResourceCommands::Delete { kind, id, force } => {
            registry.delete(ns, kind, &id, force).await?;
            done(format!("Deleted {} '{}'", kind, id));
            Ok(())
        }
        ResourceCommands::DeleteAll { kind, force } => match registry.delete_all(ns, kind, force).await {
            Ok(report) => {
                done(format!("Deleted {} {}(s)", report.deleted.len(), kind));
                print_json(&report)
            }
            Err(RegistryError::DeleteAllAborted {
                deleted,
                failed_id,
                source,
                ..
            }) => {
                eprintln!(
                    "{} Stopped at {} '{}' after deleting {} resource(s)",
                    "✗".red(),
                    kind,
                    failed_id,
                    deleted.len()
                );
                print_json(&serde_json::json!({ "deleted": deleted, "failedId": failed_id }))?;
                Err(anyhow::Error::from(*source).context(format!("delete-all {} aborted", kind)))
            }
            Err(e) => Err(e.into()),
        },
    }
}
