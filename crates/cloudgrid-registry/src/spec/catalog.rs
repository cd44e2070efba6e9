//! Bulk spec import and catalog maintenance

use crate::error::{RegistryError, Result};
use crate::model::{Resource, ResourceKind, Spec, SpecUpdate};
use crate::registry::{Registry, normalize_pair, spec_id};
use cloudgrid_store::resource_key;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One connection (or one spec under it) that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    pub connection_name: String,
    pub error: String,
}

/// Outcome of [`Registry::fetch_specs`]; partial success is normal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchReport {
    /// Spec ids written, in import order
    pub registered: Vec<String>,
    pub failed: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Registry {
    /// Import every spec each connection offers.
    ///
    /// Connections are processed one after another and a failing connection
    /// does not stop the rest. Existing entries are refreshed in place; their
    /// consumers and pricing survive the refresh.
    #[tracing::instrument(skip(self, connections), fields(connections = connections.len()))]
    pub async fn fetch_specs(&self, ns: &str, connections: &[String]) -> Result<FetchReport> {
        let ns = crate::naming::normalize_id(ns)?;
        let mut report = FetchReport::default();

        for connection in connections {
            match self.fetch_connection_specs(&ns, connection, &mut report).await {
                Ok(count) => info!(ns = %ns, connection = %connection, count, "Fetched specs"),
                Err(e) => {
                    warn!(ns = %ns, connection = %connection, "Spec fetch failed: {}", e);
                    report.failed.push(FetchFailure {
                        connection_name: connection.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    async fn fetch_connection_specs(
        &self,
        ns: &str,
        connection: &str,
        report: &mut FetchReport,
    ) -> Result<usize> {
        let config = self.proxy.get_connection_config(connection).await?;
        let infos = self.proxy.list_specs(connection).await?;

        let mut count = 0;
        for info in &infos {
            let id = match spec_id(connection, &info.name) {
                Ok(id) => id,
                Err(e) => {
                    report.failed.push(FetchFailure {
                        connection_name: connection.to_string(),
                        error: format!("spec '{}': {}", info.name, e),
                    });
                    continue;
                }
            };

            let key = resource_key(ns, ResourceKind::Spec.as_str(), &id);
            let _guard = self.locks.lock(&key).await;

            let mut spec = Spec::from_provider(&id, connection, &config, info);
            if let Some(Resource::Spec(existing)) = self.load(ResourceKind::Spec, &key).await? {
                spec.associated_object_list = existing.associated_object_list;
                spec.cost_per_hour = existing.cost_per_hour;
                spec.evaluation_score = existing.evaluation_score;
                spec.description = existing.description;
                spec.os_type = existing.os_type;
            }

            self.put(&key, &Resource::Spec(spec)).await?;
            report.registered.push(id);
            count += 1;
        }

        Ok(count)
    }

    /// Rewrite the mutable attributes of a registered spec
    pub async fn update_spec(&self, ns: &str, id: &str, update: &SpecUpdate) -> Result<Spec> {
        let (ns, id) = normalize_pair(ns, id)?;
        for (name, value) in [
            ("costPerHour", update.cost_per_hour),
            ("evaluationScore", update.evaluation_score),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(RegistryError::InvalidArgument(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        let key = resource_key(&ns, ResourceKind::Spec.as_str(), &id);
        let _guard = self.locks.lock(&key).await;

        let mut spec: Spec = self.load_as(&key, &id).await?;
        spec.apply_update(update);
        self.put(&key, &Resource::Spec(spec.clone())).await?;

        info!(ns = %ns, id = %id, "Updated spec");
        Ok(spec)
    }
}
