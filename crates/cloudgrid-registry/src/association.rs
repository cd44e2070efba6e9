//! Consumer bookkeeping that gates destructive operations

use crate::error::{RegistryError, Result};
use crate::model::{Resource, ResourceKind};
use crate::registry::{Registry, normalize_pair};
use crate::subnet::{subnet_key, vnet_key};
use cloudgrid_store::resource_key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Mutation applied to an associated-object list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationOp {
    /// Append unless already present
    Add,
    /// Remove the first exact match
    Delete,
}

impl fmt::Display for AssociationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssociationOp::Add => write!(f, "add"),
            AssociationOp::Delete => write!(f, "delete"),
        }
    }
}

impl FromStr for AssociationOp {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(AssociationOp::Add),
            "delete" | "remove" => Ok(AssociationOp::Delete),
            other => Err(RegistryError::InvalidArgument(format!(
                "unsupported association op '{}'",
                other
            ))),
        }
    }
}

pub(crate) fn apply_op(list: &mut Vec<String>, op: AssociationOp, consumer: &str) {
    match op {
        AssociationOp::Add => {
            if !list.iter().any(|c| c == consumer) {
                list.push(consumer.to_string());
            }
        }
        AssociationOp::Delete => {
            if let Some(pos) = list.iter().position(|c| c == consumer) {
                list.remove(pos);
            }
        }
    }
}

impl Registry {
    pub async fn get_associated_object_count(
        &self,
        ns: &str,
        kind: ResourceKind,
        id: &str,
    ) -> Result<usize> {
        Ok(self.get_associated_object_list(ns, kind, id).await?.len())
    }

    pub async fn get_associated_object_list(
        &self,
        ns: &str,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Vec<String>> {
        Ok(self.get(ns, kind, id).await?.associated_objects().to_vec())
    }

    /// Add or remove one consumer path; returns the resulting list
    pub async fn update_associated_object_list(
        &self,
        ns: &str,
        kind: ResourceKind,
        id: &str,
        op: AssociationOp,
        consumer: &str,
    ) -> Result<Vec<String>> {
        let (ns, id) = normalize_pair(ns, id)?;
        if kind.is_child() {
            return Err(RegistryError::InvalidArgument(format!(
                "{} associations are updated through their parent",
                kind
            )));
        }
        let consumer = non_empty_consumer(consumer)?;

        let key = resource_key(&ns, kind.as_str(), &id);
        let _guard = self.locks.lock(&key).await;

        let mut resource = self
            .load(kind, &key)
            .await?
            .ok_or_else(|| RegistryError::not_found(kind, id.clone()))?;

        apply_op(resource.associated_objects_mut(), op, consumer);
        self.put(&key, &resource).await?;

        info!(ns = %ns, kind = %kind, id = %id, op = %op, consumer, "Updated associations");
        Ok(resource.associated_objects().to_vec())
    }

    /// Subnet variant of [`Registry::update_associated_object_list`].
    ///
    /// Updates both the child record and the copy embedded in the VNet.
    pub async fn update_subnet_associated_object_list(
        &self,
        ns: &str,
        vnet_id: &str,
        subnet_id: &str,
        op: AssociationOp,
        consumer: &str,
    ) -> Result<Vec<String>> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        let subnet_id = crate::naming::normalize_id(subnet_id)?;
        let consumer = non_empty_consumer(consumer)?;

        let parent_key = vnet_key(&ns, &vnet_id);
        let _guard = self.locks.lock(&parent_key).await;

        let mut vnet: crate::model::VNet = self.load_as(&parent_key, &vnet_id).await?;
        let child_key = subnet_key(&ns, &vnet_id, &subnet_id);
        let mut subnet: crate::model::Subnet = self.load_as(&child_key, &subnet_id).await?;

        apply_op(&mut subnet.associated_object_list, op, consumer);
        let list = subnet.associated_object_list.clone();

        self.put(&child_key, &Resource::Subnet(subnet.clone())).await?;
        vnet.upsert_subnet(subnet);
        self.put(&parent_key, &Resource::VNet(vnet)).await?;

        debug!(ns = %ns, vnet = %vnet_id, id = %subnet_id, op = %op, consumer, "Updated subnet associations");
        Ok(list)
    }
}

fn non_empty_consumer(consumer: &str) -> Result<&str> {
    let consumer = consumer.trim();
    if consumer.is_empty() {
        return Err(RegistryError::InvalidArgument(
            "consumer path must not be empty".to_string(),
        ));
    }
    Ok(consumer)
}
