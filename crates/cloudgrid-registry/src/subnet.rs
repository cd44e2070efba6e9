//! Subnet child operations
//!
//! Every mutation holds the parent VNet's key lock, so the VNet record and
//! the subnet child keys are written under one guard.

use crate::error::{RegistryError, Result};
use crate::model::{Resource, ResourceKind, Subnet, SubnetReq, VNet};
use crate::naming::{csp_resource_name, normalize_id};
use crate::registry::{Registry, normalize_pair};
use cloudgrid_proxy::{ProxyError, SubnetReqInfo};
use cloudgrid_store::{child_kind_prefix, child_resource_key, remainder_is_leaf, resource_key};
use tracing::{info, warn};

pub(crate) fn subnet_key(ns: &str, vnet_id: &str, subnet_id: &str) -> String {
    child_resource_key(
        ns,
        ResourceKind::VNet.as_str(),
        vnet_id,
        ResourceKind::Subnet.as_str(),
        subnet_id,
    )
}

pub(crate) fn vnet_key(ns: &str, vnet_id: &str) -> String {
    resource_key(ns, ResourceKind::VNet.as_str(), vnet_id)
}

impl Registry {
    /// Whether subnet `subnet_id` exists under VNet `vnet_id`
    pub async fn check_child_resource(
        &self,
        ns: &str,
        vnet_id: &str,
        subnet_id: &str,
    ) -> Result<bool> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        let subnet_id = normalize_id(subnet_id)?;
        self.exists(&subnet_key(&ns, &vnet_id, &subnet_id)).await
    }

    #[tracing::instrument(skip(self, req), fields(subnet = %req.name))]
    pub async fn create_subnet(&self, ns: &str, vnet_id: &str, req: SubnetReq) -> Result<Subnet> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        let subnet_id = normalize_id(&req.name)?;
        if req.ipv4_cidr.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "ipv4Cidr must not be empty".to_string(),
            ));
        }

        let parent_key = vnet_key(&ns, &vnet_id);
        let _guard = self.locks.lock(&parent_key).await;

        let mut vnet: VNet = self.load_as(&parent_key, &vnet_id).await?;
        let child_key = subnet_key(&ns, &vnet_id, &subnet_id);
        if vnet.subnet(&subnet_id).is_some() || self.exists(&child_key).await? {
            return Err(RegistryError::already_exists(ResourceKind::Subnet, subnet_id));
        }

        let csp_name = csp_resource_name(&ns, &subnet_id);
        let wire = SubnetReqInfo {
            name: csp_name.clone(),
            ipv4_cidr: req.ipv4_cidr.trim().to_string(),
            zone: req.zone.trim().to_string(),
        };
        let info = self
            .proxy
            .add_subnet(&vnet.connection_name, &vnet.csp_resource_name, &wire)
            .await?;

        let provider_subnet = info
            .subnet_info_list
            .iter()
            .find(|s| s.iid.name_id == csp_name)
            .ok_or_else(|| {
                ProxyError::InvalidResponse(format!(
                    "subnet '{}' missing from add-subnet response",
                    csp_name
                ))
            })?;
        let subnet = Subnet::from_provider(&subnet_id, &vnet, &req.description, provider_subnet);

        self.put(&child_key, &Resource::Subnet(subnet.clone())).await?;
        vnet.upsert_subnet(subnet.clone());
        self.put(&parent_key, &Resource::VNet(vnet)).await?;

        info!(ns = %ns, vnet = %vnet_id, id = %subnet_id, "Created subnet");
        Ok(subnet)
    }

    pub async fn get_subnet(&self, ns: &str, vnet_id: &str, subnet_id: &str) -> Result<Subnet> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        let subnet_id = normalize_id(subnet_id)?;

        if !self.exists(&vnet_key(&ns, &vnet_id)).await? {
            return Err(RegistryError::not_found(ResourceKind::VNet, vnet_id));
        }
        self.load_as(&subnet_key(&ns, &vnet_id, &subnet_id), &subnet_id)
            .await
    }

    pub async fn list_subnets(&self, ns: &str, vnet_id: &str) -> Result<Vec<Subnet>> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        if !self.exists(&vnet_key(&ns, &vnet_id)).await? {
            return Err(RegistryError::not_found(ResourceKind::VNet, vnet_id));
        }

        let prefix = child_kind_prefix(
            &ns,
            ResourceKind::VNet.as_str(),
            &vnet_id,
            ResourceKind::Subnet.as_str(),
        );
        self.store
            .list_by_prefix(&prefix)
            .await?
            .into_iter()
            .filter(|kv| remainder_is_leaf(&prefix, &kv.key))
            .map(|kv| serde_json::from_str::<Subnet>(&kv.value).map_err(RegistryError::from))
            .collect()
    }

    /// Delete one subnet. Same association and provider-first rules as
    /// [`Registry::delete`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_subnet(
        &self,
        ns: &str,
        vnet_id: &str,
        subnet_id: &str,
        force: bool,
    ) -> Result<()> {
        let (ns, vnet_id) = normalize_pair(ns, vnet_id)?;
        let subnet_id = normalize_id(subnet_id)?;

        let parent_key = vnet_key(&ns, &vnet_id);
        let _guard = self.locks.lock(&parent_key).await;

        let mut vnet: VNet = self.load_as(&parent_key, &vnet_id).await?;
        let child_key = subnet_key(&ns, &vnet_id, &subnet_id);
        let subnet: Subnet = self.load_as(&child_key, &subnet_id).await?;

        let in_use = subnet.associated_object_list.len();
        if in_use > 0 {
            if !force {
                return Err(RegistryError::InUse {
                    kind: ResourceKind::Subnet,
                    id: subnet_id,
                    count: in_use,
                });
            }
            warn!(ns = %ns, vnet = %vnet_id, id = %subnet_id, in_use, "Force-deleting subnet that is still in use");
        }

        self.proxy
            .remove_subnet(
                &vnet.connection_name,
                &vnet.csp_resource_name,
                &subnet.csp_resource_name,
            )
            .await?;

        self.store.delete(&child_key).await?;
        vnet.subnet_info_list.retain(|s| s.id != subnet_id);
        self.put(&parent_key, &Resource::VNet(vnet)).await?;

        info!(ns = %ns, vnet = %vnet_id, id = %subnet_id, "Deleted subnet");
        Ok(())
    }
}
