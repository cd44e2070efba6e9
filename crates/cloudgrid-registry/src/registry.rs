//! Resource registry: generic lifecycle for every resource kind

use crate::association::{AssociationOp, apply_op};
use crate::error::{RegistryError, Result};
use crate::lock::KeyedLocks;
use crate::model::{
    CreateRequest, DataDisk, DataDiskReq, Image, ImageReq, Resource, ResourceKind,
    ResourceObject, SecurityGroup, SecurityGroupReq, Spec, SpecReq, SshKey, SshKeyReq, Subnet,
    VNet, VNetReq,
};
use crate::naming::{csp_resource_name, normalize_id, to_naming_rule_compatible};
use crate::spec::RegionTable;
use crate::subnet::vnet_key;
use cloudgrid_proxy::{
    CspProxy, DiskReqInfo, KeyPairReqInfo, ProxyError, SecurityReqInfo, SubnetReqInfo, VpcReqInfo,
};
use cloudgrid_store::{KvStore, child_kind_prefix, kind_prefix, remainder_is_leaf, resource_key};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a successful [`Registry::delete_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAllReport {
    pub deleted: Vec<String>,
}

/// Namespace-scoped resource registry
///
/// Owns no global state: the store, proxy client and region table are handed
/// in at construction.
pub struct Registry {
    pub(crate) store: Arc<dyn KvStore>,
    pub(crate) proxy: Arc<dyn CspProxy>,
    pub(crate) locks: KeyedLocks,
    pub(crate) regions: RegionTable,
}

impl Registry {
    pub fn new(store: Arc<dyn KvStore>, proxy: Arc<dyn CspProxy>) -> Self {
        Self {
            store,
            proxy,
            locks: KeyedLocks::new(),
            regions: RegionTable::default(),
        }
    }

    /// Region coordinates used by locality scoring
    pub fn with_regions(mut self, regions: RegionTable) -> Self {
        self.regions = regions;
        self
    }

    // ------------------------------------------------------------------
    // Public lifecycle

    /// Whether `(ns, kind, id)` exists. Child kinds go through
    /// [`Registry::check_child_resource`].
    pub async fn check_resource(&self, ns: &str, kind: ResourceKind, id: &str) -> Result<bool> {
        let (ns, id) = normalize_pair(ns, id)?;
        ensure_top_level(kind)?;
        self.exists(&resource_key(&ns, kind.as_str(), &id)).await
    }

    /// Create a resource. The kind is carried by the request variant.
    ///
    /// A security group create holds its own key and then its vNet's key.
    #[tracing::instrument(skip(self, request), fields(kind = %request.kind(), id = request.name()))]
    pub async fn create(&self, ns: &str, request: CreateRequest) -> Result<Resource> {
        let kind = request.kind();
        let (ns, id) = normalize_pair(ns, request.name())?;
        if request.connection_name().trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "connectionName must not be empty".to_string(),
            ));
        }

        let key = resource_key(&ns, kind.as_str(), &id);
        let _guard = self.locks.lock(&key).await;

        if self.exists(&key).await? {
            return Err(RegistryError::already_exists(kind, id));
        }

        // held until the consumer link is written, so the vNet cannot be deleted in between
        let _vnet_guard = match &request {
            CreateRequest::SecurityGroup(req) => {
                let vnet_id = normalize_id(&req.vnet_id)?;
                Some(self.locks.lock(&vnet_key(&ns, &vnet_id)).await)
            }
            _ => None,
        };

        let resource: Resource = match request {
            CreateRequest::Image(req) => self.create_image(&id, &req).await?.into(),
            CreateRequest::Spec(req) => self.create_spec(&id, &req).await?.into(),
            CreateRequest::SshKey(req) => self.create_ssh_key(&ns, &id, &req).await?.into(),
            CreateRequest::VNet(req) => self.create_vnet(&ns, &id, &req).await?.into(),
            CreateRequest::SecurityGroup(req) => {
                self.create_security_group(&ns, &id, &req).await?.into()
            }
            CreateRequest::DataDisk(req) => self.create_data_disk(&ns, &id, &req).await?.into(),
        };

        self.put(&key, &resource).await?;

        match &resource {
            // subnets also live under their own child keys
            Resource::VNet(vnet) => {
                for subnet in &vnet.subnet_info_list {
                    self.put_subnet(&ns, subnet).await?;
                }
            }
            Resource::SecurityGroup(sg) => {
                self.link_vnet_consumer(&ns, &sg.vnet_id, &key, AssociationOp::Add)
                    .await?;
            }
            _ => {}
        }

        info!(ns = %ns, kind = %kind, id = %id, connection = resource.connection_name(), "Created resource");
        Ok(resource)
    }

    pub async fn get(&self, ns: &str, kind: ResourceKind, id: &str) -> Result<Resource> {
        let (ns, id) = normalize_pair(ns, id)?;
        ensure_top_level(kind)?;
        let key = resource_key(&ns, kind.as_str(), &id);
        self.load(kind, &key)
            .await?
            .ok_or_else(|| RegistryError::not_found(kind, id))
    }

    /// Typed variant of [`Registry::get`]
    pub async fn get_as<T: ResourceObject>(&self, ns: &str, id: &str) -> Result<T> {
        T::try_from(self.get(ns, T::KIND, id).await?)
    }

    /// Every resource of `kind` in `ns`, in key order; empty when there are none
    pub async fn list(&self, ns: &str, kind: ResourceKind) -> Result<Vec<Resource>> {
        let ns = normalize_id(ns)?;
        ensure_top_level(kind)?;
        let prefix = kind_prefix(&ns, kind.as_str());

        let entries = self.store.list_by_prefix(&prefix).await?;
        entries
            .into_iter()
            .filter(|kv| remainder_is_leaf(&prefix, &kv.key))
            .map(|kv| Resource::decode(kind, &kv.value).map_err(RegistryError::from))
            .collect()
    }

    pub async fn list_as<T: ResourceObject>(&self, ns: &str) -> Result<Vec<T>> {
        self.list(ns, T::KIND)
            .await?
            .into_iter()
            .map(T::try_from)
            .collect()
    }

    pub async fn list_ids(&self, ns: &str, kind: ResourceKind) -> Result<Vec<String>> {
        Ok(self
            .list(ns, kind)
            .await?
            .iter()
            .map(|r| r.id().to_string())
            .collect())
    }

    /// Delete one resource.
    ///
    /// Refuses with `InUse` while consumers are registered unless `force` is set.
    /// The local record is removed only after the provider-side delete succeeds;
    /// a failing provider delete keeps the record even when forced.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, ns: &str, kind: ResourceKind, id: &str, force: bool) -> Result<()> {
        let (ns, id) = normalize_pair(ns, id)?;
        ensure_top_level(kind)?;
        let key = resource_key(&ns, kind.as_str(), &id);
        let _guard = self.locks.lock(&key).await;

        let resource = self
            .load(kind, &key)
            .await?
            .ok_or_else(|| RegistryError::not_found(kind, id.clone()))?;

        let in_use = match &resource {
            Resource::VNet(vnet) => vnet.total_associations(),
            other => other.associated_objects().len(),
        };
        if in_use > 0 {
            if !force {
                return Err(RegistryError::InUse {
                    kind,
                    id,
                    count: in_use,
                });
            }
            warn!(ns = %ns, kind = %kind, id = %id, in_use, "Force-deleting resource that is still in use");
        }

        if kind.is_lookup_only() {
            debug!(ns = %ns, kind = %kind, id = %id, "Lookup-only kind, removing local record only");
        } else {
            self.delete_at_provider(&resource).await?;
        }

        if let Resource::VNet(_) = &resource {
            let prefix = child_kind_prefix(&ns, kind.as_str(), &id, ResourceKind::Subnet.as_str());
            for kv in self.store.list_by_prefix(&prefix).await? {
                self.store.delete(&kv.key).await?;
            }
        }
        self.store.delete(&key).await?;

        if let Resource::SecurityGroup(sg) = &resource {
            if let Err(e) = self
                .update_vnet_consumers(&ns, &sg.vnet_id, &key, AssociationOp::Delete)
                .await
            {
                warn!(ns = %ns, vnet = %sg.vnet_id, id = %id, "Could not unlink security group from vNet: {}", e);
            }
        }

        info!(ns = %ns, kind = %kind, id = %id, "Deleted resource");
        Ok(())
    }

    /// Delete every resource of `kind`, one at a time.
    ///
    /// Stops at the first failure and reports what was already deleted; nothing
    /// is rolled back.
    pub async fn delete_all(
        &self,
        ns: &str,
        kind: ResourceKind,
        force: bool,
    ) -> Result<DeleteAllReport> {
        let ids = self.list_ids(ns, kind).await?;
        let mut report = DeleteAllReport::default();

        for id in ids {
            if let Err(e) = self.delete(ns, kind, &id, force).await {
                warn!(kind = %kind, id = %id, deleted = report.deleted.len(), "delete_all aborted: {}", e);
                return Err(RegistryError::DeleteAllAborted {
                    kind,
                    deleted: report.deleted,
                    failed_id: id,
                    source: Box::new(e),
                });
            }
            report.deleted.push(id);
        }

        Ok(report)
    }

    // ------------------------------------------------------------------
    // Kind-specific creation (caller holds the key lock)

    async fn create_image(&self, id: &str, req: &ImageReq) -> Result<Image> {
        if req.csp_image_name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cspImageName must not be empty".to_string(),
            ));
        }
        let info = self
            .proxy
            .get_image(&req.connection_name, req.csp_image_name.trim())
            .await?;
        Ok(Image::from_provider(id, req, info))
    }

    async fn create_spec(&self, id: &str, req: &SpecReq) -> Result<Spec> {
        if req.csp_spec_name.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cspSpecName must not be empty".to_string(),
            ));
        }
        let connection = self.proxy.get_connection_config(&req.connection_name).await?;
        let info = self
            .proxy
            .get_spec(&req.connection_name, req.csp_spec_name.trim())
            .await?;

        let mut spec = Spec::from_provider(id, &req.connection_name, &connection, &info);
        spec.description = req.description.clone();
        spec.os_type = req.os_type.clone();
        if let Some(cost) = req.cost_per_hour {
            spec.cost_per_hour = cost;
        }
        Ok(spec)
    }

    async fn create_ssh_key(&self, ns: &str, id: &str, req: &SshKeyReq) -> Result<SshKey> {
        let info = self
            .proxy
            .create_key_pair(
                &req.connection_name,
                &KeyPairReqInfo {
                    name: csp_resource_name(ns, id),
                },
            )
            .await?;
        Ok(SshKey::from_provider(id, req, info))
    }

    async fn create_vnet(&self, ns: &str, id: &str, req: &VNetReq) -> Result<VNet> {
        if req.cidr_block.trim().is_empty() {
            return Err(RegistryError::InvalidArgument(
                "cidrBlock must not be empty".to_string(),
            ));
        }

        let mut subnet_ids: Vec<String> = Vec::with_capacity(req.subnet_info_list.len());
        for subnet in &req.subnet_info_list {
            let subnet_id = normalize_id(&subnet.name)?;
            if subnet_ids.contains(&subnet_id) {
                return Err(RegistryError::already_exists(ResourceKind::Subnet, subnet_id));
            }
            subnet_ids.push(subnet_id);
        }

        let wire = VpcReqInfo {
            name: csp_resource_name(ns, id),
            ipv4_cidr: req.cidr_block.trim().to_string(),
            subnet_info_list: req
                .subnet_info_list
                .iter()
                .zip(&subnet_ids)
                .map(|(subnet, subnet_id)| SubnetReqInfo {
                    name: csp_resource_name(ns, subnet_id),
                    ipv4_cidr: subnet.ipv4_cidr.trim().to_string(),
                    zone: subnet.zone.trim().to_string(),
                })
                .collect(),
        };

        let info = self.proxy.create_vpc(&req.connection_name, &wire).await?;

        let mut vnet = VNet {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: req.connection_name.clone(),
            csp_resource_name: info.iid.name_id.clone(),
            csp_resource_id: info.iid.system_id.clone(),
            cidr_block: if info.ipv4_cidr.is_empty() {
                wire.ipv4_cidr.clone()
            } else {
                info.ipv4_cidr.clone()
            },
            description: req.description.clone(),
            key_value_list: crate::model::key_values(&info.key_value_list),
            ..Default::default()
        };

        for (subnet_req, subnet_id) in req.subnet_info_list.iter().zip(&subnet_ids) {
            let csp_name = csp_resource_name(ns, subnet_id);
            let provider_subnet = info
                .subnet_info_list
                .iter()
                .find(|s| s.iid.name_id == csp_name)
                .ok_or_else(|| {
                    ProxyError::InvalidResponse(format!(
                        "subnet '{}' missing from VPC create response",
                        csp_name
                    ))
                })?;
            let subnet = Subnet::from_provider(subnet_id, &vnet, &subnet_req.description, provider_subnet);
            vnet.subnet_info_list.push(subnet);
        }

        Ok(vnet)
    }

    async fn create_security_group(
        &self,
        ns: &str,
        id: &str,
        req: &SecurityGroupReq,
    ) -> Result<SecurityGroup> {
        let vnet_id = normalize_id(&req.vnet_id)?;
        let vnet: VNet = self
            .load(ResourceKind::VNet, &vnet_key(ns, &vnet_id))
            .await?
            .ok_or_else(|| RegistryError::not_found(ResourceKind::VNet, vnet_id.clone()))?
            .try_into()?;

        if vnet.connection_name != req.connection_name {
            return Err(RegistryError::InvalidArgument(format!(
                "vNet '{}' belongs to connection '{}', not '{}'",
                vnet.id, vnet.connection_name, req.connection_name
            )));
        }

        let mut rules = Vec::with_capacity(req.firewall_rules.len());
        for rule in &req.firewall_rules {
            let rule = rule.normalized()?;
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }

        let wire = SecurityReqInfo {
            name: csp_resource_name(ns, id),
            vpc_name: vnet.csp_resource_name.clone(),
            security_rules: rules.iter().map(|r| r.to_wire()).collect(),
        };
        let info = self
            .proxy
            .create_security_group(&req.connection_name, &wire)
            .await?;

        let mut sg = SecurityGroup {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: req.connection_name.clone(),
            vnet_id,
            description: req.description.clone(),
            ..Default::default()
        };
        sg.apply_provider(&info);
        Ok(sg)
    }

    async fn create_data_disk(&self, ns: &str, id: &str, req: &DataDiskReq) -> Result<DataDisk> {
        if req.disk_size == 0 {
            return Err(RegistryError::InvalidArgument(
                "diskSize must be greater than zero".to_string(),
            ));
        }
        let wire = DiskReqInfo {
            name: csp_resource_name(ns, id),
            zone: req.zone.trim().to_string(),
            disk_type: req.disk_type.trim().to_string(),
            disk_size: req.disk_size.to_string(),
        };
        let info = self.proxy.create_disk(&req.connection_name, &wire).await?;
        Ok(DataDisk::from_provider(id, req, info))
    }

    async fn delete_at_provider(&self, resource: &Resource) -> Result<()> {
        match resource {
            Resource::Image(_) | Resource::Spec(_) => Ok(()),
            Resource::SshKey(key) => Ok(self
                .proxy
                .delete_key_pair(&key.connection_name, &key.csp_resource_name)
                .await?),
            Resource::VNet(vnet) => Ok(self
                .proxy
                .delete_vpc(&vnet.connection_name, &vnet.csp_resource_name)
                .await?),
            Resource::Subnet(subnet) => Err(RegistryError::InvalidArgument(format!(
                "subnet '{}' must be deleted through vNet '{}'",
                subnet.id, subnet.vnet_id
            ))),
            Resource::SecurityGroup(sg) => Ok(self
                .proxy
                .delete_security_group(&sg.connection_name, &sg.csp_resource_name)
                .await?),
            Resource::DataDisk(disk) => Ok(self
                .proxy
                .delete_disk(&disk.connection_name, &disk.csp_resource_name)
                .await?),
        }
    }

    // ------------------------------------------------------------------
    // Store helpers (no locking)

    pub(crate) async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.store.get(key).await?.is_some())
    }

    pub(crate) async fn load(&self, kind: ResourceKind, key: &str) -> Result<Option<Resource>> {
        match self.store.get(key).await? {
            Some(value) => Ok(Some(Resource::decode(kind, &value)?)),
            None => Ok(None),
        }
    }

    pub(crate) async fn load_as<T: ResourceObject>(&self, key: &str, id: &str) -> Result<T> {
        self.load(T::KIND, key)
            .await?
            .ok_or_else(|| RegistryError::not_found(T::KIND, id))?
            .try_into()
    }

    pub(crate) async fn put(&self, key: &str, resource: &Resource) -> Result<()> {
        let value = resource.encode()?;
        self.store.put(key, &value).await?;
        debug!(key, "Stored resource");
        Ok(())
    }

    /// Add or remove `consumer` on a VNet's own associated-object list
    async fn update_vnet_consumers(
        &self,
        ns: &str,
        vnet_id: &str,
        consumer: &str,
        op: AssociationOp,
    ) -> Result<()> {
        let _guard = self.locks.lock(&vnet_key(ns, vnet_id)).await;
        self.link_vnet_consumer(ns, vnet_id, consumer, op).await
    }

    /// [`Registry::update_vnet_consumers`] for callers already holding the VNet lock
    async fn link_vnet_consumer(
        &self,
        ns: &str,
        vnet_id: &str,
        consumer: &str,
        op: AssociationOp,
    ) -> Result<()> {
        let key = vnet_key(ns, vnet_id);
        let mut vnet: VNet = self.load_as(&key, vnet_id).await?;
        apply_op(&mut vnet.associated_object_list, op, consumer);
        self.put(&key, &Resource::VNet(vnet)).await
    }

    pub(crate) async fn put_subnet(&self, ns: &str, subnet: &Subnet) -> Result<()> {
        let key = crate::subnet::subnet_key(ns, &subnet.vnet_id, &subnet.id);
        self.put(&key, &Resource::Subnet(subnet.clone())).await
    }
}

/// Normalize a namespace/id pair
pub(crate) fn normalize_pair(ns: &str, id: &str) -> Result<(String, String)> {
    Ok((normalize_id(ns)?, normalize_id(id)?))
}

fn ensure_top_level(kind: ResourceKind) -> Result<()> {
    if kind.is_child() {
        return Err(RegistryError::InvalidArgument(format!(
            "{} is a child resource; address it through its parent",
            kind
        )));
    }
    Ok(())
}

/// Catalog id for a provider spec under a connection
pub(crate) fn spec_id(connection_name: &str, csp_spec_name: &str) -> Result<String> {
    normalize_id(&to_naming_rule_compatible(&format!(
        "{}-{}",
        connection_name, csp_spec_name
    )))
}
