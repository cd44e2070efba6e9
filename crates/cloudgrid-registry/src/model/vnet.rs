//! Virtual network and its subnets

use super::{KeyValue, key_values};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VNet {
    pub id: String,
    pub name: String,
    pub connection_name: String,
    pub csp_resource_name: String,
    pub csp_resource_id: String,
    pub cidr_block: String,

    /// Ordered subnet list; each entry is also stored under its child key
    pub subnet_info_list: Vec<Subnet>,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub connection_name: String,

    /// Parent VNet id
    pub vnet_id: String,
    pub csp_resource_name: String,
    pub csp_resource_id: String,
    pub ipv4_cidr: String,
    pub zone: String,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VNetReq {
    pub name: String,
    pub connection_name: String,
    pub cidr_block: String,
    #[serde(default)]
    pub subnet_info_list: Vec<SubnetReq>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetReq {
    pub name: String,
    pub ipv4_cidr: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub description: String,
}

impl VNet {
    /// Number of consumers of the VNet itself plus all of its subnets
    pub fn total_associations(&self) -> usize {
        self.associated_object_list.len()
            + self
                .subnet_info_list
                .iter()
                .map(|s| s.associated_object_list.len())
                .sum::<usize>()
    }

    pub fn subnet(&self, id: &str) -> Option<&Subnet> {
        self.subnet_info_list.iter().find(|s| s.id == id)
    }

    pub(crate) fn upsert_subnet(&mut self, subnet: Subnet) {
        match self.subnet_info_list.iter_mut().find(|s| s.id == subnet.id) {
            Some(existing) => *existing = subnet,
            None => self.subnet_info_list.push(subnet),
        }
    }
}

impl Subnet {
    /// Build a subnet from the proxy's view.
    ///
    /// `id`/`description` come from the caller; provider-owned fields from `info`.
    pub(crate) fn from_provider(
        id: &str,
        vnet: &VNet,
        description: &str,
        info: &cloudgrid_proxy::SubnetInfo,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: vnet.connection_name.clone(),
            vnet_id: vnet.id.clone(),
            csp_resource_name: info.iid.name_id.clone(),
            csp_resource_id: info.iid.system_id.clone(),
            ipv4_cidr: info.ipv4_cidr.clone(),
            zone: info.zone.clone(),
            description: description.to_string(),
            associated_object_list: Vec::new(),
            key_value_list: key_values(&info.key_value_list),
        }
    }
}
