//! Data disk

use super::{KeyValue, key_values};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataDisk {
    pub id: String,
    pub name: String,
    pub connection_name: String,
    pub csp_resource_name: String,
    pub csp_resource_id: String,
    pub disk_type: String,

    /// Size in GB
    pub disk_size: u64,
    pub zone: String,
    pub status: String,
    pub created_time: String,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDiskReq {
    pub name: String,
    pub connection_name: String,
    #[serde(default)]
    pub disk_type: String,
    pub disk_size: u64,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub description: String,
}

impl DataDisk {
    pub(crate) fn from_provider(
        id: &str,
        req: &DataDiskReq,
        info: cloudgrid_proxy::DiskInfo,
    ) -> Self {
        let mut disk = Self {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: req.connection_name.clone(),
            description: req.description.clone(),
            ..Default::default()
        };
        disk.apply_provider(info, req.disk_size);
        disk
    }

    /// Overwrite provider-owned fields with the proxy's view.
    ///
    /// `fallback_size` is used when the proxy reports no parseable size.
    pub(crate) fn apply_provider(&mut self, info: cloudgrid_proxy::DiskInfo, fallback_size: u64) {
        self.csp_resource_name = info.iid.name_id;
        self.csp_resource_id = info.iid.system_id;
        self.disk_type = info.disk_type;
        self.disk_size = info.disk_size.trim().parse().unwrap_or(fallback_size);
        self.zone = info.zone;
        self.status = info.status;
        self.created_time = info.created_time;
        self.key_value_list = key_values(&info.key_value_list);
    }
}
