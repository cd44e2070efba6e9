//! SSH key pair

use super::{KeyValue, key_values};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SshKey {
    pub id: String,
    pub name: String,
    pub connection_name: String,
    pub csp_resource_name: String,
    pub csp_resource_id: String,
    pub fingerprint: String,

    /// Login user the provider associates with the key
    pub username: String,
    pub public_key: String,
    pub private_key: String,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKeyReq {
    pub name: String,
    pub connection_name: String,
    #[serde(default)]
    pub description: String,
}

impl SshKey {
    pub(crate) fn from_provider(
        id: &str,
        req: &SshKeyReq,
        info: cloudgrid_proxy::KeyPairInfo,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: req.connection_name.clone(),
            csp_resource_name: info.iid.name_id,
            csp_resource_id: info.iid.system_id,
            fingerprint: info.fingerprint,
            username: info.vm_user_id,
            public_key: info.public_key,
            private_key: info.private_key,
            description: req.description.clone(),
            associated_object_list: Vec::new(),
            key_value_list: key_values(&info.key_value_list),
        }
    }
}
