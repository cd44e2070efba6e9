//! Machine image

use super::{KeyValue, key_values};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered machine image
///
/// Images are public catalog objects on the provider side; registering one only
/// records the lookup result locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub connection_name: String,

    /// Provider-native image name (`NameId`)
    pub csp_image_name: String,

    /// Provider-native image id (`SystemId`)
    pub csp_resource_id: String,

    pub guest_os: String,
    pub status: String,
    pub description: String,
    pub registered_at: Option<DateTime<Utc>>,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

/// Image registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReq {
    pub name: String,
    pub connection_name: String,
    pub csp_image_name: String,
    #[serde(default)]
    pub description: String,
}

impl Image {
    pub(crate) fn from_provider(
        id: &str,
        req: &ImageReq,
        info: cloudgrid_proxy::ImageInfo,
    ) -> Self {
        let csp_image_name = if info.iid.name_id.is_empty() {
            req.csp_image_name.clone()
        } else {
            info.iid.name_id.clone()
        };

        Self {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: req.connection_name.clone(),
            csp_image_name,
            csp_resource_id: info.iid.system_id,
            guest_os: info.guest_os,
            status: info.status,
            description: req.description.clone(),
            registered_at: Some(Utc::now()),
            associated_object_list: Vec::new(),
            key_value_list: key_values(&info.key_value_list),
        }
    }
}
