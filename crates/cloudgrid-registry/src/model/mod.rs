//! Canonical resource model
//!
//! Every resource kind has its own struct. [`Resource`] is the closed sum over
//! them; the kind carried by the store key picks the deserializer.

mod data_disk;
mod image;
mod security_group;
mod spec;
mod ssh_key;
mod vnet;

pub use data_disk::{DataDisk, DataDiskReq};
pub use image::{Image, ImageReq};
pub use security_group::{FirewallRule, SecurityGroup, SecurityGroupReq};
pub use spec::{Spec, SpecReq, SpecUpdate, UNKNOWN};
pub use ssh_key::{SshKey, SshKeyReq};
pub use vnet::{Subnet, SubnetReq, VNet, VNetReq};

use crate::error::{RegistryError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Image,
    Spec,
    SshKey,
    VNet,
    Subnet,
    SecurityGroup,
    DataDisk,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Image,
        ResourceKind::Spec,
        ResourceKind::SshKey,
        ResourceKind::VNet,
        ResourceKind::Subnet,
        ResourceKind::SecurityGroup,
        ResourceKind::DataDisk,
    ];

    /// Segment used in store keys
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Spec => "spec",
            ResourceKind::SshKey => "sshKey",
            ResourceKind::VNet => "vNet",
            ResourceKind::Subnet => "subnet",
            ResourceKind::SecurityGroup => "securityGroup",
            ResourceKind::DataDisk => "dataDisk",
        }
    }

    /// Kinds that only exist under a parent resource
    pub fn is_child(&self) -> bool {
        matches!(self, ResourceKind::Subnet)
    }

    /// Kinds the proxy only looks up; nothing is created or deleted provider-side
    pub fn is_lookup_only(&self) -> bool {
        matches!(self, ResourceKind::Image | ResourceKind::Spec)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                RegistryError::InvalidArgument(format!("unsupported resource kind '{}'", s))
            })
    }
}

/// Behaviour shared by every canonical resource struct
pub trait ResourceObject:
    Serialize + DeserializeOwned + Clone + Into<Resource> + TryFrom<Resource, Error = RegistryError>
{
    const KIND: ResourceKind;

    fn id(&self) -> &str;
    fn connection_name(&self) -> &str;
    fn associated_objects(&self) -> &[String];
    fn associated_objects_mut(&mut self) -> &mut Vec<String>;
}

/// Any stored resource
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Image(Image),
    Spec(Spec),
    SshKey(SshKey),
    VNet(VNet),
    Subnet(Subnet),
    SecurityGroup(SecurityGroup),
    DataDisk(DataDisk),
}

macro_rules! resource_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl ResourceObject for $variant {
                const KIND: ResourceKind = ResourceKind::$variant;

                fn id(&self) -> &str {
                    &self.id
                }

                fn connection_name(&self) -> &str {
                    &self.connection_name
                }

                fn associated_objects(&self) -> &[String] {
                    &self.associated_object_list
                }

                fn associated_objects_mut(&mut self) -> &mut Vec<String> {
                    &mut self.associated_object_list
                }
            }

            impl From<$variant> for Resource {
                fn from(value: $variant) -> Self {
                    Resource::$variant(value)
                }
            }

            impl TryFrom<Resource> for $variant {
                type Error = RegistryError;

                fn try_from(resource: Resource) -> Result<Self> {
                    match resource {
                        Resource::$variant(inner) => Ok(inner),
                        other => Err(RegistryError::InvalidArgument(format!(
                            "expected {} but found {} '{}'",
                            ResourceKind::$variant,
                            other.kind(),
                            other.id()
                        ))),
                    }
                }
            }
        )*

        impl Resource {
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(Resource::$variant(_) => ResourceKind::$variant,)*
                }
            }

            pub fn id(&self) -> &str {
                match self {
                    $(Resource::$variant(r) => r.id(),)*
                }
            }

            pub fn connection_name(&self) -> &str {
                match self {
                    $(Resource::$variant(r) => r.connection_name(),)*
                }
            }

            pub fn associated_objects(&self) -> &[String] {
                match self {
                    $(Resource::$variant(r) => r.associated_objects(),)*
                }
            }

            pub fn associated_objects_mut(&mut self) -> &mut Vec<String> {
                match self {
                    $(Resource::$variant(r) => r.associated_objects_mut(),)*
                }
            }

            /// Deserialize a stored value of the given kind
            pub fn decode(kind: ResourceKind, value: &str) -> serde_json::Result<Self> {
                match kind {
                    $(ResourceKind::$variant => Ok(Resource::$variant(serde_json::from_str(value)?)),)*
                }
            }

            /// Serialize the inner object; the kind lives in the key, not the value
            pub fn encode(&self) -> serde_json::Result<String> {
                match self {
                    $(Resource::$variant(r) => serde_json::to_string(r),)*
                }
            }

            /// JSON view of the inner object
            pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
                match self {
                    $(Resource::$variant(r) => serde_json::to_value(r),)*
                }
            }
        }
    };
}

resource_variants!(Image, Spec, SshKey, VNet, Subnet, SecurityGroup, DataDisk);

/// Kind-specific creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CreateRequest {
    Image(ImageReq),
    Spec(SpecReq),
    SshKey(SshKeyReq),
    VNet(VNetReq),
    SecurityGroup(SecurityGroupReq),
    DataDisk(DataDiskReq),
}

impl CreateRequest {
    pub fn kind(&self) -> ResourceKind {
        match self {
            CreateRequest::Image(_) => ResourceKind::Image,
            CreateRequest::Spec(_) => ResourceKind::Spec,
            CreateRequest::SshKey(_) => ResourceKind::SshKey,
            CreateRequest::VNet(_) => ResourceKind::VNet,
            CreateRequest::SecurityGroup(_) => ResourceKind::SecurityGroup,
            CreateRequest::DataDisk(_) => ResourceKind::DataDisk,
        }
    }

    /// Requested id, before normalization
    pub fn name(&self) -> &str {
        match self {
            CreateRequest::Image(r) => &r.name,
            CreateRequest::Spec(r) => &r.name,
            CreateRequest::SshKey(r) => &r.name,
            CreateRequest::VNet(r) => &r.name,
            CreateRequest::SecurityGroup(r) => &r.name,
            CreateRequest::DataDisk(r) => &r.name,
        }
    }

    pub fn connection_name(&self) -> &str {
        match self {
            CreateRequest::Image(r) => &r.connection_name,
            CreateRequest::Spec(r) => &r.connection_name,
            CreateRequest::SshKey(r) => &r.connection_name,
            CreateRequest::VNet(r) => &r.connection_name,
            CreateRequest::SecurityGroup(r) => &r.connection_name,
            CreateRequest::DataDisk(r) => &r.connection_name,
        }
    }
}

/// Provider key-value pairs carried verbatim into canonical objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

pub(crate) fn key_values(list: &[cloudgrid_proxy::KeyValue]) -> Vec<KeyValue> {
    list.iter()
        .map(|kv| KeyValue {
            key: kv.key.clone(),
            value: kv.value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_key_segment() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert_eq!("VNET".parse::<ResourceKind>().unwrap(), ResourceKind::VNet);
        assert_eq!(
            "securitygroup".parse::<ResourceKind>().unwrap(),
            ResourceKind::SecurityGroup
        );
    }

    #[test]
    fn test_unknown_kind_is_invalid_argument() {
        assert!(matches!(
            "loadBalancer".parse::<ResourceKind>(),
            Err(RegistryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decode_dispatches_on_kind() {
        let key = SshKey {
            id: "key01".to_string(),
            name: "key01".to_string(),
            connection_name: "aws-ap-northeast-2".to_string(),
            ..Default::default()
        };
        let encoded = Resource::from(key.clone()).encode().unwrap();

        let decoded = Resource::decode(ResourceKind::SshKey, &encoded).unwrap();
        assert_eq!(decoded.kind(), ResourceKind::SshKey);
        assert_eq!(SshKey::try_from(decoded).unwrap(), key);
    }

    #[test]
    fn test_try_from_wrong_variant() {
        let resource = Resource::from(Image {
            id: "img01".to_string(),
            ..Default::default()
        });
        assert!(Spec::try_from(resource).is_err());
    }

    #[test]
    fn test_create_request_is_tagged_by_kind() {
        let req: CreateRequest = serde_json::from_value(serde_json::json!({
            "kind": "sshKey",
            "name": "key01",
            "connectionName": "aws-ap-northeast-2"
        }))
        .unwrap();
        assert_eq!(req.kind(), ResourceKind::SshKey);
        assert_eq!(req.name(), "key01");
    }
}
