//! Wire types of the CSP proxy protocol
//!
//! Field names follow the proxy's JSON verbatim (`IId`, `IPv4_CIDR`, ...).
//! Numeric quantities such as vCPU count, memory and disk size travel as strings.

use serde::{Deserialize, Serialize};

/// Request envelope: `{ConnectionName, ReqInfo}`
#[derive(Debug, Clone, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    #[serde(rename = "ConnectionName")]
    pub connection_name: &'a str,

    #[serde(rename = "ReqInfo")]
    pub req_info: &'a T,
}

/// Envelope without request fields (delete calls)
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionOnly<'a> {
    #[serde(rename = "ConnectionName")]
    pub connection_name: &'a str,
}

/// Provider identity pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IId {
    #[serde(rename = "NameId", default)]
    pub name_id: String,

    #[serde(rename = "SystemId", default)]
    pub system_id: String,
}

impl IId {
    pub fn new(name_id: impl Into<String>, system_id: impl Into<String>) -> Self {
        Self {
            name_id: name_id.into(),
            system_id: system_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key", default)]
    pub key: String,

    #[serde(rename = "Value", default)]
    pub value: String,
}

/// `{"Result": "true"}` style acknowledgement
#[derive(Debug, Clone, Deserialize)]
pub struct BoolResult {
    #[serde(rename = "Result")]
    pub result: String,
}

impl BoolResult {
    pub fn is_true(&self) -> bool {
        self.result.eq_ignore_ascii_case("true")
    }
}

/// Connection configuration: which provider/region/credential a connection name maps to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfigInfo {
    #[serde(rename = "ConfigName", default)]
    pub config_name: String,

    #[serde(rename = "ProviderName", default)]
    pub provider_name: String,

    #[serde(rename = "DriverName", default)]
    pub driver_name: String,

    #[serde(rename = "CredentialName", default)]
    pub credential_name: String,

    #[serde(rename = "RegionName", default)]
    pub region_name: String,
}

// ---------------------------------------------------------------------------
// VPC / Subnet

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetReqInfo {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "IPv4_CIDR")]
    pub ipv4_cidr: String,

    #[serde(rename = "Zone", default, skip_serializing_if = "String::is_empty")]
    pub zone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcReqInfo {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "IPv4_CIDR")]
    pub ipv4_cidr: String,

    #[serde(rename = "SubnetInfoList")]
    pub subnet_info_list: Vec<SubnetReqInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "Zone", default)]
    pub zone: String,

    #[serde(rename = "IPv4_CIDR", default)]
    pub ipv4_cidr: String,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "IPv4_CIDR", default)]
    pub ipv4_cidr: String,

    #[serde(rename = "SubnetInfoList", default, deserialize_with = "null_as_empty")]
    pub subnet_info_list: Vec<SubnetInfo>,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

// ---------------------------------------------------------------------------
// Security group

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRuleInfo {
    #[serde(rename = "FromPort", default)]
    pub from_port: String,

    #[serde(rename = "ToPort", default)]
    pub to_port: String,

    #[serde(rename = "IPProtocol", default)]
    pub ip_protocol: String,

    #[serde(rename = "Direction", default)]
    pub direction: String,

    #[serde(rename = "CIDR", default)]
    pub cidr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReqInfo {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "VPCName")]
    pub vpc_name: String,

    #[serde(rename = "SecurityRules")]
    pub security_rules: Vec<SecurityRuleInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReqInfo {
    #[serde(rename = "RuleInfoList")]
    pub rule_info_list: Vec<SecurityRuleInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "VpcIID", default)]
    pub vpc_iid: IId,

    #[serde(rename = "SecurityRules", default, deserialize_with = "null_as_empty")]
    pub security_rules: Vec<SecurityRuleInfo>,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

// ---------------------------------------------------------------------------
// Key pair

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairReqInfo {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "Fingerprint", default)]
    pub fingerprint: String,

    #[serde(rename = "PublicKey", default)]
    pub public_key: String,

    #[serde(rename = "PrivateKey", default)]
    pub private_key: String,

    #[serde(rename = "VMUserID", default)]
    pub vm_user_id: String,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

// ---------------------------------------------------------------------------
// Image / Spec

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "GuestOS", default)]
    pub guest_os: String,

    #[serde(rename = "Status", default)]
    pub status: String,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VCpuInfo {
    #[serde(rename = "Count", default)]
    pub count: String,

    #[serde(rename = "Clock", default)]
    pub clock: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuInfo {
    #[serde(rename = "Count", default)]
    pub count: String,

    #[serde(rename = "Mfr", default)]
    pub mfr: String,

    #[serde(rename = "Model", default)]
    pub model: String,

    /// Per-device memory in MiB
    #[serde(rename = "Mem", default)]
    pub mem: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSpecInfo {
    #[serde(rename = "Region", default)]
    pub region: String,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "VCpu", default)]
    pub vcpu: VCpuInfo,

    /// Memory in MiB
    #[serde(rename = "Mem", default)]
    pub mem: String,

    /// Root disk size in GB, "-1" when the provider does not report one
    #[serde(rename = "Disk", default)]
    pub disk: String,

    #[serde(rename = "Gpu", default, deserialize_with = "null_as_empty")]
    pub gpu: Vec<GpuInfo>,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

// ---------------------------------------------------------------------------
// Disk

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskReqInfo {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Zone", default, skip_serializing_if = "String::is_empty")]
    pub zone: String,

    #[serde(rename = "DiskType")]
    pub disk_type: String,

    #[serde(rename = "DiskSize")]
    pub disk_size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskUpsizeReqInfo {
    #[serde(rename = "Size")]
    pub size: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskInfo {
    #[serde(rename = "IId", default)]
    pub iid: IId,

    #[serde(rename = "Zone", default)]
    pub zone: String,

    #[serde(rename = "DiskType", default)]
    pub disk_type: String,

    #[serde(rename = "DiskSize", default)]
    pub disk_size: String,

    #[serde(rename = "Status", default)]
    pub status: String,

    #[serde(rename = "OwnerVM", default)]
    pub owner_vm: IId,

    #[serde(rename = "CreatedTime", default)]
    pub created_time: String,

    #[serde(rename = "KeyValueList", default, deserialize_with = "null_as_empty")]
    pub key_value_list: Vec<KeyValue>,
}

/// The proxy encodes empty lists as `null`
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
