//! CSP proxy trait definition

use crate::error::Result;
use crate::types::{
    ConnectionConfigInfo, DiskInfo, DiskReqInfo, ImageInfo, KeyPairInfo, KeyPairReqInfo,
    SecurityInfo, SecurityReqInfo, SecurityRuleInfo, SubnetReqInfo, VmSpecInfo, VpcInfo,
    VpcReqInfo,
};
use async_trait::async_trait;

/// Uniform per-kind access to every CSP behind the proxy
///
/// Implementations return provider state only. They never retry and never
/// touch the local store; retry policy belongs to the caller.
#[async_trait]
pub trait CspProxy: Send + Sync {
    /// Resolve a connection name to its provider/region/credential triple
    async fn get_connection_config(&self, connection: &str) -> Result<ConnectionConfigInfo>;

    // Image (lookup only)
    async fn get_image(&self, connection: &str, csp_image_name: &str) -> Result<ImageInfo>;
    async fn list_images(&self, connection: &str) -> Result<Vec<ImageInfo>>;

    // Spec (lookup only)
    async fn get_spec(&self, connection: &str, csp_spec_name: &str) -> Result<VmSpecInfo>;
    async fn list_specs(&self, connection: &str) -> Result<Vec<VmSpecInfo>>;

    // Key pair
    async fn create_key_pair(&self, connection: &str, req: &KeyPairReqInfo)
    -> Result<KeyPairInfo>;
    async fn get_key_pair(&self, connection: &str, name: &str) -> Result<KeyPairInfo>;
    async fn list_key_pairs(&self, connection: &str) -> Result<Vec<KeyPairInfo>>;
    async fn delete_key_pair(&self, connection: &str, name: &str) -> Result<()>;

    // VPC and its subnets
    async fn create_vpc(&self, connection: &str, req: &VpcReqInfo) -> Result<VpcInfo>;
    async fn get_vpc(&self, connection: &str, name: &str) -> Result<VpcInfo>;
    async fn list_vpcs(&self, connection: &str) -> Result<Vec<VpcInfo>>;
    async fn delete_vpc(&self, connection: &str, name: &str) -> Result<()>;
    async fn add_subnet(
        &self,
        connection: &str,
        vpc_name: &str,
        req: &SubnetReqInfo,
    ) -> Result<VpcInfo>;
    async fn remove_subnet(&self, connection: &str, vpc_name: &str, subnet_name: &str)
    -> Result<()>;

    // Security group and its rules
    async fn create_security_group(
        &self,
        connection: &str,
        req: &SecurityReqInfo,
    ) -> Result<SecurityInfo>;
    async fn get_security_group(&self, connection: &str, name: &str) -> Result<SecurityInfo>;
    async fn list_security_groups(&self, connection: &str) -> Result<Vec<SecurityInfo>>;
    async fn delete_security_group(&self, connection: &str, name: &str) -> Result<()>;
    async fn add_rules(
        &self,
        connection: &str,
        sg_name: &str,
        rules: &[SecurityRuleInfo],
    ) -> Result<SecurityInfo>;
    async fn remove_rules(
        &self,
        connection: &str,
        sg_name: &str,
        rules: &[SecurityRuleInfo],
    ) -> Result<()>;

    // Data disk
    async fn create_disk(&self, connection: &str, req: &DiskReqInfo) -> Result<DiskInfo>;
    async fn get_disk(&self, connection: &str, name: &str) -> Result<DiskInfo>;
    async fn list_disks(&self, connection: &str) -> Result<Vec<DiskInfo>>;
    async fn delete_disk(&self, connection: &str, name: &str) -> Result<()>;
    async fn upsize_disk(&self, connection: &str, name: &str, size_gb: u64) -> Result<()>;
}
