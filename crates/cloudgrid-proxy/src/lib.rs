//! CloudGrid CSP proxy client
//!
//! Translates CloudGrid's per-kind requests into the CSP proxy's REST protocol.
//! Every call carries a `ConnectionName` selecting the provider/region/credential
//! triple; the proxy takes care of the provider-specific drivers.
//!
//! ```text
//! ┌──────────────────────┐      ┌───────────────────────┐
//! │  cloudgrid-registry  │─────▶│  CspProxy (trait)     │
//! └──────────────────────┘      │   └─ SpiderClient     │──── HTTP ───▶ CSP proxy
//!                               └───────────────────────┘
//! ```
//!
//! The client is deliberately thin: non-2xx answers are returned as
//! [`ProxyError::Api`] with the raw body, and nothing is retried.

pub mod client;
pub mod error;
pub mod proxy;
pub mod types;

pub use client::{SpiderClient, SpiderConfig};
pub use error::{ProxyError, Result};
pub use proxy::CspProxy;
pub use types::{
    ConnectionConfigInfo, DiskInfo, DiskReqInfo, GpuInfo, IId, ImageInfo, KeyPairInfo,
    KeyPairReqInfo, KeyValue, SecurityInfo, SecurityReqInfo, SecurityRuleInfo, SubnetInfo,
    SubnetReqInfo, VCpuInfo, VmSpecInfo, VpcInfo, VpcReqInfo,
};
