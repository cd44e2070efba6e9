//! CloudGrid Resource Registry
//!
//! Namespace-scoped lifecycle management for multi-cloud resources: images,
//! VM specs, SSH keys, VNets and their subnets, security groups and data
//! disks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    Registry                      │
//! │  create / get / list / delete / delete_all       │
//! │  ┌────────────┐ ┌────────────┐ ┌─────────────┐  │
//! │  │Associations│ │  Firewall  │ │ Spec filter │  │
//! │  │            │ │ reconciler │ │ & recommend │  │
//! │  └────────────┘ └────────────┘ └─────────────┘  │
//! │            KeyedLocks (per store key)            │
//! └───────┬─────────────────────────────┬───────────┘
//!         │                             │
//! ┌───────▼───────┐             ┌───────▼───────┐
//! │    KvStore    │             │   CspProxy    │
//! │ memory / file │             │  (CB-Spider)  │
//! └───────────────┘             └───────────────┘
//! ```
//!
//! Every mutation reaches the proxy before the store: the local record is
//! written only once the provider has confirmed the new state.

pub mod association;
pub mod disk;
pub mod error;
pub mod firewall;
pub mod lock;
pub mod model;
pub mod naming;
pub mod registry;
pub mod spec;
pub mod subnet;

// Re-exports
pub use association::AssociationOp;
pub use error::{RegistryError, Result};
pub use lock::KeyedLocks;
pub use model::{
    CreateRequest, DataDisk, DataDiskReq, FirewallRule, Image, ImageReq, Resource, ResourceKind,
    ResourceObject, SecurityGroup, SecurityGroupReq, Spec, SpecReq, SpecUpdate, SshKey,
    SshKeyReq, Subnet, SubnetReq, VNet, VNetReq,
};
pub use naming::normalize_id;
pub use registry::{DeleteAllReport, Registry};
pub use spec::{
    Coordinates, FetchFailure, FetchReport, PriorityWeights, Range, RankedSpec, RegionTable,
    Requirement, SortKey, SortOrder, SpecField, SpecFilter, StringField, StringFilter,
    StringMatch, sort_specs,
};
