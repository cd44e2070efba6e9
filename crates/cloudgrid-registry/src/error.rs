//! Registry error types

use crate::model::ResourceKind;
use cloudgrid_proxy::ProxyError;
use cloudgrid_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: ResourceKind, id: String },

    #[error("Firewall rule already exists: {0}")]
    DuplicateRule(String),

    #[error("Firewall rule not found: {0}")]
    RuleNotFound(String),

    #[error("{kind} '{id}' is in use by {count} object(s)")]
    InUse {
        kind: ResourceKind,
        id: String,
        count: usize,
    },

    /// The CSP proxy call failed; carries the proxy's raw message
    #[error("Provider error: {0}")]
    Provider(#[from] ProxyError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("delete of {kind} '{failed_id}' failed after deleting {deleted:?}: {source}")]
    DeleteAllAborted {
        kind: ResourceKind,
        deleted: Vec<String>,
        failed_id: String,
        #[source]
        source: Box<RegistryError>,
    },
}

impl RegistryError {
    pub(crate) fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        RegistryError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub(crate) fn already_exists(kind: ResourceKind, id: impl Into<String>) -> Self {
        RegistryError::AlreadyExists {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Store(StoreError::Json(err))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
