//! CSP proxy client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    /// The proxy answered with a non-success status. `body` is the raw response text.
    #[error("CSP proxy returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The proxy answered 2xx but reported `{"Result": "false"}`
    #[error("CSP proxy rejected the operation: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected CSP proxy response: {0}")]
    InvalidResponse(String),

    #[error("Invalid proxy configuration: {0}")]
    InvalidConfig(String),
}

impl ProxyError {
    /// Raw message as reported by the proxy, when there is one
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            ProxyError::Api { body, .. } => Some(body),
            ProxyError::Rejected(body) => Some(body),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
