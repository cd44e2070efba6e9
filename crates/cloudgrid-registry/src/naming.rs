//! Identifier normalization
//!
//! Namespaces and resource ids are case-insensitive slugs. Everything is
//! lowercased before it reaches a store key.

use crate::error::{RegistryError, Result};

const MAX_ID_LENGTH: usize = 63;

/// Lowercase, trim and validate an identifier.
///
/// Valid ids match `^[a-z]([-a-z0-9]*[a-z0-9])?$` and are at most 63 characters.
pub fn normalize_id(raw: &str) -> Result<String> {
    let id = raw.trim().to_lowercase();
    validate_id(&id)?;
    Ok(id)
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(RegistryError::InvalidArgument(
            "identifier must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(RegistryError::InvalidArgument(format!(
            "identifier '{}' is longer than {} characters",
            id, MAX_ID_LENGTH
        )));
    }

    let bytes = id.as_bytes();
    let starts_ok = bytes[0].is_ascii_lowercase();
    let ends_ok = bytes[bytes.len() - 1].is_ascii_lowercase() || bytes[bytes.len() - 1].is_ascii_digit();
    let body_ok = bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-');

    if starts_ok && ends_ok && body_ok {
        Ok(())
    } else {
        Err(RegistryError::InvalidArgument(format!(
            "identifier '{}' must start with a letter, end with a letter or digit, \
             and contain only lowercase letters, digits and '-'",
            id
        )))
    }
}

/// Turn a provider-native name (`t3.medium`, `Standard_B2s`) into a valid id fragment.
///
/// Runs of characters outside `[a-z0-9]` collapse into a single '-'.
pub fn to_naming_rule_compatible(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Name given to a provider-side object created for `(ns, id)`
pub fn csp_resource_name(ns: &str, id: &str) -> String {
    format!("{}-{}", ns, id)
}
