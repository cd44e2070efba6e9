//! Deterministic key builders

/// `/ns/{ns}/resources/{kind}/{id}`
pub fn resource_key(ns: &str, kind: &str, id: &str) -> String {
    format!("/ns/{}/resources/{}/{}", ns, kind, id)
}

/// `/ns/{ns}/resources/{kind}/{parent_id}/{child_kind}/{child_id}`
pub fn child_resource_key(
    ns: &str,
    kind: &str,
    parent_id: &str,
    child_kind: &str,
    child_id: &str,
) -> String {
    format!(
        "/ns/{}/resources/{}/{}/{}/{}",
        ns, kind, parent_id, child_kind, child_id
    )
}

/// Prefix covering every object of one kind in a namespace (trailing slash included)
pub fn kind_prefix(ns: &str, kind: &str) -> String {
    format!("/ns/{}/resources/{}/", ns, kind)
}

/// Prefix covering every child of one parent
pub fn child_kind_prefix(ns: &str, kind: &str, parent_id: &str, child_kind: &str) -> String {
    format!("/ns/{}/resources/{}/{}/{}/", ns, kind, parent_id, child_kind)
}

/// Whether `key` sits directly under `prefix` (no further path segments).
///
/// A kind prefix scan also returns child keys nested below each parent; this
/// separates the two.
pub fn remainder_is_leaf(prefix: &str, key: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}
