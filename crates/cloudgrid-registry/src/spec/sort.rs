//! Stable ordering of spec lists

use super::filter::{SpecField, StringField};
use crate::error::{RegistryError, Result};
use crate::model::Spec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortKey {
    Numeric(SpecField),
    Text(StringField),
}

impl FromStr for SortKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(field) = s.parse::<SpecField>() {
            return Ok(SortKey::Numeric(field));
        }
        s.parse::<StringField>()
            .map(SortKey::Text)
            .map_err(|_| RegistryError::InvalidArgument(format!("cannot sort by '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(RegistryError::InvalidArgument(format!(
                "unknown sort order '{}'",
                other
            ))),
        }
    }
}

/// Stable sort: specs comparing equal keep their relative order in either direction
pub fn sort_specs(specs: &mut [Spec], key: SortKey, order: SortOrder) {
    specs.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

fn compare(a: &Spec, b: &Spec, key: SortKey) -> Ordering {
    match key {
        SortKey::Numeric(field) => field.value(a).total_cmp(&field.value(b)),
        SortKey::Text(field) => field
            .value(a)
            .to_lowercase()
            .cmp(&field.value(b).to_lowercase()),
    }
}
