//! Range and string filters over the spec catalog

use crate::error::{RegistryError, Result};
use crate::model::{Spec, UNKNOWN};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Numeric spec attributes usable in range filters and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecField {
    #[serde(rename = "vCPU")]
    VCpu,
    #[serde(rename = "memoryGiB")]
    MemoryGiB,
    #[serde(rename = "diskSizeGB")]
    DiskSizeGB,
    #[serde(rename = "netBwGbps")]
    NetBwGbps,
    #[serde(rename = "acceleratorCount")]
    AcceleratorCount,
    #[serde(rename = "acceleratorMemoryGB")]
    AcceleratorMemoryGB,
    #[serde(rename = "costPerHour")]
    CostPerHour,
    #[serde(rename = "evaluationScore")]
    EvaluationScore,
}

impl SpecField {
    pub const ALL: [SpecField; 8] = [
        SpecField::VCpu,
        SpecField::MemoryGiB,
        SpecField::DiskSizeGB,
        SpecField::NetBwGbps,
        SpecField::AcceleratorCount,
        SpecField::AcceleratorMemoryGB,
        SpecField::CostPerHour,
        SpecField::EvaluationScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecField::VCpu => "vCPU",
            SpecField::MemoryGiB => "memoryGiB",
            SpecField::DiskSizeGB => "diskSizeGB",
            SpecField::NetBwGbps => "netBwGbps",
            SpecField::AcceleratorCount => "acceleratorCount",
            SpecField::AcceleratorMemoryGB => "acceleratorMemoryGB",
            SpecField::CostPerHour => "costPerHour",
            SpecField::EvaluationScore => "evaluationScore",
        }
    }

    pub fn value(&self, spec: &Spec) -> f64 {
        match self {
            SpecField::VCpu => spec.vcpu as f64,
            SpecField::MemoryGiB => spec.memory_gib,
            SpecField::DiskSizeGB => spec.disk_size_gb,
            SpecField::NetBwGbps => spec.net_bw_gbps,
            SpecField::AcceleratorCount => spec.accelerator_count as f64,
            SpecField::AcceleratorMemoryGB => spec.accelerator_memory_gb,
            SpecField::CostPerHour => spec.cost_per_hour,
            SpecField::EvaluationScore => spec.evaluation_score,
        }
    }

    /// [`SpecField::value`] unless the catalog never reported it
    pub fn known_value(&self, spec: &Spec) -> Option<f64> {
        let value = self.value(spec);
        (value != UNKNOWN).then_some(value)
    }
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecField {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        SpecField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::InvalidArgument(format!("unknown spec field '{}'", s)))
    }
}

/// Textual spec attributes usable in string filters and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StringField {
    ConnectionName,
    ProviderName,
    RegionName,
    CspSpecName,
    InfraType,
    OsType,
    AcceleratorModelName,
    AcceleratorType,
}

impl StringField {
    pub const ALL: [StringField; 8] = [
        StringField::ConnectionName,
        StringField::ProviderName,
        StringField::RegionName,
        StringField::CspSpecName,
        StringField::InfraType,
        StringField::OsType,
        StringField::AcceleratorModelName,
        StringField::AcceleratorType,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StringField::ConnectionName => "connectionName",
            StringField::ProviderName => "providerName",
            StringField::RegionName => "regionName",
            StringField::CspSpecName => "cspSpecName",
            StringField::InfraType => "infraType",
            StringField::OsType => "osType",
            StringField::AcceleratorModelName => "acceleratorModelName",
            StringField::AcceleratorType => "acceleratorType",
        }
    }

    pub fn value<'a>(&self, spec: &'a Spec) -> &'a str {
        match self {
            StringField::ConnectionName => &spec.connection_name,
            StringField::ProviderName => &spec.provider_name,
            StringField::RegionName => &spec.region_name,
            StringField::CspSpecName => &spec.csp_spec_name,
            StringField::InfraType => &spec.infra_type,
            StringField::OsType => &spec.os_type,
            StringField::AcceleratorModelName => &spec.accelerator_model_name,
            StringField::AcceleratorType => &spec.accelerator_type,
        }
    }
}

impl fmt::Display for StringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StringField {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        StringField::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RegistryError::InvalidArgument(format!("unknown spec field '{}'", s)))
    }
}

/// Inclusive numeric bounds; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl Range {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    pub fn between(min: f64, max: f64) -> Self {
        Self::new(Some(min), Some(max))
    }

    /// At least one side is set
    pub fn is_bounded(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }

    fn validate(&self, field: SpecField) -> Result<()> {
        let finite = |b: Option<f64>| b.is_none_or(f64::is_finite);
        if !finite(self.min) || !finite(self.max) {
            return Err(RegistryError::InvalidArgument(format!(
                "{} bounds must be finite numbers",
                field
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(RegistryError::InvalidArgument(format!(
                    "{} min {} exceeds max {}",
                    field, min, max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatch {
    /// Case-insensitive equality
    #[default]
    Exact,
    /// Case-insensitive substring
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    pub field: StringField,
    pub value: String,
    #[serde(default)]
    pub mode: StringMatch,
}

impl StringFilter {
    pub fn matches(&self, spec: &Spec) -> bool {
        let actual = self.field.value(spec).to_lowercase();
        let wanted = self.value.trim().to_lowercase();
        match self.mode {
            StringMatch::Exact => actual == wanted,
            StringMatch::Contains => actual.contains(&wanted),
        }
    }
}

/// Conjunction of numeric ranges and string filters.
///
/// An empty filter matches every spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecFilter {
    #[serde(default)]
    pub ranges: BTreeMap<SpecField, Range>,
    #[serde(default)]
    pub strings: Vec<StringFilter>,
}

impl SpecFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(mut self, field: SpecField, range: Range) -> Self {
        self.ranges.insert(field, range);
        self
    }

    pub fn string(mut self, field: StringField, value: impl Into<String>, mode: StringMatch) -> Self {
        self.strings.push(StringFilter {
            field,
            value: value.into(),
            mode,
        });
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (field, range) in &self.ranges {
            range.validate(*field)?;
        }
        Ok(())
    }

    /// Every bounded field is known and within its bounds, and every string
    /// filter matches
    pub fn matches(&self, spec: &Spec) -> bool {
        self.ranges.iter().all(|(field, range)| {
            !range.is_bounded() || field.known_value(spec).is_some_and(|v| range.contains(v))
        })
            && self.strings.iter().all(|f| f.matches(spec))
    }

    /// Keep matching specs in their original order
    pub fn apply(&self, specs: Vec<Spec>) -> Vec<Spec> {
        specs.into_iter().filter(|s| self.matches(s)).collect()
    }
}

impl Registry {
    /// Specs in `ns` that pass `filter`, in catalog (key) order
    pub async fn filter_specs_by_range(&self, ns: &str, filter: &SpecFilter) -> Result<Vec<Spec>> {
        filter.validate()?;
        let specs = self.list_as::<Spec>(ns).await?;
        Ok(filter.apply(specs))
    }
}
