//! VM spec catalog entry

use super::{KeyValue, key_values};
use cloudgrid_proxy::{ConnectionConfigInfo, VmSpecInfo};
use serde::{Deserialize, Serialize};

/// Sentinel for numeric attributes the provider does not report
pub const UNKNOWN: f64 = -1.0;

/// One purchasable instance type in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spec {
    pub id: String,
    pub name: String,
    pub connection_name: String,
    pub provider_name: String,
    pub region_name: String,
    pub csp_spec_name: String,
    pub infra_type: String,
    pub os_type: String,

    #[serde(rename = "vCPU")]
    pub vcpu: u32,

    #[serde(rename = "memoryGiB")]
    pub memory_gib: f64,

    /// Root disk size in GB, [`UNKNOWN`] when not reported
    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: f64,

    pub net_bw_gbps: f64,
    pub accelerator_model_name: String,
    pub accelerator_count: u32,

    #[serde(rename = "acceleratorMemoryGB")]
    pub accelerator_memory_gb: f64,
    pub accelerator_type: String,

    /// [`UNKNOWN`] until priced
    pub cost_per_hour: f64,

    /// Benchmark-derived score, [`UNKNOWN`] when never evaluated
    pub evaluation_score: f64,

    /// 1-based rank assigned by the recommender; 0 outside a ranking
    pub order_in_filtered_result: u32,
    pub description: String,
    pub associated_object_list: Vec<String>,
    pub key_value_list: Vec<KeyValue>,
}

impl Default for Spec {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            connection_name: String::new(),
            provider_name: String::new(),
            region_name: String::new(),
            csp_spec_name: String::new(),
            infra_type: String::new(),
            os_type: String::new(),
            vcpu: 0,
            memory_gib: 0.0,
            disk_size_gb: UNKNOWN,
            net_bw_gbps: 0.0,
            accelerator_model_name: String::new(),
            accelerator_count: 0,
            accelerator_memory_gb: 0.0,
            accelerator_type: String::new(),
            cost_per_hour: UNKNOWN,
            evaluation_score: UNKNOWN,
            order_in_filtered_result: 0,
            description: String::new(),
            associated_object_list: Vec::new(),
            key_value_list: Vec::new(),
        }
    }
}

/// Spec registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecReq {
    pub name: String,
    pub connection_name: String,
    pub csp_spec_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub os_type: String,
    #[serde(default)]
    pub cost_per_hour: Option<f64>,
}

/// Mutable catalog attributes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecUpdate {
    pub cost_per_hour: Option<f64>,
    pub evaluation_score: Option<f64>,
    pub description: Option<String>,
    pub os_type: Option<String>,
}

impl Spec {
    /// Canonical spec from the proxy's lookup result.
    ///
    /// Memory arrives in MiB and is stored in GiB rounded to one decimal.
    pub fn from_provider(
        id: &str,
        connection_name: &str,
        connection: &ConnectionConfigInfo,
        info: &VmSpecInfo,
    ) -> Self {
        let vcpu = parse_u32(&info.vcpu.count);
        let memory_gib = mib_to_gib(parse_f64(&info.mem).unwrap_or(0.0));
        let disk_size_gb = parse_f64(&info.disk)
            .filter(|d| *d > 0.0)
            .unwrap_or(UNKNOWN);

        let accelerator_count: u32 = info.gpu.iter().map(|g| parse_u32(&g.count)).sum();
        let accelerator_memory_mib: f64 = info
            .gpu
            .iter()
            .map(|g| parse_u32(&g.count) as f64 * parse_f64(&g.mem).unwrap_or(0.0))
            .sum();
        let accelerator_model_name = info
            .gpu
            .iter()
            .find(|g| !g.model.is_empty())
            .map(|g| {
                if g.mfr.is_empty() {
                    g.model.clone()
                } else {
                    format!("{} {}", g.mfr, g.model)
                }
            })
            .unwrap_or_default();

        let region_name = if info.region.is_empty() {
            connection.region_name.clone()
        } else {
            info.region.clone()
        };

        Self {
            id: id.to_string(),
            name: id.to_string(),
            connection_name: connection_name.to_string(),
            provider_name: connection.provider_name.to_lowercase(),
            region_name,
            csp_spec_name: info.name.clone(),
            infra_type: "vm".to_string(),
            vcpu,
            memory_gib,
            disk_size_gb,
            accelerator_model_name,
            accelerator_count,
            accelerator_memory_gb: mib_to_gib(accelerator_memory_mib),
            accelerator_type: if accelerator_count > 0 {
                "gpu".to_string()
            } else {
                String::new()
            },
            key_value_list: key_values(&info.key_value_list),
            ..Default::default()
        }
    }

    /// Whether the cost attribute holds a real price
    pub fn has_cost(&self) -> bool {
        self.cost_per_hour >= 0.0
    }

    pub(crate) fn apply_update(&mut self, update: &SpecUpdate) {
        if let Some(cost) = update.cost_per_hour {
            self.cost_per_hour = cost;
        }
        if let Some(score) = update.evaluation_score {
            self.evaluation_score = score;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(os_type) = &update.os_type {
            self.os_type = os_type.clone();
        }
    }
}

fn parse_u32(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn mib_to_gib(mib: f64) -> f64 {
    (mib / 1024.0 * 10.0).round() / 10.0
}
