//! Weighted spec recommendation
//!
//! Each candidate gets three scores in `[0, 1]`: cost (cheaper is better),
//! performance (evaluation score, or a vCPU/memory proxy) and locality
//! (nearer is better). The final score is their weighted sum.

use super::filter::SpecFilter;
use crate::error::{RegistryError, Result};
use crate::model::Spec;
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Region name to location, used for locality scoring
pub type RegionTable = HashMap<String, Coordinates>;

/// Great-circle distance in kilometres
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityWeights {
    pub cost: f64,
    pub performance: f64,
    pub location: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            cost: 1.0,
            performance: 1.0,
            location: 1.0,
        }
    }
}

impl PriorityWeights {
    fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("cost", self.cost),
            ("performance", self.performance),
            ("location", self.location),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(RegistryError::InvalidArgument(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    #[serde(default)]
    pub filter: SpecFilter,

    /// Where the workload should run; locality scores 0 without it
    #[serde(default)]
    pub location: Option<Coordinates>,

    /// Keep at most this many results
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSpec {
    pub spec: Spec,
    pub score: f64,
}

/// Min-max normalization. `None` inputs score 0; a degenerate range scores 1.
fn normalize(values: &[Option<f64>], lower_is_better: bool) -> Vec<f64> {
    let known = values.iter().flatten();
    let min = known.clone().copied().fold(f64::INFINITY, f64::min);
    let max = known.copied().fold(f64::NEG_INFINITY, f64::max);

    values
        .iter()
        .map(|v| match v {
            None => 0.0,
            Some(_) if max - min <= f64::EPSILON => 1.0,
            Some(v) if lower_is_better => (max - v) / (max - min),
            Some(v) => (v - min) / (max - min),
        })
        .collect()
}

fn performance_of(spec: &Spec) -> f64 {
    if spec.evaluation_score >= 0.0 {
        spec.evaluation_score
    } else {
        spec.vcpu as f64 + spec.memory_gib / 4.0
    }
}

fn region_location(regions: &RegionTable, region: &str) -> Option<Coordinates> {
    regions
        .get(region)
        .or_else(|| regions.get(&region.to_lowercase()))
        .copied()
}

/// Score and order `candidates` best-first.
///
/// Ties keep the input order. `order_in_filtered_result` is set to the 1-based rank.
pub fn rank_specs(
    candidates: Vec<Spec>,
    location: Option<Coordinates>,
    weights: &PriorityWeights,
    regions: &RegionTable,
) -> Vec<RankedSpec> {
    let costs: Vec<Option<f64>> = candidates
        .iter()
        .map(|s| s.has_cost().then_some(s.cost_per_hour))
        .collect();
    let performance: Vec<Option<f64>> = candidates.iter().map(|s| Some(performance_of(s))).collect();
    let distances: Vec<Option<f64>> = candidates
        .iter()
        .map(|s| {
            let here = location?;
            let there = region_location(regions, &s.region_name)?;
            Some(haversine_km(here, there))
        })
        .collect();

    let cost_scores = normalize(&costs, true);
    let perf_scores = normalize(&performance, false);
    let loc_scores = normalize(&distances, true);

    let mut ranked: Vec<RankedSpec> = candidates
        .into_iter()
        .enumerate()
        .map(|(i, spec)| {
            let score = weights.cost * cost_scores[i]
                + weights.performance * perf_scores[i]
                + weights.location * loc_scores[i];
            RankedSpec { spec, score }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    for (rank, entry) in ranked.iter_mut().enumerate() {
        entry.spec.order_in_filtered_result = rank as u32 + 1;
    }
    ranked
}

impl Registry {
    /// Filter the catalog by `requirement` and rank the survivors by `weights`
    #[tracing::instrument(skip(self, requirement, weights))]
    pub async fn recommend_spec(
        &self,
        ns: &str,
        requirement: &Requirement,
        weights: &PriorityWeights,
    ) -> Result<Vec<RankedSpec>> {
        weights.validate()?;
        let candidates = self.filter_specs_by_range(ns, &requirement.filter).await?;
        debug!(candidates = candidates.len(), "Ranking specs");

        let mut ranked = rank_specs(candidates, requirement.location, weights, &self.regions);
        if let Some(limit) = requirement.limit {
            ranked.truncate(limit);
        }
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UNKNOWN;

    fn spec(id: &str, vcpu: u32, cost: f64, region: &str) -> Spec {
        Spec {
            id: id.to_string(),
            vcpu,
            memory_gib: vcpu as f64 * 4.0,
            cost_per_hour: cost,
            region_name: region.to_string(),
            ..Default::default()
        }
    }

    fn ids(ranked: &[RankedSpec]) -> Vec<&str> {
        ranked.iter().map(|r| r.spec.id.as_str()).collect()
    }

    fn regions() -> RegionTable {
        RegionTable::from([
            ("ap-northeast-2".to_string(), Coordinates::new(37.36, 126.78)),
            ("us-east-1".to_string(), Coordinates::new(38.13, -78.45)),
        ])
    }

    #[test]
    fn test_haversine_seoul_to_virginia() {
        let d = haversine_km(Coordinates::new(37.36, 126.78), Coordinates::new(38.13, -78.45));
        assert!((11_000.0..11_300.0).contains(&d), "distance was {}", d);
        assert_eq!(haversine_km(Coordinates::new(1.0, 2.0), Coordinates::new(1.0, 2.0)), 0.0);
    }

    #[test]
    fn test_cost_only_prefers_cheapest() {
        let candidates = vec![
            spec("mid", 2, 0.2, "r"),
            spec("cheap", 2, 0.1, "r"),
            spec("pricey", 2, 0.4, "r"),
        ];
        let weights = PriorityWeights {
            cost: 1.0,
            performance: 0.0,
            location: 0.0,
        };

        let ranked = rank_specs(candidates, None, &weights, &RegionTable::new());
        assert_eq!(ids(&ranked), vec!["cheap", "mid", "pricey"]);
        assert_eq!(ranked[0].spec.order_in_filtered_result, 1);
        assert_eq!(ranked[2].spec.order_in_filtered_result, 3);
    }

    #[test]
    fn test_unknown_cost_scores_zero() {
        let candidates = vec![spec("unpriced", 2, UNKNOWN, "r"), spec("priced", 2, 0.5, "r")];
        let weights = PriorityWeights {
            cost: 1.0,
            performance: 0.0,
            location: 0.0,
        };

        let ranked = rank_specs(candidates, None, &weights, &RegionTable::new());
        assert_eq!(ids(&ranked), vec!["priced", "unpriced"]);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_performance_uses_evaluation_score_when_present() {
        let mut benchmarked = spec("benchmarked", 2, 0.1, "r");
        benchmarked.evaluation_score = 1000.0;
        let candidates = vec![spec("big", 64, 0.1, "r"), benchmarked];
        let weights = PriorityWeights {
            cost: 0.0,
            performance: 1.0,
            location: 0.0,
        };

        let ranked = rank_specs(candidates, None, &weights, &RegionTable::new());
        assert_eq!(ids(&ranked), vec!["benchmarked", "big"]);
    }

    #[test]
    fn test_locality_prefers_nearest_region() {
        let candidates = vec![
            spec("virginia", 2, 0.1, "us-east-1"),
            spec("nowhere", 2, 0.1, "mars-1"),
            spec("seoul", 2, 0.1, "ap-northeast-2"),
        ];
        let weights = PriorityWeights {
            cost: 0.0,
            performance: 0.0,
            location: 1.0,
        };
        let tokyo = Coordinates::new(35.68, 139.69);

        let ranked = rank_specs(candidates, Some(tokyo), &weights, &regions());
        assert_eq!(ids(&ranked), vec!["seoul", "virginia", "nowhere"]);
    }

    #[test]
    fn test_zero_weights_keep_catalog_order() {
        let candidates = vec![spec("c", 8, 0.9, "r"), spec("a", 1, 0.1, "r"), spec("b", 4, 0.5, "r")];
        let weights = PriorityWeights {
            cost: 0.0,
            performance: 0.0,
            location: 0.0,
        };

        let ranked = rank_specs(candidates, None, &weights, &RegionTable::new());
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let weights = PriorityWeights {
            cost: -1.0,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }
}
