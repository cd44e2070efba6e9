//! cgctl spec

use super::{done, print_json};
use crate::{FilterArgs, SpecCommands};
use anyhow::{Context, anyhow};
use cloudgrid_registry::{
    Coordinates, PriorityWeights, Range, Registry, Requirement, SortKey, SortOrder, SpecField,
    SpecFilter, SpecUpdate, StringField, StringMatch, sort_specs,
};
use colored::Colorize;

pub async fn handle(registry: &Registry, ns: &str, action: SpecCommands) -> anyhow::Result<()> {
    match action {
        SpecCommands::Fetch { connections } => {
            let report = registry.fetch_specs(ns, &connections).await?;
            for failure in &report.failed {
                eprintln!(
                    "{} {}: {}",
                    "✗".red(),
                    failure.connection_name.yellow(),
                    failure.error
                );
            }
            done(format!(
                "Registered {} spec(s), {} failure(s)",
                report.registered.len(),
                report.failed.len()
            ));
            print_json(&report)
        }
        SpecCommands::Filter {
            filter,
            sort,
            order,
        } => {
            let filter = build_filter(&filter)?;
            let mut specs = registry.filter_specs_by_range(ns, &filter).await?;
            if let Some(sort) = sort {
                let key: SortKey = sort.parse()?;
                let order: SortOrder = order.parse()?;
                sort_specs(&mut specs, key, order);
            }
            print_json(&specs)
        }
        SpecCommands::Recommend {
            filter,
            latitude,
            longitude,
            limit,
            weight_cost,
            weight_performance,
            weight_location,
        } => {
            let requirement = Requirement {
                filter: build_filter(&filter)?,
                location: latitude.zip(longitude).map(|(lat, lon)| Coordinates::new(lat, lon)),
                limit,
            };
            let weights = PriorityWeights {
                cost: weight_cost,
                performance: weight_performance,
                location: weight_location,
            };
            print_json(&registry.recommend_spec(ns, &requirement, &weights).await?)
        }
        SpecCommands::Update {
            id,
            cost,
            score,
            description,
            os_type,
        } => {
            let update = SpecUpdate {
                cost_per_hour: cost,
                evaluation_score: score,
                description,
                os_type,
            };
            let spec = registry.update_spec(ns, &id, &update).await?;
            done(format!("Updated spec '{}'", spec.id));
            print_json(&spec)
        }
    }
}

fn build_filter(args: &FilterArgs) -> anyhow::Result<SpecFilter> {
    let mut filter = match &args.filter_file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid filter in {}", path.display()))?
        }
        None => SpecFilter::new(),
    };

    for raw in &args.ranges {
        let (field, range) = parse_range(raw)?;
        filter = filter.range(field, range);
    }
    for raw in &args.exact {
        let (field, value) = parse_pair(raw)?;
        filter = filter.string(field.parse::<StringField>()?, value, StringMatch::Exact);
    }
    for raw in &args.contains {
        let (field, value) = parse_pair(raw)?;
        filter = filter.string(field.parse::<StringField>()?, value, StringMatch::Contains);
    }
    Ok(filter)
}

fn parse_pair(raw: &str) -> anyhow::Result<(&str, &str)> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim(), v.trim()))
        .ok_or_else(|| anyhow!("expected field=value, got '{}'", raw))
}

/// `vCPU=2:4`, `memoryGiB=8:`, `costPerHour=:0.1`, or `vCPU=4` for an exact value
fn parse_range(raw: &str) -> anyhow::Result<(SpecField, Range)> {
    let (field, bounds) = parse_pair(raw)?;
    let field: SpecField = field.parse()?;

    let bound = |s: &str| -> anyhow::Result<Option<f64>> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        let value = s
            .parse::<f64>()
            .with_context(|| format!("invalid bound '{}' in '{}'", s, raw))?;
        Ok(Some(value))
    };

    let range = match bounds.split_once(':') {
        Some((min, max)) => Range::new(bound(min)?, bound(max)?),
        None => {
            let exact = bound(bounds)?;
            Range::new(exact, exact)
        }
    };
    Ok((field, range))
}
