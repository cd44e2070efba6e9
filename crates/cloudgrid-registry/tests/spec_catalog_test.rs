mod common;

use cloudgrid_registry::{
    Coordinates, CreateRequest, PriorityWeights, Range, RegionTable, Registry, RegistryError,
    Requirement, ResourceKind, Spec, SpecField, SpecFilter, SpecReq, SpecUpdate, StringField,
    StringMatch,
};
use cloudgrid_store::MemoryStore;
use common::{CONN, FakeProxy, NS};
use std::sync::Arc;

fn ids(specs: &[Spec]) -> Vec<&str> {
    specs.iter().map(|s| s.id.as_str()).collect()
}

async fn register(registry: &Registry, name: &str, csp_spec_name: &str) {
    registry
        .create(
            NS,
            CreateRequest::Spec(SpecReq {
                name: name.to_string(),
                connection_name: CONN.to_string(),
                csp_spec_name: csp_spec_name.to_string(),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_spec_registration_converts_memory() {
    let (registry, proxy, _) = common::registry();
    proxy.add_spec(CONN, "t3.medium", 2, 4096);

    register(&registry, "t3-medium", "t3.medium").await;

    let spec: Spec = registry.get_as(NS, "t3-medium").await.unwrap();
    assert_eq!(spec.vcpu, 2);
    assert_eq!(spec.memory_gib, 4.0);
    assert_eq!(spec.provider_name, "aws");
    assert_eq!(spec.region_name, "ap-northeast-2");
    assert_eq!(spec.csp_spec_name, "t3.medium");

    // lookup-only: deleting never reaches the proxy
    registry.delete(NS, ResourceKind::Spec, "t3-medium", false).await.unwrap();
    assert_eq!(proxy.call_count("get_spec"), 1);
}

#[tokio::test]
async fn test_vcpu_range_filter_in_catalog_order() {
    let (registry, proxy, _) = common::registry();
    for (name, vcpu) in [("a-1", 1), ("b-2", 2), ("c-4", 4), ("d-8", 8)] {
        proxy.add_spec(CONN, name, vcpu, vcpu * 2048);
        register(&registry, name, name).await;
    }

    let filter = SpecFilter::new().range(SpecField::VCpu, Range::between(2.0, 4.0));
    let specs = registry.filter_specs_by_range(NS, &filter).await.unwrap();
    assert_eq!(ids(&specs), vec!["b-2", "c-4"]);

    let open = SpecFilter::new().range(SpecField::MemoryGiB, Range::new(Some(8.0), None));
    let specs = registry.filter_specs_by_range(NS, &open).await.unwrap();
    assert_eq!(ids(&specs), vec!["c-4", "d-8"]);

    let by_provider = SpecFilter::new().string(StringField::ProviderName, "AWS", StringMatch::Exact);
    assert_eq!(registry.filter_specs_by_range(NS, &by_provider).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_invalid_range_is_rejected() {
    let (registry, _, _) = common::registry();
    let filter = SpecFilter::new().range(SpecField::VCpu, Range::between(4.0, 2.0));
    let err = registry.filter_specs_by_range(NS, &filter).await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_fetch_specs_reports_partial_success() {
    let (registry, proxy, _) = common::registry();
    proxy.add_connection("gcp-asia-east1", "GCP", "asia-east1");
    proxy.add_spec(CONN, "t3.small", 2, 2048);
    proxy.add_spec(CONN, "t3.large", 2, 8192);
    proxy.add_gpu_spec("gcp-asia-east1", "n1-standard-8-t4", 2);

    let connections = vec![
        CONN.to_string(),
        "azure-koreacentral".to_string(),
        "gcp-asia-east1".to_string(),
    ];
    let report = registry.fetch_specs(NS, &connections).await.unwrap();

    assert_eq!(
        report.registered,
        vec![
            "aws-ap-northeast-2-t3-small",
            "aws-ap-northeast-2-t3-large",
            "gcp-asia-east1-n1-standard-8-t4",
        ]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].connection_name, "azure-koreacentral");
    assert!(!report.is_complete());

    let gpu: Spec = registry.get_as(NS, "gcp-asia-east1-n1-standard-8-t4").await.unwrap();
    assert_eq!(gpu.accelerator_count, 2);
    assert_eq!(gpu.accelerator_memory_gb, 32.0);
    assert_eq!(gpu.provider_name, "gcp");
}

#[tokio::test]
async fn test_refetch_keeps_price_and_consumers() {
    let (registry, proxy, _) = common::registry();
    proxy.add_spec(CONN, "t3.small", 2, 2048);
    let connections = vec![CONN.to_string()];

    registry.fetch_specs(NS, &connections).await.unwrap();
    registry
        .update_spec(
            NS,
            "aws-ap-northeast-2-t3-small",
            &SpecUpdate {
                cost_per_hour: Some(0.0208),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = registry.fetch_specs(NS, &connections).await.unwrap();
    assert!(report.is_complete());

    let spec: Spec = registry.get_as(NS, "aws-ap-northeast-2-t3-small").await.unwrap();
    assert_eq!(spec.cost_per_hour, 0.0208);
}

#[tokio::test]
async fn test_update_spec_rejects_non_finite() {
    let (registry, proxy, _) = common::registry();
    proxy.add_spec(CONN, "t3.small", 2, 2048);
    register(&registry, "small", "t3.small").await;

    let err = registry
        .update_spec(
            NS,
            "small",
            &SpecUpdate {
                evaluation_score: Some(f64::NAN),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::InvalidArgument(_)));

    let err = registry
        .update_spec(NS, "missing", &SpecUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_recommend_ranks_and_limits() {
    let proxy = Arc::new(FakeProxy::new());
    proxy.add_connection("aws-us-east-1", "AWS", "us-east-1");
    let regions = RegionTable::from([
        ("ap-northeast-2".to_string(), Coordinates::new(37.36, 126.78)),
        ("us-east-1".to_string(), Coordinates::new(38.13, -78.45)),
    ]);
    let registry = Registry::new(Arc::new(MemoryStore::new()), proxy.clone()).with_regions(regions);

    proxy.add_spec(CONN, "m5.large", 2, 8192);
    proxy.add_spec("aws-us-east-1", "m5.large", 2, 8192);
    proxy.add_spec(CONN, "m5.xlarge", 4, 16384);
    let report = registry
        .fetch_specs(NS, &[CONN.to_string(), "aws-us-east-1".to_string()])
        .await
        .unwrap();
    assert!(report.is_complete());

    for (id, cost) in [
        ("aws-ap-northeast-2-m5-large", 0.118),
        ("aws-us-east-1-m5-large", 0.096),
        ("aws-ap-northeast-2-m5-xlarge", 0.236),
    ] {
        let update = SpecUpdate {
            cost_per_hour: Some(cost),
            ..Default::default()
        };
        registry.update_spec(NS, id, &update).await.unwrap();
    }

    // cheapest first
    let requirement = Requirement {
        filter: SpecFilter::new().range(SpecField::VCpu, Range::between(2.0, 2.0)),
        ..Default::default()
    };
    let cost_only = PriorityWeights {
        cost: 1.0,
        performance: 0.0,
        location: 0.0,
    };
    let ranked = registry.recommend_spec(NS, &requirement, &cost_only).await.unwrap();
    let ranked_ids: Vec<_> = ranked.iter().map(|r| r.spec.id.as_str()).collect();
    assert_eq!(ranked_ids, vec!["aws-us-east-1-m5-large", "aws-ap-northeast-2-m5-large"]);

    // nearest first from Tokyo
    let requirement = Requirement {
        location: Some(Coordinates::new(35.68, 139.69)),
        limit: Some(1),
        ..requirement
    };
    let location_only = PriorityWeights {
        cost: 0.0,
        performance: 0.0,
        location: 1.0,
    };
    let ranked = registry.recommend_spec(NS, &requirement, &location_only).await.unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].spec.id, "aws-ap-northeast-2-m5-large");
    assert_eq!(ranked[0].spec.order_in_filtered_result, 1);
}
