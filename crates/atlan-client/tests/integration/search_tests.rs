//! Fluent search against the in-memory catalog.

use atlan_client::assets::{Column, Table, View};
use atlan_client::model::{AtlanTag, CertificateStatus};
use atlan_client::search::{fields, tagged, Aggregation, FluentSearch, Query, SortOrder};
use atlan_client::testing::{sample_catalog, SAMPLE_CONNECTION_QN};
use atlan_client::MockCatalogConnector;

fn sample_mock() -> MockCatalogConnector {
    sample_catalog().unwrap().mock()
}

fn names(assets: &[atlan_client::model::Asset]) -> Vec<&str> {
    assets.iter().filter_map(|a| a.name()).collect()
}

#[tokio::test]
async fn test_select_by_type_and_super_type() {
    let mock = sample_mock();

    let tables = Table::select(false).all_of::<Table>(&mock).await.unwrap();
    assert_eq!(tables.len(), 2);

    let sql = FluentSearch::new()
        .filter(fields::SUPER_TYPE_NAMES.eq("SQL"))
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(sql, 6);

    let everything = FluentSearch::new().all(&mock).await.unwrap();
    assert_eq!(everything.len(), 7);
}

#[tokio::test]
async fn test_all_of_skips_other_types() {
    let mock = sample_mock();
    let search = FluentSearch::new().filter(fields::QUALIFIED_NAME.starts_with(format!(
        "{}/ANALYTICS/SALES/",
        SAMPLE_CONNECTION_QN
    )));

    assert_eq!(search.count(&mock).await.unwrap(), 4);
    let views = search.all_of::<View>(&mock).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].name(), Some("DAILY_REVENUE"));
}

#[tokio::test]
async fn test_sort_and_paging() {
    let mock = sample_mock();
    let search = Table::select(false)
        .sort(fields::NAME.order(SortOrder::Desc))
        .page_size(1);

    let response = search.execute(&mock).await.unwrap();
    assert_eq!(response.approximate_count, 2);
    assert_eq!(names(&response.entities), vec!["ORDERS"]);

    let all = search.all(&mock).await.unwrap();
    assert_eq!(names(&all), vec!["ORDERS", "CUSTOMERS"]);

    let first = Table::select(false)
        .sort(fields::NAME.order(SortOrder::Asc))
        .first(&mock)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.name(), Some("CUSTOMERS"));
}

#[tokio::test]
async fn test_negation_and_should_clauses() {
    let mock = sample_mock();

    let unowned = Table::select(false)
        .filter_not(fields::OWNER_USERS.eq("jo"))
        .all(&mock)
        .await
        .unwrap();
    assert_eq!(names(&unowned), vec!["CUSTOMERS"]);

    let either = FluentSearch::new()
        .filter_some(fields::OWNER_USERS.eq("jo"))
        .filter_some(fields::OWNER_USERS.eq("sam"))
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(either, 2);

    // Both should clauses must match.
    let both = Table::select(false)
        .filter_some(fields::OWNER_USERS.eq("jo"))
        .filter_some(fields::DESCRIPTION.matches("orders"))
        .min_somes(2)
        .all(&mock)
        .await
        .unwrap();
    assert_eq!(names(&both), vec!["ORDERS"]);
}

#[tokio::test]
async fn test_text_match_and_exists() {
    let mock = sample_mock();

    let matched = FluentSearch::new()
        .filter(fields::DESCRIPTION.matches("RAW data"))
        .all(&mock)
        .await
        .unwrap();
    assert_eq!(names(&matched), vec!["ORDERS"]);

    let described = FluentSearch::new()
        .filter(Query::Exists {
            field: "description".to_string(),
        })
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(described, 1);

    let owned = FluentSearch::new()
        .filter(fields::OWNER_USERS.has_any_value())
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(owned, 2);
}

#[tokio::test]
async fn test_terms_aggregation() {
    let mock = sample_mock();
    let response = FluentSearch::new()
        .filter(fields::CONNECTION_QUALIFIED_NAME.eq(SAMPLE_CONNECTION_QN))
        .aggregate(
            "types",
            Aggregation::Terms {
                field: fields::TYPE_NAME.name.to_string(),
                size: 10,
            },
        )
        .page_size(1)
        .execute(&mock)
        .await
        .unwrap();

    let buckets = response.buckets("types");
    assert_eq!(buckets[0].key, "Table");
    assert_eq!(buckets[0].doc_count, 2);
    assert_eq!(buckets.len(), 5);
    assert!(response.buckets("missing").is_empty());
}

#[tokio::test]
async fn test_archived_assets_excluded_by_active() {
    let mock = sample_mock();
    let column_guid = Column::select(false)
        .first(&mock)
        .await
        .unwrap()
        .and_then(|c| c.guid)
        .unwrap();
    Column::archive(&mock, &column_guid).await.unwrap();

    assert_eq!(Column::select(false).count(&mock).await.unwrap(), 0);
    assert_eq!(Column::select(true).count(&mock).await.unwrap(), 1);
    assert_eq!(
        FluentSearch::new()
            .filter(fields::STATUS.eq("DELETED"))
            .count(&mock)
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_tagged_matches_direct_and_propagated() {
    let sample = sample_catalog().unwrap();
    let mut assets = sample.assets();
    let orders_guid = "0f8d2c1e-5b4a-4c3d-9e8f-7a6b5c4d3e2f".to_string();
    for asset in assets.iter_mut() {
        match asset.name() {
            Some("ORDERS") => {
                asset.guid = Some(orders_guid.clone());
                asset.classifications = Some(vec![AtlanTag::of("PII")]);
            }
            Some("ORDER_ID") => {
                let mut inherited = AtlanTag::of("PII");
                inherited.entity_guid = Some(orders_guid.clone());
                asset.classifications = Some(vec![inherited]);
            }
            _ => {}
        }
    }
    let mock = MockCatalogConnector::with_assets("tagged", assets);

    let query = tagged(&mock, &["PII"]).await.unwrap();
    let hits = FluentSearch::new().filter(query).all(&mock).await.unwrap();
    let mut hit_names = names(&hits);
    hit_names.sort();
    assert_eq!(hit_names, vec!["ORDERS", "ORDER_ID"]);

    let direct_only = FluentSearch::new()
        .filter(fields::ATLAN_TAGS.eq("PII"))
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(direct_only, 1);
}

#[tokio::test]
async fn test_numeric_range_on_timestamps() {
    let sample = sample_catalog().unwrap();
    let mut assets = sample.assets();
    for (i, asset) in assets.iter_mut().enumerate() {
        asset.create_time = Some(1_700_000_000_000 + i as i64 * 1_000);
    }
    let mock = MockCatalogConnector::with_assets("timed", assets);

    let recent = FluentSearch::new()
        .filter(fields::CREATE_TIME.gte(1_700_000_005_000))
        .all(&mock)
        .await
        .unwrap();
    let mut recent_names = names(&recent);
    recent_names.sort();
    assert_eq!(recent_names, vec!["DAILY_REVENUE", "ORDER_ID"]);

    let window = FluentSearch::new()
        .filter(fields::CREATE_TIME.between(1_700_000_001_000, 1_700_000_002_000))
        .count(&mock)
        .await
        .unwrap();
    assert_eq!(window, 2);
}

#[tokio::test]
async fn test_certified_filter_uses_enum_value() {
    let mock = sample_mock();
    let qn = sample_catalog().unwrap().tables[1]
        .qualified_name()
        .unwrap()
        .to_string();
    Table::update_certificate(&mock, &qn, "CUSTOMERS", CertificateStatus::Draft, None)
        .await
        .unwrap();

    let drafts = FluentSearch::new()
        .filter(fields::CERTIFICATE_STATUS.eq(CertificateStatus::Draft.as_str()))
        .all_of::<Table>(&mock)
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].name(), Some("CUSTOMERS"));
}
