//! REST connector tests against the fake metadata API.

use super::common::{
    connector_for, query_map, retrying_connector_for, FakeAtlan, CONFIDENTIAL_ID, PII_ID,
};
use atlan_client::assets::{AssetKind, Table};
use atlan_client::catalog::DELETED_TAG_NAME;
use atlan_client::model::{AtlanTag, AtlanTagColor, AtlanTagDef, TypeDefCategory, TypeDefResponse};
use atlan_client::search::{tagged, FluentSearch};
use atlan_client::testing::{assert_healthy, assert_not_found, assert_unhealthy, sample_catalog};
use atlan_client::{
    AtlanConnector, AtlanError, CatalogConnector, Connector, MockCatalogConnector, SaveOptions,
};
use std::sync::atomic::Ordering;

const SCHEMA_QN: &str = "default/snowflake/1700000000/ANALYTICS/SALES";

#[tokio::test]
async fn test_health_check_uses_bearer_token() {
    let fake = FakeAtlan::new();
    let connector = connector_for(&fake).await;

    assert_healthy(&connector.health_check().await);
    assert!(connector.test_connection().await.unwrap());
}

#[tokio::test]
async fn test_health_check_reports_bad_token() {
    let fake = FakeAtlan::new();
    let base_url = fake.spawn().await;
    let connector = AtlanConnector::new(atlan_client::testing::test_atlan_config(
        &base_url,
        "wrong-token",
    ))
    .unwrap();

    assert_unhealthy(&connector.health_check().await);
    let err = connector.test_connection().await.unwrap_err();
    assert!(matches!(err, AtlanError::Authentication(ref m) if m.contains("Invalid API token")));
}

#[tokio::test]
async fn test_unreachable_server_is_unhealthy() {
    let config = atlan_client::testing::test_atlan_config("http://127.0.0.1:1", "t");
    let connector = AtlanConnector::new(config).unwrap();
    assert_unhealthy(&connector.health_check().await);
}

#[tokio::test]
async fn test_save_translates_tags_both_ways() {
    let fake = FakeAtlan::new();
    let connector = connector_for(&fake).await;

    let table = Table::creator("ORDERS", SCHEMA_QN)
        .unwrap()
        .with_atlan_tags(vec![AtlanTag::of("PII")]);
    let response = connector
        .save(vec![table.into_asset()], SaveOptions::replacing_tags())
        .await
        .unwrap();

    let sent = fake.last_request("POST", "/api/meta/entity/bulk").unwrap();
    let params = query_map(&sent);
    assert_eq!(params["replaceClassifications"], "true");
    assert_eq!(params["appendTags"], "false");
    let body = sent.body.unwrap();
    assert_eq!(body["entities"][0]["classifications"][0]["typeName"], PII_ID);

    let created = &response.created_assets()[0];
    assert_eq!(created.atlan_tag_names(), vec!["PII"]);
    assert_eq!(response.guid_assignments.len(), 1);

    let stored = fake.catalog.assets().await;
    assert_eq!(stored[0].atlan_tag_names(), vec![PII_ID]);
}

#[tokio::test]
async fn test_get_routes_and_parameters() {
    let sample = sample_catalog().unwrap();
    let fake = FakeAtlan::with_catalog(sample.mock());
    let connector = connector_for(&fake).await;
    let qn = sample.tables[0].qualified_name().unwrap();

    let table = Table::get(&connector, qn, false).await.unwrap();
    assert_eq!(table.name(), Some("ORDERS"));
    let request = fake
        .last_request("GET", "/api/meta/entity/uniqueAttribute/type/Table")
        .unwrap();
    let params = query_map(&request);
    assert_eq!(params["attr:qualifiedName"], qn);
    assert_eq!(params["minExtInfo"], "true");
    assert_eq!(params["ignoreRelationships"], "true");

    let guid = table.guid.clone().unwrap();
    let by_guid = Table::get(&connector, &guid, true).await.unwrap();
    assert_eq!(by_guid.qualified_name(), Some(qn));
    let request = fake.last_request("GET", "/api/meta/entity/guid/").unwrap();
    assert_eq!(request.path, format!("/api/meta/entity/guid/{}", guid));
    assert_eq!(query_map(&request)["ignoreRelationships"], "false");
}

#[tokio::test]
async fn test_get_missing_and_wrong_type() {
    let sample = sample_catalog().unwrap();
    let fake = FakeAtlan::with_catalog(sample.mock());
    let connector = connector_for(&fake).await;

    let result = Table::get(&connector, &format!("{}/MISSING", SCHEMA_QN), false).await;
    assert_not_found(&result);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("MISSING"), "{}", message);

    let view_guid = fake
        .catalog
        .assets()
        .await
        .into_iter()
        .find(|a| a.type_name == "View")
        .and_then(|a| a.guid)
        .unwrap();
    let err = Table::get(&connector, &view_guid, false).await.unwrap_err();
    assert!(err.to_string().contains("not the type requested"));
}

#[tokio::test]
async fn test_archive_restore_and_purge() {
    let sample = sample_catalog().unwrap();
    let fake = FakeAtlan::with_catalog(sample.mock());
    let connector = connector_for(&fake).await;
    let qn = sample.tables[1].qualified_name().unwrap();
    let guid = Table::get(&connector, qn, false).await.unwrap().guid.clone().unwrap();

    let archived = Table::archive(&connector, &guid).await.unwrap();
    assert_eq!(archived.deleted_assets().len(), 1);
    let request = fake.last_request("DELETE", "/api/meta/entity/bulk").unwrap();
    assert_eq!(request.params("guid"), vec![guid.as_str()]);
    assert_eq!(request.param("deleteType"), Some("SOFT"));

    assert!(Table::restore(&connector, qn).await.unwrap());
    let request = fake.last_request("POST", "/api/meta/entity/restore/bulk").unwrap();
    assert_eq!(request.param("guid"), Some(guid.as_str()));
    assert!(!Table::get(&connector, qn, false).await.unwrap().is_archived());

    Table::purge(&connector, &guid).await.unwrap();
    let request = fake.last_request("DELETE", "/api/meta/entity/bulk").unwrap();
    assert_eq!(request.param("deleteType"), Some("HARD"));
    assert!(!Table::restore(&connector, qn).await.unwrap());
}

#[tokio::test]
async fn test_tag_helpers_over_rest() {
    let sample = sample_catalog().unwrap();
    let fake = FakeAtlan::with_catalog(sample.mock());
    let connector = connector_for(&fake).await;
    let qn = sample.tables[0].qualified_name().unwrap();

    let updated =
        Table::append_atlan_tags(&connector, qn, &["PII", "Confidential"], true, false, false)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(updated.atlan_tag_names(), vec!["PII", "Confidential"]);

    let stored = fake.catalog.get_by_qualified_name("Table", qn, false, false).await.unwrap();
    assert_eq!(stored.atlan_tag_names(), vec![PII_ID, CONFIDENTIAL_ID]);

    let updated = Table::remove_atlan_tag(&connector, qn, "PII").await.unwrap().unwrap();
    assert_eq!(updated.atlan_tag_names(), vec!["Confidential"]);

    let err = Table::remove_atlan_tag(&connector, qn, "PII").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_tag_id_reads_as_deleted() {
    let sample = sample_catalog().unwrap();
    let mut orders = sample.tables[0].as_asset().clone();
    orders.classifications = Some(vec![AtlanTag::of("retiredTagId")]);
    let fake = FakeAtlan::with_catalog(MockCatalogConnector::with_assets("fake", vec![orders]));
    let connector = connector_for(&fake).await;

    let table = Table::get(&connector, sample.tables[0].qualified_name().unwrap(), false)
        .await
        .unwrap();
    assert_eq!(table.atlan_tag_names(), vec![DELETED_TAG_NAME]);
}

#[tokio::test]
async fn test_retired_tag_reloads_typedefs_once() {
    let sample = sample_catalog().unwrap();
    let assets = sample
        .assets()
        .into_iter()
        .map(|mut asset| {
            asset.classifications = Some(vec![AtlanTag::of("retiredTagId")]);
            asset
        })
        .collect();
    let fake = FakeAtlan::with_catalog(MockCatalogConnector::with_assets("fake", assets));
    let connector = connector_for(&fake).await;

    let response = FluentSearch::new().execute(&connector).await.unwrap();
    assert_eq!(response.entities.len(), 7);
    assert!(response
        .entities
        .iter()
        .all(|a| a.atlan_tag_names() == vec![DELETED_TAG_NAME]));
    assert_eq!(fake.typedef_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_tagged_query_uses_cached_ids() {
    let fake = FakeAtlan::new();
    let connector = connector_for(&fake).await;

    let query = tagged(&connector, &["PII"]).await.unwrap();
    let json = query.to_json().to_string();
    assert!(json.contains(PII_ID));
    assert!(!json.contains("\"PII\""));

    tagged(&connector, &["PII", "Confidential"]).await.unwrap();
    assert_eq!(fake.typedef_reads.load(Ordering::SeqCst), 1);

    let err = tagged(&connector, &["Unknown"]).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(fake.typedef_reads.load(Ordering::SeqCst), 2);
    let request = fake.last_request("GET", "/api/meta/types/typedefs").unwrap();
    assert_eq!(request.param("type"), Some("classification"));
}

#[tokio::test]
async fn test_search_pages_until_short_page() {
    let sample = sample_catalog().unwrap();
    let fake = FakeAtlan::with_catalog(sample.mock());
    let connector = connector_for(&fake).await;

    let assets = FluentSearch::new().page_size(2).all(&connector).await.unwrap();
    assert_eq!(assets.len(), sample.assets().len());

    let offsets: Vec<u64> = fake
        .requests()
        .iter()
        .filter(|r| r.path == "/api/meta/search/indexsearch")
        .filter_map(|r| r.body.as_ref().and_then(|b| b["dsl"]["from"].as_u64()))
        .collect();
    assert_eq!(offsets, vec![0, 2, 4, 6]);

    let body = fake
        .last_request("POST", "/api/meta/search/indexsearch")
        .and_then(|r| r.body)
        .unwrap();
    assert_eq!(body["dsl"]["size"], 2);
    assert_eq!(body["suppressLogs"], true);
    assert_eq!(body["dsl"]["sort"][0]["__guid"]["order"], "asc");
}

#[tokio::test]
async fn test_retries_transient_failures() {
    let fake = FakeAtlan::new();
    let connector = retrying_connector_for(&fake, 3).await;
    fake.fail_next(2);

    assert_healthy(&connector.health_check().await);
    let attempts = fake
        .requests()
        .iter()
        .filter(|r| r.path == "/api/service/users/current")
        .count();
    assert_eq!(attempts, 3);
}

#[tokio::test]
async fn test_server_errors_surface_without_retries() {
    let fake = FakeAtlan::new();
    let connector = connector_for(&fake).await;
    fake.fail_next(1);

    let err = connector.test_connection().await.unwrap_err();
    assert!(matches!(err, AtlanError::Api(ref m) if m.contains("temporarily unavailable")));
}

#[tokio::test]
async fn test_typedef_lifecycle() {
    let fake = FakeAtlan::new();
    let connector = connector_for(&fake).await;

    let listed = connector.get_typedefs(TypeDefCategory::AtlanTag).await.unwrap();
    assert_eq!(listed.classification_defs.len(), 2);

    let created = connector
        .create_typedefs(
            &TypeDefResponse::default()
                .with_atlan_tag(AtlanTagDef::creator("Restricted", AtlanTagColor::Yellow)),
        )
        .await
        .unwrap();
    let name = created.classification_defs[0].name.clone();
    assert!(!name.is_empty());
    assert_eq!(connector.atlan_tag_id("Restricted").await.unwrap(), name);

    connector.purge_typedef(&name).await.unwrap();
    let request = fake.last_request("DELETE", "/api/meta/types/typedef/name/").unwrap();
    assert_eq!(request.path, format!("/api/meta/types/typedef/name/{}", name));
    assert!(connector.purge_typedef(&name).await.unwrap_err().is_not_found());
    assert!(connector.atlan_tag_id("Restricted").await.is_err());
}
