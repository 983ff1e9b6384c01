//! Typed asset helpers end to end against the in-memory catalog.

use atlan_client::assets::{
    AssetKind, Column, Database, Glossary, GlossaryTerm, Process, Schema, Table, View,
};
use atlan_client::model::{AnnouncementType, AssetRef, AtlanTag, CertificateStatus};
use atlan_client::testing::{
    assert_invalid_request, assert_not_found, sample_catalog, SampleCatalog, SAMPLE_CONNECTION_QN,
};
use atlan_client::{CatalogConnector, MockCatalogConnector, SaveOptions};

fn setup() -> (SampleCatalog, MockCatalogConnector) {
    let sample = sample_catalog().unwrap();
    let mock = sample.mock();
    (sample, mock)
}

fn orders_qn(sample: &SampleCatalog) -> String {
    sample.tables[0].qualified_name().unwrap().to_string()
}

#[tokio::test]
async fn test_hierarchy_save_resolves_parent_references() {
    let mock = MockCatalogConnector::new("fresh");
    let database = Database::creator("RAW", SAMPLE_CONNECTION_QN).unwrap();
    let schema = Schema::creator("EVENTS", database.qualified_name().unwrap()).unwrap();
    let table = Table::creator("CLICKS", schema.qualified_name().unwrap()).unwrap();
    let temp_schema_guid = schema.guid.clone().unwrap();

    let response = mock
        .save(
            vec![database.into_asset(), schema.into_asset(), table.into_asset()],
            SaveOptions::default(),
        )
        .await
        .unwrap();
    assert_eq!(response.created_assets().len(), 3);
    assert_eq!(response.guid_assignments.len(), 3);

    let schema_guid = response.assigned_guid(&temp_schema_guid).unwrap();
    let table = Table::get(
        &mock,
        &format!("{}/RAW/EVENTS/CLICKS", SAMPLE_CONNECTION_QN),
        true,
    )
    .await
    .unwrap();
    let parent = table.reference("atlanSchema").unwrap();
    assert_eq!(parent.guid(), Some(schema_guid));
    let database_qn = format!("{}/RAW", SAMPLE_CONNECTION_QN);
    assert_eq!(table.database_qualified_name(), Some(database_qn.as_str()));
    assert_eq!(
        table.schema_qualified_name(),
        Some(format!("{}/EVENTS", database_qn).as_str())
    );
}

#[tokio::test]
async fn test_get_by_typed_helpers() {
    let (sample, mock) = setup();
    let qn = orders_qn(&sample);

    let by_name = Table::get_by_qualified_name(&mock, &qn, false).await.unwrap();
    let by_guid = Table::get_by_guid(&mock, by_name.guid.as_deref().unwrap(), false)
        .await
        .unwrap();
    assert_eq!(by_guid.description(), Some("Raw orders"));

    assert_not_found(&View::get_by_qualified_name(&mock, &qn, false).await);
    let column = Column::get(&mock, sample.column.qualified_name().unwrap(), false)
        .await
        .unwrap();
    assert_eq!(column.order(), Some(1));
}

#[tokio::test]
async fn test_remove_description_and_owners() {
    let (sample, mock) = setup();
    let qn = orders_qn(&sample);

    let updated = Table::remove_description(&mock, &qn, "ORDERS")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.description(), None);
    assert_eq!(updated.owner_users(), vec!["jo".to_string()]);

    // Nothing left to clear.
    assert!(Table::remove_description(&mock, &qn, "ORDERS").await.unwrap().is_none());

    let updated = Table::remove_owners(&mock, &qn, "ORDERS").await.unwrap().unwrap();
    assert!(updated.owner_users().is_empty());
}

#[tokio::test]
async fn test_certificate_lifecycle() {
    let (sample, mock) = setup();
    let qn = orders_qn(&sample);

    let certified = Table::update_certificate(
        &mock,
        &qn,
        "ORDERS",
        CertificateStatus::Verified,
        Some("Reviewed by finance"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(certified.certificate_status(), Some(CertificateStatus::Verified));
    assert_eq!(certified.certificate_status_message(), Some("Reviewed by finance"));

    let unchanged = Table::update_certificate(
        &mock,
        &qn,
        "ORDERS",
        CertificateStatus::Verified,
        Some("Reviewed by finance"),
    )
    .await
    .unwrap();
    assert!(unchanged.is_none());

    let cleared = Table::remove_certificate(&mock, &qn, "ORDERS").await.unwrap().unwrap();
    assert_eq!(cleared.certificate_status(), None);
    assert_eq!(cleared.certificate_status_message(), None);
}

#[tokio::test]
async fn test_announcement_lifecycle() {
    let (sample, mock) = setup();
    let qn = orders_qn(&sample);

    let announced = Table::update_announcement(
        &mock,
        &qn,
        "ORDERS",
        AnnouncementType::Warning,
        "Backfill running",
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(announced.announcement_type(), Some(AnnouncementType::Warning));
    assert_eq!(announced.announcement_title(), Some("Backfill running"));
    assert_eq!(announced.announcement_message(), None);

    let cleared = Table::remove_announcement(&mock, &qn, "ORDERS").await.unwrap().unwrap();
    assert_eq!(cleared.announcement_type(), None);
    assert_eq!(cleared.announcement_title(), None);
}

#[tokio::test]
async fn test_updaters_do_not_create_missing_assets() {
    let mock = MockCatalogConnector::new("empty");
    let qn = format!("{}/ANALYTICS/SALES/NOPE", SAMPLE_CONNECTION_QN);

    assert_not_found(
        &Table::update_certificate(&mock, &qn, "NOPE", CertificateStatus::Verified, None).await,
    );
    assert_not_found(&Table::remove_description(&mock, &qn, "NOPE").await);
    assert_not_found(&Table::replace_terms(&mock, &qn, "NOPE", &[]).await);
    assert!(mock.is_empty().await);
}

#[tokio::test]
async fn test_updater_requires_name() {
    let (sample, mock) = setup();
    let result = Table::remove_description(&mock, &orders_qn(&sample), "").await;
    assert_invalid_request(&result);
}

async fn saved_terms(mock: &MockCatalogConnector) -> (AssetRef, AssetRef) {
    let glossary = Glossary::creator("Finance").unwrap();
    let glossary_qn = glossary.qualified_name().unwrap().to_string();
    let revenue = GlossaryTerm::creator("Revenue", &glossary_qn).unwrap();
    let margin = GlossaryTerm::creator("Margin", &glossary_qn).unwrap();
    let revenue_qn = revenue.qualified_name().unwrap().to_string();
    let margin_qn = margin.qualified_name().unwrap().to_string();

    mock.save(
        vec![glossary.into_asset(), revenue.into_asset(), margin.into_asset()],
        SaveOptions::default(),
    )
    .await
    .unwrap();

    let revenue = GlossaryTerm::get(mock, &revenue_qn, false).await.unwrap();
    let margin = GlossaryTerm::get(mock, &margin_qn, false).await.unwrap();
    let anchor = revenue.anchor().unwrap();
    assert_eq!(anchor.qualified_name(), Some(glossary_qn.as_str()));
    (
        GlossaryTerm::ref_by_guid(revenue.guid.as_deref().unwrap()),
        GlossaryTerm::ref_by_guid(margin.guid.as_deref().unwrap()),
    )
}

#[tokio::test]
async fn test_term_assignment() {
    let (sample, mock) = setup();
    let qn = orders_qn(&sample);
    let (revenue, margin) = saved_terms(&mock).await;

    let updated = Table::append_terms(&mock, &qn, &[revenue.clone()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_terms().len(), 1);

    // Already assigned.
    assert!(Table::append_terms(&mock, &qn, &[revenue.clone()]).await.unwrap().is_none());

    let updated = Table::append_terms(&mock, &qn, &[margin.clone()])
        .await
        .unwrap()
        .unwrap();
    let assigned = updated.assigned_terms();
    assert_eq!(assigned.len(), 2);
    assert!(assigned.iter().all(|t| t.qualified_name().is_some()));

    let updated = Table::remove_terms(&mock, &qn, &[revenue.clone()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.assigned_terms().len(), 1);
    assert!(updated.assigned_terms()[0].same_target(&margin));

    assert!(Table::remove_terms(&mock, &qn, &[revenue]).await.unwrap().is_none());

    let cleared = Table::replace_terms(&mock, &qn, "ORDERS", &[]).await.unwrap().unwrap();
    assert!(cleared.assigned_terms().is_empty());
}

#[tokio::test]
async fn test_terms_by_qualified_name_match_guid_only_assignments() {
    let sample = sample_catalog().unwrap();
    let qn = orders_qn(&sample);
    let glossary = Glossary::creator("Finance").unwrap();
    let mut revenue = GlossaryTerm::creator("Revenue", glossary.qualified_name().unwrap()).unwrap();
    let revenue_guid = "5d1c7b2a-8e3f-4a6b-9c0d-1e2f3a4b5c6d";
    revenue.guid = Some(revenue_guid.to_string());
    let revenue_qn = revenue.qualified_name().unwrap().to_string();
    // Assigned terms as the server returns them: GUID only.
    let orders = sample.tables[0]
        .clone()
        .with_assigned_terms(vec![GlossaryTerm::ref_by_guid(revenue_guid)]);
    let mock = MockCatalogConnector::with_assets(
        "terms",
        vec![glossary.into_asset(), revenue.into_asset(), orders.into_asset()],
    );
    let by_name = GlossaryTerm::ref_by_qualified_name(&revenue_qn);

    assert!(Table::append_terms(&mock, &qn, &[by_name.clone()])
        .await
        .unwrap()
        .is_none());

    let updated = Table::remove_terms(&mock, &qn, &[by_name]).await.unwrap().unwrap();
    assert!(updated.assigned_terms().is_empty());
}

#[tokio::test]
async fn test_tags_keep_propagated_ones() {
    let sample = sample_catalog().unwrap();
    let qn = orders_qn(&sample);
    let mut orders = sample.tables[0].as_asset().clone();
    let mut inherited = AtlanTag::of("Finance");
    inherited.entity_guid = Some("9c0b7e6a-1111-4222-8333-444455556666".to_string());
    orders.classifications = Some(vec![inherited]);
    let mock = MockCatalogConnector::with_assets("tags", vec![orders]);

    let updated = Table::append_atlan_tags(&mock, &qn, &["PII"], true, true, false)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.atlan_tag_names(), vec!["Finance", "PII"]);
    let pii = &updated.atlan_tags()[1];
    assert_eq!(pii.propagate, Some(true));
    assert_eq!(pii.remove_propagations_on_entity_delete, Some(true));
    assert_eq!(pii.entity_guid, updated.guid);

    // Already present.
    assert!(Table::append_atlan_tags(&mock, &qn, &["PII"], false, false, false)
        .await
        .unwrap()
        .is_none());

    // A propagated tag is not directly assigned, so it cannot be removed here.
    assert_not_found(&Table::remove_atlan_tag(&mock, &qn, "Finance").await);

    let updated = Table::remove_atlan_tag(&mock, &qn, "PII").await.unwrap().unwrap();
    assert_eq!(updated.atlan_tag_names(), vec!["Finance"]);
}

#[tokio::test]
async fn test_archive_and_restore_helpers() {
    let (sample, mock) = setup();
    let qn = sample.view.qualified_name().unwrap().to_string();
    let guid = View::get(&mock, &qn, false).await.unwrap().guid.clone().unwrap();

    // Active assets need no restore.
    assert!(View::restore(&mock, &qn).await.unwrap());

    View::archive(&mock, &guid).await.unwrap();
    assert!(View::get(&mock, &qn, false).await.unwrap().is_archived());
    assert_eq!(View::select(false).count(&mock).await.unwrap(), 0);
    assert_eq!(View::select(true).count(&mock).await.unwrap(), 1);

    assert!(View::restore(&mock, &qn).await.unwrap());
    assert!(!View::get(&mock, &qn, false).await.unwrap().is_archived());

    View::purge(&mock, &guid).await.unwrap();
    assert!(!View::restore(&mock, &qn).await.unwrap());
    assert_not_found(&View::archive(&mock, &guid).await);
}

#[tokio::test]
async fn test_process_links_saved_endpoints() {
    let (sample, mock) = setup();
    let process = Process::creator(
        "load_daily_revenue",
        SAMPLE_CONNECTION_QN,
        None,
        vec![Table::ref_by_qualified_name(&orders_qn(&sample))],
        vec![View::ref_by_qualified_name(sample.view.qualified_name().unwrap())],
        None,
    )
    .unwrap()
    .with_sql("INSERT INTO DAILY_REVENUE SELECT ...");
    let process_qn = process.qualified_name().unwrap().to_string();
    assert!(process_qn.starts_with(SAMPLE_CONNECTION_QN));

    mock.save(vec![process.into_asset()], SaveOptions::default())
        .await
        .unwrap();

    let saved = Process::get(&mock, &process_qn, true).await.unwrap();
    let orders_guid = Table::get(&mock, &orders_qn(&sample), false)
        .await
        .unwrap()
        .guid
        .clone()
        .unwrap();
    assert_eq!(saved.inputs()[0].guid(), Some(orders_guid.as_str()));
    assert_eq!(saved.outputs().len(), 1);
    assert_eq!(saved.sql(), Some("INSERT INTO DAILY_REVENUE SELECT ..."));
}
