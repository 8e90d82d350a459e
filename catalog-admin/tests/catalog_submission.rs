// catalog-admin/tests/catalog_submission.rs
// Creation-form orchestration against a fault-injecting backend

mod common;

use catalog_admin::catalog::{
    AddonGroupDraft, CatalogResolver, CategoryPath, EntityOutcome, NoticeLevel, OnFailure, Phase,
    SubmissionPolicy, SubmissionService, VariantDraft,
};
use catalog_admin::CatalogError;
use common::{addon, draft, png, variant, Call, FaultyBackend};
use serde_json::json;
use shared::models::tables;

fn service(faulty: &std::sync::Arc<FaultyBackend>) -> SubmissionService {
    SubmissionService::new(faulty.backend(), SubmissionPolicy::default())
}

#[tokio::test]
async fn test_resolver_inserts_exactly_once_for_new_path() {
    let faulty = FaultyBackend::new();
    let path = CategoryPath::new("Furniture", Some("Chairs".into()), None);

    let resolution = CatalogResolver::new(&*faulty).resolve(&path).await.unwrap();
    assert!(resolution.created);
    assert_eq!(faulty.inserts(tables::PRODUCTS), 1);
    assert_eq!(faulty.rows(tables::PRODUCTS)[0]["id"], resolution.product_id);
}

#[tokio::test]
async fn test_resolver_reuses_single_match_without_insert() {
    let faulty = FaultyBackend::new();
    faulty.seed(
        tables::PRODUCTS,
        [json!({ "id": 7, "category": "Furniture", "subcategory": "Chairs", "subcategory1": null })],
    );

    let resolution = CatalogResolver::new(&*faulty)
        .resolve(&CategoryPath::new("Furniture", Some("Chairs".into()), None))
        .await
        .unwrap();
    assert_eq!(resolution.product_id, 7);
    assert!(!resolution.created);
    assert_eq!(faulty.inserts(tables::PRODUCTS), 0);
}

#[tokio::test]
async fn test_mesh_chair_scenario() {
    let faulty = FaultyBackend::new();
    let report = service(&faulty)
        .submit(draft(vec![variant("Mesh Chair", 99)]))
        .await
        .unwrap();

    let product_id = report.product_id.unwrap();
    assert!(report.product_created);
    assert_eq!(faulty.rows(tables::PRODUCTS).len(), 1);

    let variants = faulty.rows(tables::PRODUCT_VARIANTS);
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0]["image"], format!("Mesh Chair-main-{product_id}"));
    assert_eq!(variants[0]["price"], 99.0);
    assert_eq!(variants[0]["product_id"], product_id);
    assert!(report.halted.is_none());
}

#[tokio::test]
async fn test_incomplete_variant_makes_no_calls_and_processing_continues() {
    let faulty = FaultyBackend::new();
    let incomplete = VariantDraft {
        title: Some("No Price".into()),
        price: None,
        main_image: Some(png("np.png")),
        ..Default::default()
    };

    let report = service(&faulty)
        .submit(draft(vec![incomplete, variant("Mesh Chair", 99)]))
        .await
        .unwrap();

    assert!(faulty.uploads().iter().all(|k| !k.starts_with("No Price")));
    assert_eq!(faulty.inserts(tables::PRODUCT_VARIANTS), 1);
    assert!(matches!(
        &report.variants[0].outcome,
        EntityOutcome::Skipped { missing } if missing == &vec!["price".to_string()]
    ));
    assert!(report.variants[1].is_persisted());
}

#[tokio::test]
async fn test_main_image_failure_halts_later_variants() {
    let faulty = FaultyBackend::new();
    faulty.fail_upload("B-main-1");
    let mut form = draft(vec![variant("A", 1), variant("B", 2), variant("C", 3)]);
    form.addon_group = Some(AddonGroupDraft {
        title: "Cushions".into(),
        addons: vec![addon("Linen", 15)],
    });

    let report = service(&faulty).submit(form).await.unwrap();

    let titles: Vec<String> = faulty
        .rows(tables::PRODUCT_VARIANTS)
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["A"]);
    assert!(!faulty.uploads().iter().any(|k| k.starts_with("C-")));

    assert!(report.variants[0].is_persisted());
    assert!(matches!(report.variants[1].outcome, EntityOutcome::Failed { .. }));
    assert_eq!(report.variants[2].outcome, EntityOutcome::NotAttempted);
    assert_eq!(report.halted, Some(Phase::Variants));
    assert!(report.errors().any(|n| n.message.contains("B")));

    // Add-ons still run after the variant phase stops
    assert_eq!(faulty.rows(tables::ADDONS).len(), 1);
    assert_eq!(faulty.rows(tables::ADDON_VARIANTS).len(), 1);
    assert!(report.addons[0].is_persisted());
    assert!(report.addon_category_id.is_some());
}

#[tokio::test]
async fn test_variant_insert_failure_removes_its_uploads() {
    let faulty = FaultyBackend::new();
    faulty.fail_insert(tables::PRODUCT_VARIANTS, Some("Oak"));

    let mut oak = variant("Oak", 120);
    oak.additional_images = vec![png("side.png")];
    let report = service(&faulty).submit(draft(vec![oak])).await.unwrap();

    assert!(matches!(report.variants[0].outcome, EntityOutcome::Failed { .. }));
    assert!(faulty.rows(tables::PRODUCT_VARIANTS).is_empty());
    assert!(faulty.blob_keys().is_empty());
    assert!(faulty.calls().iter().any(|c| matches!(c, Call::Remove(_))));
}

#[tokio::test]
async fn test_additional_image_failure_is_not_fatal() {
    let faulty = FaultyBackend::new();
    faulty.fail_upload("Oak-1-1");

    let mut oak = variant("Oak", 120);
    oak.additional_images = vec![png("a.png"), png("b.png"), png("c.png")];
    let report = service(&faulty).submit(draft(vec![oak])).await.unwrap();

    match &report.variants[0].outcome {
        EntityOutcome::Persisted {
            image_keys,
            failed_images,
            ..
        } => {
            assert_eq!(image_keys, &vec!["Oak-main-1", "Oak-0-1", "Oak-2-1"]);
            assert_eq!(failed_images, &vec![1]);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    let row = &faulty.rows(tables::PRODUCT_VARIANTS)[0];
    assert_eq!(row["additional_images"], json!(["Oak-0-1", "Oak-2-1"]));
    assert!(report.errors().count() == 1);
}

#[tokio::test]
async fn test_addon_upload_failure_does_not_stop_later_addons() {
    let faulty = FaultyBackend::new();
    let mut form = draft(vec![]);
    form.addon_group = Some(AddonGroupDraft {
        title: "Cushions".into(),
        addons: vec![addon("Velvet", 20), addon("Linen", 15)],
    });
    // Add-on category id is 1 in a fresh store
    faulty.fail_upload("Velvet-1");

    let report = service(&faulty).submit(form).await.unwrap();

    assert_eq!(faulty.rows(tables::ADDONS).len(), 1);
    let rows = faulty.rows(tables::ADDON_VARIANTS);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], "Linen");
    assert_eq!(rows[0]["image"], "Linen-1");
    assert_eq!(rows[0]["addonid"], 1);

    assert!(matches!(report.addons[0].outcome, EntityOutcome::Failed { .. }));
    assert!(report.addons[1].is_persisted());
    assert!(report.halted.is_none());
}

#[tokio::test]
async fn test_addon_category_failure_aborts_addon_phase_only() {
    let faulty = FaultyBackend::new();
    faulty.fail_insert(tables::ADDONS, None);
    let mut form = draft(vec![variant("Oak", 120)]);
    form.addon_group = Some(AddonGroupDraft {
        title: "Cushions".into(),
        addons: vec![addon("Linen", 15)],
    });

    let report = service(&faulty).submit(form).await.unwrap();

    assert_eq!(faulty.rows(tables::PRODUCT_VARIANTS).len(), 1);
    assert_eq!(faulty.inserts(tables::ADDON_VARIANTS), 0);
    assert_eq!(report.addons[0].outcome, EntityOutcome::NotAttempted);
    assert_eq!(report.halted, Some(Phase::Addons));
    assert!(report.addon_category_id.is_none());
}

#[tokio::test]
async fn test_resubmission_reuses_product() {
    let faulty = FaultyBackend::new();
    let service = service(&faulty);

    let first = service.submit(draft(vec![variant("Oak", 120)])).await.unwrap();
    let second = service.submit(draft(vec![variant("Walnut", 140)])).await.unwrap();

    assert_eq!(first.product_id, second.product_id);
    assert!(!second.product_created);
    assert_eq!(faulty.rows(tables::PRODUCTS).len(), 1);
    assert_eq!(faulty.rows(tables::PRODUCT_VARIANTS).len(), 2);
    assert_eq!(second.notices[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn test_resolver_query_failure_aborts_without_writes() {
    let faulty = FaultyBackend::new();
    faulty.fail_query(tables::PRODUCTS);

    let err = service(&faulty)
        .submit(draft(vec![variant("Oak", 120)]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Backend(_)));
    assert!(faulty.uploads().is_empty());
    assert_eq!(faulty.inserts(tables::PRODUCTS), 0);
}

#[tokio::test]
async fn test_duplicate_products_are_reported_as_ambiguous() {
    let faulty = FaultyBackend::new();
    let row = json!({ "category": "Furniture", "subcategory": "Chairs", "subcategory1": "Office" });
    let mut first = row.clone();
    first["id"] = json!(1);
    let mut second = row;
    second["id"] = json!(2);
    faulty.seed(tables::PRODUCTS, [first, second]);

    let err = service(&faulty)
        .submit(draft(vec![variant("Oak", 120)]))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::AmbiguousProduct { count: 2, .. }));
    assert!(faulty.uploads().is_empty());
}

#[tokio::test]
async fn test_skip_policy_continues_after_variant_failure() {
    let faulty = FaultyBackend::new();
    faulty.fail_upload("A-main-1");
    let policy = SubmissionPolicy {
        variants: OnFailure::Skip,
        ..Default::default()
    };

    let report = SubmissionService::new(faulty.backend(), policy)
        .submit(draft(vec![variant("A", 1), variant("B", 2)]))
        .await
        .unwrap();

    assert!(report.halted.is_none());
    assert_eq!(report.persisted_variants(), 1);
    assert_eq!(faulty.rows(tables::PRODUCT_VARIANTS)[0]["title"], "B");
}

#[tokio::test]
async fn test_rollback_on_abort_undoes_whole_submission() {
    let faulty = FaultyBackend::new();
    faulty.fail_upload("B-main-1");
    let policy = SubmissionPolicy {
        rollback_on_abort: true,
        ..Default::default()
    };

    let report = SubmissionService::new(faulty.backend(), policy)
        .submit(draft(vec![variant("A", 1), variant("B", 2)]))
        .await
        .unwrap();

    assert!(report.rolled_back);
    assert!(faulty.rows(tables::PRODUCTS).is_empty());
    assert!(faulty.rows(tables::PRODUCT_VARIANTS).is_empty());
    assert!(faulty.blob_keys().is_empty());
}

#[tokio::test]
async fn test_rollback_keeps_reused_product() {
    let faulty = FaultyBackend::new();
    faulty.seed(
        tables::PRODUCTS,
        [json!({ "id": 1, "category": "Furniture", "subcategory": "Chairs", "subcategory1": "Office" })],
    );
    faulty.fail_upload("A-main-1");
    let policy = SubmissionPolicy {
        rollback_on_abort: true,
        ..Default::default()
    };

    let report = SubmissionService::new(faulty.backend(), policy)
        .submit(draft(vec![variant("A", 1)]))
        .await
        .unwrap();

    assert!(report.rolled_back);
    assert_eq!(faulty.rows(tables::PRODUCTS).len(), 1);
}

#[tokio::test]
async fn test_failed_compensation_is_reported() {
    let faulty = FaultyBackend::new();
    faulty.fail_insert(tables::ADDON_VARIANTS, Some("Linen"));
    faulty.fail_delete(tables::PRODUCTS);
    let policy = SubmissionPolicy {
        addons: OnFailure::Halt,
        rollback_on_abort: true,
        ..Default::default()
    };
    let mut form = draft(vec![]);
    form.addon_group = Some(AddonGroupDraft {
        title: "Cushions".into(),
        addons: vec![addon("Linen", 15)],
    });

    let report = SubmissionService::new(faulty.backend(), policy)
        .submit(form)
        .await
        .unwrap();

    assert_eq!(report.halted, Some(Phase::Addons));
    assert!(report.rolled_back);
    assert!(faulty.rows(tables::ADDONS).is_empty());
    assert_eq!(faulty.rows(tables::PRODUCTS).len(), 1);
    assert!(report.errors().any(|n| n.message.starts_with("Rollback incomplete")));
}
