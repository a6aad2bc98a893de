mod common;

use marketplace_flow::{
    FsManifestSource, ManifestStore, MarketplaceError, PriceManifestProvider,
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

fn provider(root: &std::path::Path) -> PriceManifestProvider<FsManifestSource> {
    let store = Arc::new(ManifestStore::new(FsManifestSource::new(root)));
    PriceManifestProvider::new(store, "price")
}

#[tokio::test]
async fn test_price_manifest_lookup_ignores_case() {
    let tree = common::manifest_tree();
    let provider = provider(tree.path());

    let upper = assert_ok!(provider.get_price_manifest("Patient").await);
    let lower = assert_ok!(provider.get_price_manifest("patient").await);

    assert_eq!(upper, lower);
    assert_eq!(lower.price_points.len(), 3);
    assert_eq!(lower.questions[0].id, "selectedPrice");
}

#[tokio::test]
async fn test_unknown_provisioning_type_is_not_found() {
    let tree = common::manifest_tree();
    let err = assert_err!(provider(tree.path()).get_price_manifest("on-demand").await);

    match err {
        MarketplaceError::ManifestNotFound { path } => {
            assert!(path.contains("on-demand"), "unexpected path: {}", path)
        }
        other => panic!("expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_loading_twice_gives_equal_manifests() {
    let tree = common::manifest_tree();
    let store = ManifestStore::new(FsManifestSource::new(tree.path()));

    let first = assert_ok!(store.load("pages/order/manifest.json").await);
    let second = assert_ok!(store.load("pages/order/manifest.json").await);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_malformed_manifest_is_parse_error() {
    let tree = common::manifest_tree();
    let store = ManifestStore::new(FsManifestSource::new(tree.path()));

    let err = assert_err!(store.load("pages/broken/manifest.json").await);
    assert!(matches!(err, MarketplaceError::ManifestParse { .. }));
}

#[tokio::test]
async fn test_store_sees_changes_on_disk() {
    let tree = common::manifest_tree();
    let store = ManifestStore::new(FsManifestSource::new(tree.path()));
    let path = tree.path().join("price/declarative/manifest.json");

    let before = assert_ok!(store.load("price/declarative/manifest.json").await);
    std::fs::write(&path, r#"{"questions":[{"id":"units"}]}"#).unwrap();
    let after = assert_ok!(store.load("price/declarative/manifest.json").await);

    assert_eq!(before.questions[0].id, "quantity");
    assert_eq!(after.questions[0].id, "units");
}

#[test]
fn test_price_formatting_examples() {
    use marketplace_flow::format_price;

    assert_eq!(format_price(10.0).unwrap(), "10.00");
    assert_eq!(format_price(1000.0).unwrap(), "1,000.00");
    assert_eq!(format_price(999.999).unwrap(), "999.99");
    assert_eq!(format_price(1234.56).unwrap(), "1,234.56");
    assert_eq!(format_price(12.011).unwrap(), "12.01");
}
