//! Resource services: envelope handling, search, categories, clients CRUD.

use rust_decimal::Decimal;

use comanda_core::{ClientId, ProductId};
use comanda_dashboard::error::ApiError;
use comanda_dashboard::models::{ClientDraft, ProductDraft, format_category_name};

use comanda_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, CATEGORIES, StubBackend, TestApp, USER_EMAIL, USER_PASSWORD,
};

async fn admin_app(stub: &StubBackend, dir: &tempfile::TempDir) -> TestApp {
    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    app.session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin login");
    app
}

// ============================================================================
// Products (enveloped endpoints)
// ============================================================================

#[tokio::test]
async fn test_product_list_unwraps_envelope_and_hides_inactive() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let active = app.products.list().await.expect("list products");
    assert_eq!(active.len(), 3);
    assert!(active.iter().all(|product| product.active));

    let all = app.products.admin_all().await.expect("admin list");
    assert_eq!(all.len(), 4);
    assert!(all.iter().any(|product| !product.active));
}

#[tokio::test]
async fn test_categories_round_trip_with_display_formatting() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let categories = app.products.categories().await.expect("categories");
    assert_eq!(categories, CATEGORIES);

    let formatted: Vec<String> = categories
        .iter()
        .map(|category| format_category_name(category))
        .collect();
    assert_eq!(formatted, ["Pizzas", "Bebidas Alcohólicas", "Postres"]);
}

#[tokio::test]
async fn test_product_search_and_category_filter() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let hits = app.products.search("pizza").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits.first().map(|p| p.id), Some(ProductId::new(1)));

    let postres = app.products.by_category("POSTRES").await.expect("filter");
    assert_eq!(postres.len(), 2);
}

#[tokio::test]
async fn test_product_create_refreshes_the_catalog_snapshot() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    assert_eq!(app.products.catalog().await.expect("catalog").len(), 3);

    let draft = ProductDraft {
        name: "Tarta de queso".to_string(),
        description: None,
        price: Decimal::from(5),
        image_url: None,
        category: "POSTRES".to_string(),
        stock: 12,
        active: true,
    };
    let created = app.products.create(&draft).await.expect("create product");
    assert_eq!(created.name, "Tarta de queso");

    // The mutation invalidated the snapshot.
    assert_eq!(app.products.catalog().await.expect("catalog").len(), 4);

    app.products.delete(created.id).await.expect("delete");
    assert_eq!(app.products.catalog().await.expect("catalog").len(), 3);
}

#[tokio::test]
async fn test_product_update_round_trips_through_the_envelope() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let draft = ProductDraft {
        name: "Cerveza artesana".to_string(),
        description: Some("IPA local".to_string()),
        price: Decimal::new(45, 1),
        image_url: None,
        category: "BEBIDAS_ALCOHOLICAS".to_string(),
        stock: 30,
        active: true,
    };
    let updated = app
        .products
        .update(ProductId::new(2), &draft)
        .await
        .expect("update product");
    assert_eq!(updated.id, ProductId::new(2));
    assert_eq!(updated.name, "Cerveza artesana");
    assert_eq!(updated.price, Decimal::new(45, 1));

    let fetched = app
        .products
        .get_by_id(ProductId::new(2))
        .await
        .expect("refetch");
    assert_eq!(fetched.description.as_deref(), Some("IPA local"));
}

#[tokio::test]
async fn test_product_get_by_id() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let product = app
        .products
        .get_by_id(ProductId::new(2))
        .await
        .expect("get product");
    assert_eq!(product.name, "Cerveza");
    assert_eq!(product.price, Decimal::new(35, 1));

    let err = app
        .products
        .get_by_id(ProductId::new(999))
        .await
        .expect_err("unknown product");
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ============================================================================
// Clients (direct endpoints)
// ============================================================================

#[tokio::test]
async fn test_client_crud_round_trip() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    assert_eq!(app.clients.list().await.expect("list").len(), 2);

    let draft = ClientDraft {
        first_name: "Carlos".to_string(),
        last_name: "Ruiz".to_string(),
        email: Some("carlos@example.com".to_string()),
        phone: None,
        address: None,
    };
    let created = app.clients.create(&draft).await.expect("create client");
    assert_eq!(created.id, ClientId::new(3));
    assert_eq!(created.first_name, "Carlos");

    let updated_draft = ClientDraft {
        phone: Some("600333444".to_string()),
        ..draft
    };
    let updated = app
        .clients
        .update(created.id, &updated_draft)
        .await
        .expect("update client");
    assert_eq!(updated.phone.as_deref(), Some("600333444"));

    assert!(app.clients.delete(created.id).await.expect("delete"));
    // Deleting again reports nothing deleted.
    assert!(!app.clients.delete(created.id).await.expect("re-delete"));

    assert_eq!(app.clients.list().await.expect("list").len(), 2);
}

#[tokio::test]
async fn test_client_search_matches_names() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let hits = app.clients.search("gó").await.expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits.first().map(|c| c.last_name.as_str()), Some("Gómez"));

    assert!(app.clients.search("zzz").await.expect("search").is_empty());
}

#[tokio::test]
async fn test_incomplete_client_draft_issues_no_request() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let before = stub.mutation_count();
    let draft = ClientDraft {
        first_name: "Carlos".to_string(),
        ..ClientDraft::default()
    };
    let err = app.clients.create(&draft).await.expect_err("missing field");
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(stub.mutation_count(), before);
}

#[tokio::test]
async fn test_non_admin_client_and_product_writes_are_blocked() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    app.session
        .login(USER_EMAIL, USER_PASSWORD)
        .await
        .expect("user login");

    let before = stub.mutation_count();

    let draft = ClientDraft {
        first_name: "Eve".to_string(),
        last_name: "Intrusa".to_string(),
        ..ClientDraft::default()
    };
    assert!(matches!(
        app.clients.create(&draft).await.expect_err("not admin"),
        ApiError::Forbidden(_)
    ));
    assert!(matches!(
        app.products
            .delete(ProductId::new(1))
            .await
            .expect_err("not admin"),
        ApiError::Forbidden(_)
    ));

    assert_eq!(stub.mutation_count(), before);

    // Reads still work for plain users.
    assert_eq!(app.clients.list().await.expect("reads allowed").len(), 2);
}
