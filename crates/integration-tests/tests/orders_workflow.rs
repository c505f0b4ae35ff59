//! The order status workflow: advance, cancel, role gating, totals.

use rust_decimal::Decimal;

use comanda_core::{ClientId, OrderId, OrderStatus, ProductId};
use comanda_dashboard::error::ApiError;
use comanda_dashboard::models::{Order, OrderDraft, OrderLine, compute_total};

use comanda_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, StubBackend, TestApp, USER_EMAIL, USER_PASSWORD,
};

async fn admin_app(stub: &StubBackend, dir: &tempfile::TempDir) -> TestApp {
    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    app.session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("admin login");
    app
}

async fn fetch_order(app: &TestApp, id: i64) -> Order {
    app.orders
        .list()
        .await
        .expect("list orders")
        .into_iter()
        .find(|order| order.id == OrderId::new(id))
        .expect("order exists")
}

// ============================================================================
// Advance
// ============================================================================

#[tokio::test]
async fn test_repeated_advance_walks_the_forward_path() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let id = stub.seed_order("PENDING");
    let expected = [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    let mut order = fetch_order(&app, id).await;
    for step in expected {
        order = app.orders.advance(&order).await.expect("advance");
        assert_eq!(order.status, step);
    }

    // Delivery stamped the delivery timestamp.
    assert!(order.delivered_at.is_some());
}

#[tokio::test]
async fn test_advance_on_terminal_orders_is_rejected_without_a_request() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    for status in ["DELIVERED", "CANCELLED"] {
        let id = stub.seed_order(status);
        let order = fetch_order(&app, id).await;

        let before = stub.mutation_count();
        let err = app.orders.advance(&order).await.expect_err("terminal");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(stub.mutation_count(), before, "no request for {status}");

        // The cached copy is untouched.
        assert_eq!(fetch_order(&app, id).await.status, order.status);
    }
}

// ============================================================================
// Cancel
// ============================================================================

#[tokio::test]
async fn test_cancel_is_reachable_from_every_open_state() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    for status in ["PENDING", "PREPARING", "READY"] {
        let id = stub.seed_order(status);
        let order = fetch_order(&app, id).await;
        let cancelled = app.orders.cancel(&order).await.expect("cancel open order");
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }
}

#[tokio::test]
async fn test_cancel_is_rejected_on_terminal_orders() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    for status in ["DELIVERED", "CANCELLED"] {
        let id = stub.seed_order(status);
        let order = fetch_order(&app, id).await;

        let before = stub.mutation_count();
        let err = app.orders.cancel(&order).await.expect_err("terminal");
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(stub.mutation_count(), before);
    }
}

#[tokio::test]
async fn test_set_status_enforces_transition_rules() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let id = stub.seed_order("PENDING");
    let order = fetch_order(&app, id).await;

    // Skipping ahead is not a permitted transition.
    let err = app
        .orders
        .set_status(&order, OrderStatus::Ready)
        .await
        .expect_err("skip");
    assert!(matches!(err, ApiError::Validation(_)));

    let updated = app
        .orders
        .set_status(&order, OrderStatus::Preparing)
        .await
        .expect("single step");
    assert_eq!(updated.status, OrderStatus::Preparing);
}

// ============================================================================
// Creation and totals
// ============================================================================

#[tokio::test]
async fn test_create_prices_lines_from_the_catalog_snapshot() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let catalog = app.products.catalog().await.expect("catalog");
    let lines = vec![
        OrderLine::new(ProductId::new(1), 2), // pizza at 12.5
        OrderLine::new(ProductId::new(2), 1), // beer at 3.5
    ];
    let draft = OrderDraft::new(ClientId::new(1), lines, &catalog);
    assert_eq!(draft.total, Decimal::new(285, 1));

    let order = app.orders.create(&draft).await.expect("create order");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total, Decimal::new(285, 1));
    assert_eq!(compute_total(&order.lines, &catalog), order.total);
}

#[tokio::test]
async fn test_full_edit_replaces_lines_and_total() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let id = stub.seed_order("PENDING");
    let order = fetch_order(&app, id).await;

    let catalog = app.products.catalog().await.expect("catalog");
    let draft = OrderDraft {
        client_id: order.client_id,
        employee_id: None,
        status: order.status,
        total: compute_total(&[OrderLine::new(ProductId::new(3), 2)], &catalog),
        lines: vec![OrderLine::new(ProductId::new(3), 2)], // flan at 4.0
    };

    let updated = app.orders.update(order.id, &draft).await.expect("edit");
    assert_eq!(updated.lines.len(), 1);
    assert_eq!(updated.total, Decimal::from(8));
    assert_eq!(fetch_order(&app, id).await.total, Decimal::from(8));
}

#[tokio::test]
async fn test_create_without_lines_issues_no_request() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = admin_app(&stub, &dir).await;

    let draft = OrderDraft::new(ClientId::new(1), vec![], &[]);
    let before = stub.mutation_count();
    let err = app.orders.create(&draft).await.expect_err("empty order");
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(stub.mutation_count(), before);
}

// ============================================================================
// Role gating
// ============================================================================

#[tokio::test]
async fn test_non_admin_mutations_never_reach_the_backend() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    app.session
        .login(USER_EMAIL, USER_PASSWORD)
        .await
        .expect("user login");

    let id = stub.seed_order("PENDING");
    let order = fetch_order(&app, id).await;
    let before = stub.mutation_count();

    let err = app.orders.advance(&order).await.expect_err("not admin");
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = app.orders.delete(order.id).await.expect_err("not admin");
    assert!(matches!(err, ApiError::Forbidden(_)));

    let draft = OrderDraft::new(
        ClientId::new(1),
        vec![OrderLine::new(ProductId::new(1), 1)],
        &[],
    );
    let err = app.orders.create(&draft).await.expect_err("not admin");
    assert!(matches!(err, ApiError::Forbidden(_)));

    assert_eq!(stub.mutation_count(), before, "no write reached the stub");

    // The gate reported through the error channel.
    let notices = app.session.notifier().active();
    assert!(
        notices
            .iter()
            .any(|notice| notice.message == "Permission denied")
    );

    // Reads remain available to plain users.
    assert!(!app.orders.list().await.expect("reads allowed").is_empty());
}
