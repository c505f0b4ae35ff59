//! Session lifecycle: login, logout, restore, corruption, 401 teardown.

use comanda_core::Role;
use comanda_dashboard::error::ApiError;
use comanda_dashboard::guard::Route;
use comanda_dashboard::session::{AuthState, NoticeLevel};

use comanda_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, StubBackend, TestApp, USER_EMAIL, USER_PASSWORD,
};

// ============================================================================
// Login / logout
// ============================================================================

#[tokio::test]
async fn test_login_persists_session_and_logout_clears_it() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    assert_eq!(app.session.state().await, AuthState::Anonymous);

    let route = app
        .session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login succeeds");
    assert_eq!(route, Route::Dashboard);

    let user = app.session.current_user().await.expect("authenticated");
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.name, "Ana Admin");
    assert_eq!(user.email, ADMIN_EMAIL);

    // A fresh process restores the persisted session.
    let restored = TestApp::connect(&stub.base_url, dir.path()).await;
    assert!(restored.session.is_authenticated().await);

    // Logout clears both entries; the next restore finds nothing.
    let route = restored.session.logout().await;
    assert_eq!(route, Route::Login);
    assert_eq!(restored.session.state().await, AuthState::Anonymous);

    let after_logout = TestApp::connect(&stub.base_url, dir.path()).await;
    assert_eq!(after_logout.session.state().await, AuthState::Anonymous);
}

#[tokio::test]
async fn test_login_rejection_leaves_session_cleared() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = TestApp::connect(&stub.base_url, dir.path()).await;

    let err = app
        .session
        .login(ADMIN_EMAIL, "wrong-password")
        .await
        .expect_err("bad credentials");
    assert!(matches!(err, ApiError::InvalidCredentials));
    assert_eq!(app.session.state().await, AuthState::Anonymous);

    let notices = app.session.notifier().active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices.first().map(|n| n.level), Some(NoticeLevel::Error));
    assert_eq!(
        notices.first().map(|n| n.message.as_str()),
        Some("Invalid credentials")
    );
}

#[tokio::test]
async fn test_object_shaped_role_claims_resolve_to_user() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = TestApp::connect(&stub.base_url, dir.path()).await;

    app.session
        .login(USER_EMAIL, USER_PASSWORD)
        .await
        .expect("login succeeds");

    let user = app.session.current_user().await.expect("authenticated");
    assert_eq!(user.role, Role::User);
    assert_eq!(user.name, "mozo");
}

// ============================================================================
// Restore
// ============================================================================

#[tokio::test]
async fn test_corrupted_stored_profile_restores_anonymous_and_purges() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    app.session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login succeeds");

    // Corrupt the stored profile behind the manager's back.
    std::fs::write(dir.path().join("user-data.json"), "{definitely not json")
        .expect("corrupt profile");

    let recovered = TestApp::connect(&stub.base_url, dir.path()).await;
    assert_eq!(recovered.session.state().await, AuthState::Anonymous);

    // The corrupted entries were purged, not left behind.
    assert!(!dir.path().join("auth-token").exists());
    assert!(!dir.path().join("user-data.json").exists());
}

#[tokio::test]
async fn test_lone_token_entry_is_purged_on_restore() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path()).expect("session dir");
    std::fs::write(dir.path().join("auth-token"), "stale-token").expect("write token");

    let app = TestApp::connect(&stub.base_url, dir.path()).await;
    assert_eq!(app.session.state().await, AuthState::Anonymous);
    assert!(!dir.path().join("auth-token").exists());
}

// ============================================================================
// Whoami and 401 teardown
// ============================================================================

#[tokio::test]
async fn test_whoami_confirms_live_session() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = TestApp::connect(&stub.base_url, dir.path()).await;

    app.session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login succeeds");

    let profile = app.auth.me().await.expect("session is live");
    assert_eq!(profile.id, 1);
    assert_eq!(profile.email.as_deref(), Some(ADMIN_EMAIL));
}

#[tokio::test]
async fn test_revoked_token_forces_logout() {
    let stub = StubBackend::spawn().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let app = TestApp::connect(&stub.base_url, dir.path()).await;

    app.session
        .login(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("login succeeds");

    // The guard would have let this session through: the token is locally
    // present. Its invalidation is only caught by the next API call.
    stub.revoke_all_tokens();

    let err = app.clients.list().await.expect_err("stale token");
    assert!(err.is_unauthorized());

    // The shell routes the error to the session manager, the one owner of
    // the teardown decision.
    let route = app.session.force_logout().await;
    assert_eq!(route, Route::Login);
    assert_eq!(app.session.state().await, AuthState::Anonymous);

    let fresh = TestApp::connect(&stub.base_url, dir.path()).await;
    assert_eq!(fresh.session.state().await, AuthState::Anonymous);

    let notices = app.session.notifier().active();
    assert_eq!(notices.first().map(|n| n.level), Some(NoticeLevel::Error));
}
