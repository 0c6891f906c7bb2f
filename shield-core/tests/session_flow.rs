mod support;

use risk_registry::{Category, LoginRequest, SubscriptionTier};
use shield_core::api::SummaryRequest;
use shield_core::pages::{CategoriesPage, PricingPage, Selection, UpgradeOutcome};
use shield_core::session::USER_KEY;
use shield_core::store::TOKEN_KEY;
use shield_core::{
    AnonymousSession, Entitlement, MemoryStore, PreferenceStore, ShieldError, StaticSession,
    StoredTokenSession,
};
use std::rc::Rc;
use support::{FakeBackend, FREE_TOKEN};

fn credentials(password: &str) -> LoginRequest {
    LoginRequest {
        email: "ana@example.com".into(),
        password: password.into(),
    }
}

#[tokio::test]
async fn token_is_read_for_every_request() {
    let backend = FakeBackend::start().await;
    let store = Rc::new(MemoryStore::with(&[(TOKEN_KEY, "first")]));
    let session = StoredTokenSession::new(store.clone());
    let app = backend.app(Rc::new(session), store.clone());

    app.call(&SummaryRequest).await.expect("first call");
    store.set(TOKEN_KEY, "second").expect("rotate");
    app.call(&SummaryRequest).await.expect("second call");

    let auth: Vec<Option<String>> = backend
        .requests()
        .into_iter()
        .map(|s| s.authorization)
        .collect();
    assert_eq!(
        auth,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn login_persists_token_and_signs_in() {
    let backend = FakeBackend::start().await;
    let store = Rc::new(MemoryStore::new());
    let app = backend.app(Rc::new(AnonymousSession), store.clone());
    assert!(!app.is_signed_in());

    let user = app.login(&credentials("hunter2")).await.expect("login");
    assert_eq!(user.display_name(), "Ana Rao");
    assert_eq!(store.get(TOKEN_KEY).expect("read").as_deref(), Some(FREE_TOKEN));
    assert!(store.get(USER_KEY).expect("read").is_some());
    assert!(app.is_signed_in());
    assert_eq!(app.entitlement(), Entitlement::Free);
    assert_eq!(app.current_user().map(|u| u.email), Some("ana@example.com".into()));

    app.call(&SummaryRequest).await.expect("summary");
    let last = backend.requests().pop().expect("recorded");
    assert_eq!(last.authorization.as_deref(), Some("Bearer free-token"));
}

#[tokio::test]
async fn rejected_login_leaves_session_untouched() {
    let backend = FakeBackend::start().await;
    let store = Rc::new(MemoryStore::new());
    let app = backend.app(Rc::new(AnonymousSession), store.clone());

    let err = app.login(&credentials("wrong")).await.expect_err("rejected");
    match err {
        ShieldError::Unauthorized(detail) => assert_eq!(detail, "Invalid email or password"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
    assert_eq!(store.get(TOKEN_KEY).expect("read"), None);
    assert!(!app.is_signed_in());
}

#[tokio::test]
async fn upgrade_sets_flag_after_backend_confirms() {
    let backend = FakeBackend::start().await;
    let app = backend.app(Rc::new(StaticSession::new(FREE_TOKEN)), Rc::new(MemoryStore::new()));
    assert!(!app.preferences().is_premium());

    let mut pricing = PricingPage::default();
    match pricing.upgrade(&app).await {
        UpgradeOutcome::Upgraded(change) => assert_eq!(change.tier, SubscriptionTier::Paid),
        other => panic!("expected upgrade, got {other:?}"),
    }
    assert!(!pricing.busy);
    assert!(app.preferences().is_premium());
    assert_eq!(pricing.upgrade(&app).await, UpgradeOutcome::AlreadyPremium);

    let mut categories = CategoriesPage::default();
    assert!(matches!(
        categories.select(Category::Food, &app).await,
        Selection::Fetch(_)
    ));
    assert!(categories.insight.value().is_some());
    assert_eq!(backend.count("/api/auth/upgrade"), 1);
}

#[tokio::test]
async fn downgrade_and_profile_refresh_follow_backend_tier() {
    let backend = FakeBackend::start().await;
    let app = backend.app(Rc::new(StaticSession::new(FREE_TOKEN)), Rc::new(MemoryStore::new()));

    app.upgrade_to_premium().await.expect("upgrade");
    let profile = app.refresh_profile().await.expect("profile");
    assert_eq!(profile.subscription_tier, SubscriptionTier::Paid);
    assert!(app.preferences().is_premium());

    let change = app.downgrade_to_free().await.expect("downgrade");
    assert_eq!(change.tier, SubscriptionTier::Free);
    assert!(!app.preferences().is_premium());
    assert_eq!(app.entitlement(), Entitlement::Free);
}

#[tokio::test]
async fn upgrade_requires_sign_in() {
    let backend = FakeBackend::start().await;
    let app = backend.app(Rc::new(AnonymousSession), Rc::new(MemoryStore::new()));

    let mut pricing = PricingPage::default();
    assert_eq!(pricing.upgrade(&app).await, UpgradeOutcome::SignInRequired);
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn sign_out_forgets_stored_token() {
    let backend = FakeBackend::start().await;
    let store = Rc::new(MemoryStore::new());
    let app = backend.app(Rc::new(AnonymousSession), store.clone());

    app.login(&credentials("hunter2")).await.expect("login");
    app.sign_out().await.expect("sign out");

    assert_eq!(store.get(TOKEN_KEY).expect("read"), None);
    assert_eq!(store.get(USER_KEY).expect("read"), None);
    assert!(!app.is_signed_in());

    app.call(&SummaryRequest).await.expect("summary");
    let last = backend.requests().pop().expect("recorded");
    assert_eq!(last.authorization, None);
}
