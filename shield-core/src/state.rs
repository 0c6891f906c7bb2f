use crate::api::{ApiClient, DowngradeRequest, Endpoint, ProfileRequest, SignIn, SignUp, UpgradeRequest};
use crate::error::{Result, ShieldError};
use crate::session::{SessionProvider, StoredTokenSession};
use crate::store::{PreferenceStore, PREMIUM_KEY, THEME_KEY, TOKEN_KEY};
use risk_registry::{LoginRequest, RegisterRequest, SubscriptionTier, TierChange, UserProfile};
use shield_access::{Access, Entitlement, Gated};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Class put on the document root; dark is the unstyled default.
    pub fn root_class(&self) -> Option<&'static str> {
        match self {
            Theme::Dark => None,
            Theme::Light => Some("light-mode"),
        }
    }
}

/// Persisted user preferences. The premium flag can only be written from
/// inside this crate, after the backend has confirmed the tier.
#[derive(Clone)]
pub struct Preferences {
    store: Rc<dyn PreferenceStore>,
}

impl Preferences {
    pub fn new(store: Rc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn is_premium(&self) -> bool {
        match self.store.get(PREMIUM_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read premium flag");
                false
            }
        }
    }

    pub(crate) fn set_premium(&self, premium: bool) -> Result<()> {
        if premium {
            self.store.set(PREMIUM_KEY, "true")
        } else {
            self.store.remove(PREMIUM_KEY)
        }
    }

    /// Saved theme, or the system preference when nothing was saved.
    pub fn theme(&self, prefers_light: bool) -> Theme {
        let saved = self
            .store
            .get(THEME_KEY)
            .ok()
            .flatten()
            .and_then(|v| Theme::parse(&v));
        saved.unwrap_or(if prefers_light { Theme::Light } else { Theme::Dark })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }

    pub fn toggle_theme(&self, prefers_light: bool) -> Result<Theme> {
        let next = self.theme(prefers_light).toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}

/// Everything a view needs, built once at startup and passed down.
#[derive(Clone)]
pub struct AppState {
    client: ApiClient,
    store: Rc<dyn PreferenceStore>,
    prefs: Preferences,
}

impl AppState {
    pub fn new(
        client: ApiClient,
        session: Rc<dyn SessionProvider>,
        store: Rc<dyn PreferenceStore>,
    ) -> Self {
        client.register_session(session);
        Self {
            client,
            prefs: Preferences::new(store.clone()),
            store,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn is_signed_in(&self) -> bool {
        self.client
            .session()
            .map(|s| s.is_signed_in())
            .unwrap_or(false)
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.client.session().and_then(|s| s.current_user())
    }

    /// The premium flag only counts while someone is signed in.
    pub fn entitlement(&self) -> Entitlement {
        let signed_in = self.is_signed_in();
        Entitlement::from_flags(signed_in, signed_in && self.prefs.is_premium())
    }

    /// Issue `endpoint` if the current entitlement allows it.
    pub async fn call<E: Endpoint>(&self, endpoint: &E) -> Result<E::Output> {
        let entitlement = self.entitlement();
        let access = endpoint.access();
        if !endpoint.permitted_for(entitlement) {
            tracing::debug!(path = %endpoint.path(), ?access, ?entitlement, "request withheld");
            return Err(ShieldError::AccessDenied(access));
        }

        match self.client.send(endpoint).await {
            Err(ShieldError::Forbidden(detail)) if access == Access::Premium => {
                tracing::warn!(path = %endpoint.path(), "backend refused premium request; clearing local flag");
                self.prefs.set_premium(false)?;
                Err(ShieldError::Forbidden(detail))
            }
            other => other,
        }
    }

    /// Ask the backend for the paid tier; the local flag follows its answer.
    pub async fn upgrade_to_premium(&self) -> Result<TierChange> {
        let change = self.call(&UpgradeRequest).await?;
        self.prefs.set_premium(change.tier == SubscriptionTier::Paid)?;
        tracing::info!(tier = ?change.tier, "subscription changed");
        Ok(change)
    }

    pub async fn downgrade_to_free(&self) -> Result<TierChange> {
        let change = self.call(&DowngradeRequest).await?;
        self.prefs.set_premium(change.tier == SubscriptionTier::Paid)?;
        tracing::info!(tier = ?change.tier, "subscription changed");
        Ok(change)
    }

    /// Re-read the profile and mirror its tier into the premium flag.
    pub async fn refresh_profile(&self) -> Result<UserProfile> {
        let profile = self.call(&ProfileRequest).await?;
        self.prefs
            .set_premium(profile.subscription_tier == SubscriptionTier::Paid)?;
        Ok(profile)
    }

    pub async fn login(&self, payload: &LoginRequest) -> Result<UserProfile> {
        let issued = self.call(&SignIn { payload }).await?;
        self.adopt_token(&issued)
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<UserProfile> {
        let issued = self.call(&SignUp { payload }).await?;
        self.adopt_token(&issued)
    }

    /// Persist an issued token. The registered provider stays in place when
    /// it already reads the stored token; otherwise a stored-token session
    /// takes over.
    fn adopt_token(&self, issued: &risk_registry::TokenResponse) -> Result<UserProfile> {
        let stored = StoredTokenSession::new(self.store.clone());
        stored.sign_in(issued)?;
        self.prefs
            .set_premium(issued.user.subscription_tier == SubscriptionTier::Paid)?;
        if !self.is_signed_in() {
            self.client.register_session(Rc::new(stored));
        }
        Ok(issued.user.clone())
    }

    /// Ends the session. The provider stays registered so a later sign-in,
    /// hosted or by password, is picked up without rebuilding the state.
    pub async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.client.session() {
            session.sign_out().await?;
        }
        self.store.remove(TOKEN_KEY)?;
        self.prefs.set_premium(false)?;
        tracing::info!("signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShieldConfig;
    use crate::session::{AnonymousSession, StaticSession};
    use crate::store::MemoryStore;
    use futures::executor::block_on;

    fn state(session: Rc<dyn SessionProvider>, store: MemoryStore) -> AppState {
        let client = ApiClient::new(&ShieldConfig::default()).expect("client");
        AppState::new(client, session, Rc::new(store))
    }

    #[test]
    fn theme_falls_back_to_system_preference() {
        let prefs = Preferences::new(Rc::new(MemoryStore::new()));
        assert_eq!(prefs.theme(false), Theme::Dark);
        assert_eq!(prefs.theme(true), Theme::Light);

        assert_eq!(prefs.toggle_theme(false).expect("toggle"), Theme::Light);
        assert_eq!(prefs.theme(false), Theme::Light);
        assert_eq!(Theme::Light.root_class(), Some("light-mode"));
    }

    #[test]
    fn premium_flag_needs_a_session() {
        let store = MemoryStore::with(&[(PREMIUM_KEY, "true")]);
        let anonymous = state(Rc::new(AnonymousSession), store);
        assert_eq!(anonymous.entitlement(), Entitlement::Anonymous);

        let store = MemoryStore::with(&[(PREMIUM_KEY, "true")]);
        let signed_in = state(Rc::new(StaticSession::new("t")), store);
        assert_eq!(signed_in.entitlement(), Entitlement::Premium);

        let free = state(Rc::new(StaticSession::new("t")), MemoryStore::new());
        assert_eq!(free.entitlement(), Entitlement::Free);
    }

    #[test]
    fn withheld_request_reports_required_tier() {
        let free = state(Rc::new(StaticSession::new("t")), MemoryStore::new());
        let err = block_on(free.call(&crate::api::CategoryRequest {
            category: risk_registry::Category::Food,
        }))
        .expect_err("free session must not reach the network");
        assert!(matches!(err, ShieldError::AccessDenied(Access::Premium)));

        let anonymous = state(Rc::new(AnonymousSession), MemoryStore::new());
        let err = block_on(anonymous.upgrade_to_premium()).expect_err("needs sign in");
        assert!(matches!(err, ShieldError::AccessDenied(Access::Authenticated)));
    }

    /// Stands in for a hosted identity SDK whose sign-in happens elsewhere.
    #[derive(Default)]
    struct HostedSession {
        signed_in: std::cell::Cell<bool>,
    }

    #[async_trait::async_trait(?Send)]
    impl SessionProvider for HostedSession {
        async fn token(&self) -> Option<String> {
            self.signed_in.get().then(|| "hosted-jwt".to_string())
        }

        fn is_signed_in(&self) -> bool {
            self.signed_in.get()
        }

        fn current_user(&self) -> Option<UserProfile> {
            None
        }

        async fn sign_out(&self) -> Result<()> {
            self.signed_in.set(false);
            Ok(())
        }
    }

    #[test]
    fn provider_survives_sign_out() {
        let hosted = Rc::new(HostedSession::default());
        hosted.signed_in.set(true);
        let app = state(hosted.clone(), MemoryStore::new());
        assert!(app.is_signed_in());

        block_on(app.sign_out()).expect("sign out");
        assert!(!app.is_signed_in());

        hosted.signed_in.set(true);
        assert!(app.is_signed_in());
        assert_eq!(app.entitlement(), Entitlement::Free);
        let token = app.client().session().map(|s| block_on(s.token()));
        assert_eq!(token, Some(Some("hosted-jwt".to_string())));
    }

    #[test]
    fn sign_out_clears_premium_flag() {
        let store = Rc::new(MemoryStore::with(&[(PREMIUM_KEY, "true"), (TOKEN_KEY, "abc")]));
        let client = ApiClient::new(&ShieldConfig::default()).expect("client");
        let app = AppState::new(client, Rc::new(StaticSession::new("abc")), store.clone());
        assert_eq!(app.entitlement(), Entitlement::Premium);

        block_on(app.sign_out()).expect("sign out");
        assert_eq!(store.get(PREMIUM_KEY).expect("read"), None);

        // A token for someone else starts from the free tier.
        app.client().register_session(Rc::new(StaticSession::new("other")));
        assert_eq!(app.entitlement(), Entitlement::Free);
    }

    #[test]
    fn sign_out_drops_session() {
        let store = MemoryStore::with(&[(TOKEN_KEY, "abc")]);
        let app = state(Rc::new(StaticSession::new("abc")), store);
        assert!(app.is_signed_in());
        block_on(app.sign_out()).expect("sign out");
        assert!(!app.is_signed_in());
        assert_eq!(app.entitlement(), Entitlement::Anonymous);
    }
}
