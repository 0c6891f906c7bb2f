//! Identity seam between the API client and whoever holds the credentials.

use crate::error::{Result, ShieldError};
use crate::store::{PreferenceStore, TOKEN_KEY};
use async_trait::async_trait;
use risk_registry::{TokenResponse, UserProfile};
use std::cell::RefCell;
use std::rc::Rc;

pub const USER_KEY: &str = "supplyshield_user";

/// Source of bearer tokens. The client asks on every request, so a provider
/// that refreshes tokens behind the scenes needs no coordination.
#[async_trait(?Send)]
pub trait SessionProvider {
    async fn token(&self) -> Option<String>;

    fn is_signed_in(&self) -> bool;

    fn current_user(&self) -> Option<UserProfile>;

    async fn sign_out(&self) -> Result<()>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnonymousSession;

#[async_trait(?Send)]
impl SessionProvider for AnonymousSession {
    async fn token(&self) -> Option<String> {
        None
    }

    fn is_signed_in(&self) -> bool {
        false
    }

    fn current_user(&self) -> Option<UserProfile> {
        None
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

/// Fixed credentials, e.g. a token passed on the command line. Signing out
/// forgets the token for the rest of the process.
#[derive(Clone, Debug)]
pub struct StaticSession {
    token: RefCell<Option<String>>,
    user: Option<UserProfile>,
}

impl StaticSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }
}

#[async_trait(?Send)]
impl SessionProvider for StaticSession {
    async fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn is_signed_in(&self) -> bool {
        self.token.borrow().is_some()
    }

    fn current_user(&self) -> Option<UserProfile> {
        self.user.clone().filter(|_| self.is_signed_in())
    }

    async fn sign_out(&self) -> Result<()> {
        self.token.borrow_mut().take();
        Ok(())
    }
}

/// Email/password login: the token issued by `/auth/login` or
/// `/auth/register` is kept in the preference store under `token`.
#[derive(Clone)]
pub struct StoredTokenSession {
    store: Rc<dyn PreferenceStore>,
}

impl StoredTokenSession {
    pub fn new(store: Rc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn sign_in(&self, issued: &TokenResponse) -> Result<()> {
        if issued.access_token.trim().is_empty() {
            return Err(ShieldError::Decode("token response without access_token".into()));
        }
        self.store.set(TOKEN_KEY, &issued.access_token)?;
        let user = serde_json::to_string(&issued.user)
            .map_err(|e| ShieldError::Storage(e.to_string()))?;
        self.store.set(USER_KEY, &user)?;
        tracing::info!(email = %issued.user.email, "signed in");
        Ok(())
    }

    fn stored_token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read stored token");
                None
            }
        }
    }
}

#[async_trait(?Send)]
impl SessionProvider for StoredTokenSession {
    async fn token(&self) -> Option<String> {
        self.stored_token()
    }

    fn is_signed_in(&self) -> bool {
        self.stored_token().is_some()
    }

    fn current_user(&self) -> Option<UserProfile> {
        let raw = self.store.get(USER_KEY).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }

    async fn sign_out(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(())
    }
}
