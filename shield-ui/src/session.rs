//! Session provider for the browser build.
//!
//! A hosted identity SDK, when the page loads one, publishes itself as
//! `window.Clerk`; its session hands out short-lived tokens through
//! `session.getToken()`. Without it the token comes from the email/password
//! login kept in local storage.

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use risk_registry::UserProfile;
use shield_core::error::{Result, ShieldError};
use shield_core::{PreferenceStore, SessionProvider, StoredTokenSession};
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

const IDENTITY_GLOBAL: &str = "Clerk";

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn identity() -> Option<JsValue> {
    let window = web_sys::window()?;
    get(&window, IDENTITY_GLOBAL)
}

fn hosted_session() -> Option<JsValue> {
    get(&identity()?, "session")
}

async fn call_promise(target: &JsValue, method: &str) -> std::result::Result<JsValue, String> {
    let f = get(target, method)
        .and_then(|v| v.dyn_into::<Function>().ok())
        .ok_or_else(|| format!("{method} is not a function"))?;
    let js = f.call0(target).map_err(|e| format!("{method} failed: {e:?}"))?;
    JsFuture::from(Promise::resolve(&js))
        .await
        .map_err(|e| format!("{method} rejected: {e:?}"))
}

/// Opens the hosted sign-in modal. False when no hosted SDK is loaded.
pub fn open_hosted_sign_in() -> bool {
    let Some(clerk) = identity() else {
        return false;
    };
    match get(&clerk, "openSignIn").and_then(|v| v.dyn_into::<Function>().ok()) {
        Some(open) => match open.call0(&clerk) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = ?e, "hosted sign-in failed to open");
                false
            }
        },
        None => false,
    }
}

pub struct BrowserSession {
    stored: StoredTokenSession,
}

impl BrowserSession {
    pub fn new(store: Rc<dyn PreferenceStore>) -> Self {
        Self {
            stored: StoredTokenSession::new(store),
        }
    }
}

#[async_trait(?Send)]
impl SessionProvider for BrowserSession {
    async fn token(&self) -> Option<String> {
        if let Some(session) = hosted_session() {
            match call_promise(&session, "getToken").await {
                Ok(token) => {
                    if let Some(token) = token.as_string().filter(|t| !t.is_empty()) {
                        return Some(token);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "identity provider token unavailable"),
            }
        }
        self.stored.token().await
    }

    fn is_signed_in(&self) -> bool {
        hosted_session().is_some() || self.stored.is_signed_in()
    }

    fn current_user(&self) -> Option<UserProfile> {
        let hosted = identity().and_then(|id| get(&id, "user"));
        match hosted {
            Some(user) => Some(UserProfile {
                id: get(&user, "id").and_then(|v| v.as_string()).unwrap_or_default(),
                email: get(&user, "primaryEmailAddress")
                    .and_then(|e| get(&e, "emailAddress"))
                    .and_then(|v| v.as_string())
                    .unwrap_or_default(),
                full_name: get(&user, "fullName").and_then(|v| v.as_string()),
                ..Default::default()
            }),
            None => self.stored.current_user(),
        }
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(id) = identity() {
            call_promise(&id, "signOut")
                .await
                .map_err(ShieldError::Transport)?;
        }
        self.stored.sign_out().await
    }
}
