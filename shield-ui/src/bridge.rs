//! Wiring between the browser and `shield-core`.

use crate::session::BrowserSession;
use crate::storage::LocalStorage;
use shield_core::error::{Result, ShieldError};
use shield_core::{ApiClient, AppState, PreferenceStore, ShieldConfig, Theme};
use std::rc::Rc;

const LIGHT_QUERY: &str = "(prefers-color-scheme: light)";

pub fn build_state() -> Result<AppState> {
    let window = web_sys::window().ok_or_else(|| ShieldError::Config("window not available".into()))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| ShieldError::Config(format!("page origin unavailable: {e:?}")))?;
    let config = ShieldConfig::for_origin(&origin)?;

    let store: Rc<dyn PreferenceStore> = Rc::new(LocalStorage::open()?);
    let client = ApiClient::new(&config)?;
    let session = Rc::new(BrowserSession::new(store.clone()));
    tracing::info!(api = %config.api_base, "supplyshield ui starting");
    Ok(AppState::new(client, session, store))
}

pub fn prefers_light() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(LIGHT_QUERY).ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false)
}

/// Put the theme class on `<html>`.
pub fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };
    let classes = root.class_list();
    let result = match theme.root_class() {
        Some(class) => classes.add_1(class),
        None => classes.remove_1(Theme::Light.root_class().unwrap_or_default()),
    };
    if let Err(e) = result {
        tracing::warn!(error = ?e, "failed to apply theme class");
    }
}

pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
