use shield_core::error::{Result, ShieldError};
use shield_core::PreferenceStore;
use wasm_bindgen::JsValue;

fn js_err(e: JsValue) -> ShieldError {
    ShieldError::Storage(format!("localStorage: {e:?}"))
}

/// `window.localStorage` behind the preference store seam.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self> {
        let window =
            web_sys::window().ok_or_else(|| ShieldError::Storage("window not available".into()))?;
        let storage = window
            .local_storage()
            .map_err(js_err)?
            .ok_or_else(|| ShieldError::Storage("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage.get_item(key).map_err(js_err)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage.set_item(key, value).map_err(js_err)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage.remove_item(key).map_err(js_err)
    }
}
