use crate::GlobalOpts;
use anyhow::Context;
use shield_core::{
    ApiClient, AppState, PreferenceStore, SessionProvider, ShieldConfig, SqliteStore,
    StaticSession, StoredTokenSession,
};
use std::rc::Rc;

pub fn resolve_config(base: ShieldConfig, opts: &GlobalOpts) -> anyhow::Result<ShieldConfig> {
    let mut config = match opts.api_base.as_deref() {
        Some(api_base) => base.with_api_base(api_base)?,
        None => base,
    };
    if let Some(path) = &opts.store {
        config.store_path = path.clone();
    }
    Ok(config)
}

/// Wire the client, the preference database and the session together.
pub fn build_state(opts: &GlobalOpts) -> anyhow::Result<AppState> {
    let config = resolve_config(ShieldConfig::from_env()?, opts)?;
    state_for(&config, opts.token.as_deref())
}

pub fn state_for(config: &ShieldConfig, token: Option<&str>) -> anyhow::Result<AppState> {
    let store: Rc<dyn PreferenceStore> = Rc::new(
        SqliteStore::open(&config.store_path)
            .with_context(|| format!("opening {}", config.store_path.display()))?,
    );
    let client = ApiClient::new(config)?;

    let session: Rc<dyn SessionProvider> = match token.filter(|t| !t.trim().is_empty()) {
        Some(token) => Rc::new(StaticSession::new(token.trim())),
        None => Rc::new(StoredTokenSession::new(store.clone())),
    };

    tracing::debug!(
        api_base = %config.api_base,
        store = %config.store_path.display(),
        "state ready"
    );
    Ok(AppState::new(client, session, store))
}
