use crate::error::{Result, ShieldError};
use std::path::PathBuf;
use std::time::Duration;

pub const API_BASE_ENV: &str = "SUPPLYSHIELD_API_BASE";
pub const TIMEOUT_ENV: &str = "SUPPLYSHIELD_TIMEOUT_SECS";
pub const STORE_ENV: &str = "SUPPLYSHIELD_STORE";

/// Same-origin base used by the browser build.
pub const BROWSER_API_BASE: &str = "/api";
/// Backend default for local development.
pub const LOCAL_API_BASE: &str = "http://localhost:8000/api";
pub const DEFAULT_STORE_PATH: &str = ".supplyshield/preferences.db";

#[derive(Clone, Debug, PartialEq)]
pub struct ShieldConfig {
    pub api_base: String,
    /// `None` leaves requests without a deadline.
    pub request_timeout: Option<Duration>,
    pub store_path: PathBuf,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            api_base: LOCAL_API_BASE.into(),
            request_timeout: None,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl ShieldConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base) = non_blank(API_BASE_ENV) {
            config.api_base = base;
        }
        if let Some(raw) = non_blank(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ShieldError::Config(format!("{TIMEOUT_ENV} must be whole seconds, got '{raw}'")))?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(path) = non_blank(STORE_ENV) {
            config.store_path = PathBuf::from(path);
        }

        config.api_base = normalize_base(&config.api_base)?;
        Ok(config)
    }

    /// Browser build: API served from the page's own origin.
    pub fn for_origin(origin: &str) -> Result<Self> {
        let base = format!("{}{}", origin.trim_end_matches('/'), BROWSER_API_BASE);
        Ok(Self {
            api_base: normalize_base(&base)?,
            ..Self::default()
        })
    }

    pub fn with_api_base(mut self, base: &str) -> Result<Self> {
        self.api_base = normalize_base(base)?;
        Ok(self)
    }
}

fn normalize_base(base: &str) -> Result<String> {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ShieldError::Config("api base must not be empty".into()));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ShieldError::Config(format!(
            "api base must be an absolute http(s) URL, got '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}
