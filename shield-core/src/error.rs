use shield_access::Access;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShieldError>;

#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("{}", .0.denial_message())]
    AccessDenied(Access),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("preference store: {0}")]
    Storage(String),

    #[error("map surface: {0}")]
    Map(String),

    #[error("report export: {0}")]
    Export(String),

    #[error("configuration: {0}")]
    Config(String),
}

impl ShieldError {
    /// Build the error for a non-2xx answer. FastAPI bodies look like
    /// `{"detail": "..."}`; anything else is kept verbatim.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = detail_from_body(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("status {status}")
            } else {
                trimmed.to_string()
            }
        });

        match status {
            401 => ShieldError::Unauthorized(detail),
            403 => ShieldError::Forbidden(detail),
            _ => ShieldError::Status { status, detail },
        }
    }

    /// Network failures and server-side errors may succeed on a user-initiated retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ShieldError::Transport(_) => true,
            ShieldError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Backend `detail` text when there is one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ShieldError::Status { detail, .. }
            | ShieldError::Unauthorized(detail)
            | ShieldError::Forbidden(detail) => Some(detail),
            _ => None,
        }
    }
}

fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(serde_json::Value::as_str))
                .collect::<Vec<_>>();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

impl From<reqwest::Error> for ShieldError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ShieldError::Decode(err.to_string())
        } else {
            ShieldError::Transport(err.to_string())
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for ShieldError {
    fn from(err: rusqlite::Error) -> Self {
        ShieldError::Storage(err.to_string())
    }
}

impl From<csv::Error> for ShieldError {
    fn from(err: csv::Error) -> Self {
        ShieldError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fastapi_detail_is_extracted() {
        let err = ShieldError::from_status(
            403,
            r#"{"detail":"Category-level insights require a premium subscription."}"#,
        );
        assert!(matches!(err, ShieldError::Forbidden(_)));
        assert_eq!(
            err.detail(),
            Some("Category-level insights require a premium subscription.")
        );
    }

    #[test]
    fn validation_detail_lists_messages() {
        let err = ShieldError::from_status(
            422,
            r#"{"detail":[{"loc":["query","days"],"msg":"ensure this value is less than or equal to 30"}]}"#,
        );
        assert_eq!(
            err.detail(),
            Some("ensure this value is less than or equal to 30")
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable() {
        assert!(ShieldError::from_status(503, "").is_retryable());
        assert!(ShieldError::Transport("connection refused".into()).is_retryable());
        assert!(!ShieldError::from_status(400, "bad").is_retryable());
    }

    #[test]
    fn access_denied_renders_upgrade_message() {
        let err = ShieldError::AccessDenied(Access::Premium);
        assert!(err.to_string().contains("premium subscription"));
    }
}
