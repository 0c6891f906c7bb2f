//! HTTP client for the SupplyShield backend.
//!
//! Each backend operation is a small descriptor type implementing
//! [`Endpoint`]. Descriptors carry their route and access tier through
//! [`Gated`], so callers can refuse a request before it is built.

use crate::config::ShieldConfig;
use crate::error::{Result, ShieldError};
use crate::session::SessionProvider;
use risk_registry::{
    Category, DashboardSummary, FeedResponse, LoginRequest, MapData, RegisterRequest, RiskTrend,
    SignalFeed, SignalSource, TierChange, TokenResponse, UserProfile,
};
use serde::de::DeserializeOwned;
pub use shield_access::Method;
use shield_access::Gated;
use std::cell::RefCell;
use std::rc::Rc;

pub const DEFAULT_TREND_DAYS: u32 = 7;
pub const MAX_TREND_DAYS: u32 = 30;
pub const DEFAULT_FEED_LIMIT: u32 = 50;
pub const MAX_FEED_LIMIT: u32 = 200;

pub trait Endpoint: Gated {
    type Output: DeserializeOwned;

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn body(&self) -> Option<serde_json::Value> {
        None
    }
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Public)]
#[route(GET, "/dashboard/summary")]
pub struct SummaryRequest;

impl Endpoint for SummaryRequest {
    type Output = DashboardSummary;
}

#[derive(Clone, Copy, Debug, Gated)]
#[access(Premium)]
#[route(GET, "/dashboard/category/{category}")]
pub struct CategoryRequest {
    pub category: Category,
}

impl Endpoint for CategoryRequest {
    type Output = risk_registry::CategoryInsight;
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Public)]
#[route(GET, "/dashboard/signals")]
pub struct SignalsRequest {
    pub source: Option<SignalSource>,
}

impl Endpoint for SignalsRequest {
    type Output = SignalFeed;

    fn query(&self) -> Vec<(&'static str, String)> {
        self.source
            .map(|s| vec![("source", s.as_str().to_string())])
            .unwrap_or_default()
    }
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Public)]
#[route(GET, "/dashboard/map-data")]
pub struct MapRequest;

impl Endpoint for MapRequest {
    type Output = MapData;
}

#[derive(Clone, Copy, Debug, Gated)]
#[access(Public)]
#[route(GET, "/dashboard/risk-trend")]
pub struct TrendRequest {
    days: u32,
}

impl TrendRequest {
    /// Window clamped to what the backend accepts.
    pub fn new(days: u32) -> Self {
        Self {
            days: days.clamp(1, MAX_TREND_DAYS),
        }
    }

    pub fn days(&self) -> u32 {
        self.days
    }
}

impl Default for TrendRequest {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_DAYS)
    }
}

impl Endpoint for TrendRequest {
    type Output = RiskTrend;

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("days", self.days.to_string())]
    }
}

/// Filters for the raw `/data/*` feeds. Each feed only honours a subset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedQuery {
    pub commodity: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub corridor_id: Option<String>,
    pub mode: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Clone, Debug, Gated)]
#[access(Public)]
#[route(GET, "/data/{source}")]
pub struct FeedRequest {
    pub source: SignalSource,
    pub filter: FeedQuery,
}

impl Endpoint for FeedRequest {
    type Output = FeedResponse;

    fn query(&self) -> Vec<(&'static str, String)> {
        let f = &self.filter;
        let limit = (
            "limit",
            f.limit
                .unwrap_or(DEFAULT_FEED_LIMIT)
                .clamp(1, MAX_FEED_LIMIT)
                .to_string(),
        );

        let (filters, with_limit) = match self.source {
            SignalSource::Mandi | SignalSource::Enam => (
                vec![("commodity", &f.commodity), ("state", &f.state)],
                true,
            ),
            SignalSource::Trade => (
                vec![("commodity", &f.commodity), ("country", &f.country)],
                true,
            ),
            SignalSource::Logistics => (
                vec![("corridor_id", &f.corridor_id), ("mode", &f.mode)],
                false,
            ),
            SignalSource::Weather => (Vec::new(), false),
        };

        let mut params: Vec<(&'static str, String)> = filters
            .into_iter()
            .filter_map(|(key, value)| {
                let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
                Some((key, value.to_string()))
            })
            .collect();
        if with_limit {
            params.push(limit);
        }
        params
    }
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Authenticated)]
#[route(POST, "/auth/upgrade")]
pub struct UpgradeRequest;

impl Endpoint for UpgradeRequest {
    type Output = TierChange;
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Authenticated)]
#[route(POST, "/auth/downgrade")]
pub struct DowngradeRequest;

impl Endpoint for DowngradeRequest {
    type Output = TierChange;
}

#[derive(Clone, Copy, Debug, Default, Gated)]
#[access(Authenticated)]
#[route(GET, "/auth/me")]
pub struct ProfileRequest;

impl Endpoint for ProfileRequest {
    type Output = UserProfile;
}

#[derive(Clone, Copy, Debug, Gated)]
#[access(Public)]
#[route(POST, "/auth/register")]
pub struct SignUp<'a> {
    pub payload: &'a RegisterRequest,
}

impl Endpoint for SignUp<'_> {
    type Output = TokenResponse;

    fn body(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.payload).ok()
    }
}

#[derive(Clone, Copy, Debug, Gated)]
#[access(Public)]
#[route(POST, "/auth/login")]
pub struct SignIn<'a> {
    pub payload: &'a LoginRequest,
}

impl Endpoint for SignIn<'_> {
    type Output = TokenResponse;

    fn body(&self) -> Option<serde_json::Value> {
        serde_json::to_value(self.payload).ok()
    }
}

/// Clones share the HTTP connection pool and the registered session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Rc<RefCell<Option<Rc<dyn SessionProvider>>>>,
}

impl ApiClient {
    pub fn new(config: &ShieldConfig) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ShieldError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api_base.clone(),
            session: Rc::new(RefCell::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install the token source consulted before every request.
    pub fn register_session(&self, provider: Rc<dyn SessionProvider>) {
        *self.session.borrow_mut() = Some(provider);
    }

    pub fn session(&self) -> Option<Rc<dyn SessionProvider>> {
        self.session.borrow().clone()
    }

    pub async fn send<E: Endpoint>(&self, endpoint: &E) -> Result<E::Output> {
        let path = endpoint.path();
        let url = format!("{}{}", self.base_url, path);

        let mut request = match E::METHOD {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        let query = endpoint.query();
        if !query.is_empty() {
            request = request.query(&query);
        }
        if let Some(body) = endpoint.body() {
            request = request.json(&body);
        }

        let provider = self.session();
        let mut authorized = false;
        if let Some(provider) = provider {
            if let Some(token) = provider.token().await {
                request = request.bearer_auth(token);
                authorized = true;
            }
        }

        tracing::debug!(
            method = E::METHOD.as_str(),
            path = %path,
            authorized,
            access = ?endpoint.access(),
            "api request"
        );

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ShieldError::from_status(status.as_u16(), &body);
            tracing::warn!(path = %path, status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }

        response
            .json::<E::Output>()
            .await
            .map_err(|e| ShieldError::Decode(format!("{path}: {e}")))
    }

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        self.send(&SummaryRequest).await
    }

    pub async fn category_insight(
        &self,
        category: Category,
    ) -> Result<risk_registry::CategoryInsight> {
        self.send(&CategoryRequest { category }).await
    }

    pub async fn signals(&self, source: Option<SignalSource>) -> Result<SignalFeed> {
        self.send(&SignalsRequest { source }).await
    }

    pub async fn map_data(&self) -> Result<MapData> {
        self.send(&MapRequest).await
    }

    pub async fn risk_trend(&self, days: u32) -> Result<RiskTrend> {
        self.send(&TrendRequest::new(days)).await
    }

    pub async fn data_feed(&self, source: SignalSource, filter: &FeedQuery) -> Result<FeedResponse> {
        self.send(&FeedRequest {
            source,
            filter: filter.clone(),
        })
        .await
    }

    pub async fn upgrade(&self) -> Result<TierChange> {
        self.send(&UpgradeRequest).await
    }

    pub async fn downgrade(&self) -> Result<TierChange> {
        self.send(&DowngradeRequest).await
    }

    pub async fn register(&self, payload: &RegisterRequest) -> Result<TokenResponse> {
        self.send(&SignUp { payload }).await
    }

    pub async fn login(&self, payload: &LoginRequest) -> Result<TokenResponse> {
        self.send(&SignIn { payload }).await
    }

    pub async fn me(&self) -> Result<UserProfile> {
        self.send(&ProfileRequest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shield_access::{Access, Entitlement};

    #[test]
    fn trend_window_is_clamped() {
        assert_eq!(TrendRequest::new(0).days(), 1);
        assert_eq!(TrendRequest::new(14).days(), 14);
        assert_eq!(TrendRequest::new(90).days(), MAX_TREND_DAYS);
        assert_eq!(TrendRequest::default().query(), vec![("days", "7".to_string())]);
    }

    #[test]
    fn feed_query_only_sends_supported_filters() {
        let filter = FeedQuery {
            commodity: Some("Onion".into()),
            state: Some("Maharashtra".into()),
            country: Some("UAE".into()),
            mode: Some("  ".into()),
            limit: Some(500),
            ..Default::default()
        };
        let mandi = FeedRequest {
            source: SignalSource::Mandi,
            filter: filter.clone(),
        };
        assert_eq!(mandi.path(), "/data/mandi");
        assert_eq!(
            mandi.query(),
            vec![
                ("commodity", "Onion".to_string()),
                ("state", "Maharashtra".to_string()),
                ("limit", "200".to_string()),
            ]
        );

        let trade = FeedRequest {
            source: SignalSource::Trade,
            filter: filter.clone(),
        };
        assert!(trade.query().contains(&("country", "UAE".to_string())));

        let logistics = FeedRequest {
            source: SignalSource::Logistics,
            filter,
        };
        assert!(logistics.query().is_empty());
    }

    #[test]
    fn category_path_uses_canonical_name() {
        let req = CategoryRequest {
            category: Category::Stationery,
        };
        assert_eq!(req.path(), "/dashboard/category/Stationery");
        assert_eq!(req.access(), Access::Premium);
        assert!(!req.permitted_for(Entitlement::Free));
    }

    #[test]
    fn auth_endpoints_need_a_session() {
        assert!(!UpgradeRequest.permitted_for(Entitlement::Anonymous));
        assert!(ProfileRequest.permitted_for(Entitlement::Free));
        let login = LoginRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
        };
        let sign_in = SignIn { payload: &login };
        assert_eq!(SignIn::METHOD, Method::Post);
        assert_eq!(
            sign_in.body(),
            Some(serde_json::json!({"email": "a@b.c", "password": "pw"}))
        );
    }

    #[test]
    fn client_starts_without_session() {
        let config = ShieldConfig::default();
        let client = ApiClient::new(&config).expect("client");
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert!(client.session().is_none());
    }
}
