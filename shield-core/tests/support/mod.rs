//! In-process stand-in for the SupplyShield backend.
//!
//! Records every request it receives so tests can assert on what the client
//! actually sent, including requests that should never have been sent.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use shield_core::{ApiClient, AppState, PreferenceStore, SessionProvider, ShieldConfig};
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

pub const PREMIUM_TOKEN: &str = "premium-token";
pub const FREE_TOKEN: &str = "free-token";
pub const PREMIUM_DETAIL: &str =
    "Category-level insights require a premium subscription. Upgrade to access detailed analysis.";

#[derive(Clone, Debug)]
pub struct Seen {
    pub method: &'static str,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

struct Backend {
    seen: Mutex<Vec<Seen>>,
    paid: Mutex<HashSet<String>>,
}

type Shared = Arc<Backend>;

impl Backend {
    fn record(&self, method: &'static str, uri: &Uri, headers: &HeaderMap) -> Option<String> {
        let authorization = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().expect("seen lock").push(Seen {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            authorization: authorization.clone(),
        });
        authorization.and_then(|a| a.strip_prefix("Bearer ").map(str::to_string))
    }

    fn is_paid(&self, token: &str) -> bool {
        self.paid.lock().expect("paid lock").contains(token)
    }

    fn set_paid(&self, token: &str, paid: bool) {
        let mut set = self.paid.lock().expect("paid lock");
        if paid {
            set.insert(token.to_string());
        } else {
            set.remove(token);
        }
    }

    fn user(&self, token: &str) -> Value {
        let tier = if self.is_paid(token) { "paid" } else { "free" };
        json!({
            "id": format!("user-{token}"),
            "email": "ana@example.com",
            "full_name": "Ana Rao",
            "subscription_tier": tier,
            "created_at": "2026-01-04T09:00:00"
        })
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn unauthenticated() -> Response {
    detail(StatusCode::UNAUTHORIZED, "Not authenticated")
}

async fn summary(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    b.record("GET", &uri, &headers);
    Json(json!({
        "overall_score": 42.5,
        "overall_risk_level": "medium",
        "segments": {
            "procurement": {"score": 48.0, "risk_level": "medium"},
            "transport": {"score": 37.0, "risk_level": "medium"}
        },
        "signals_summary": {"mandi_records": 120, "weather_records": 8, "total": 128},
        "is_premium": false,
        "categories_available": ["Food", "Clothing", "Stationery", "Toys"],
        "computed_at": "2026-06-01T08:00:00"
    }))
    .into_response()
}

async fn risk_trend(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    b.record("GET", &uri, &headers);
    let days: u32 = uri
        .query()
        .and_then(|q| q.strip_prefix("days="))
        .and_then(|d| d.parse().ok())
        .unwrap_or(7);
    let trend: Vec<Value> = (0..days)
        .map(|i| {
            json!({
                "date": format!("2026-05-{:02}", i + 1),
                "overall": 40.0 + f64::from(i),
                "procurement": 45.0,
            })
        })
        .collect();
    Json(json!({ "trend": trend, "days": days })).into_response()
}

async fn category(
    State(b): State<Shared>,
    Path(name): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let token = b.record("GET", &uri, &headers);
    match token {
        Some(token) if b.is_paid(&token) => Json(json!({
            "category": name,
            "risk_score": 63.0,
            "risk_level": "high",
            "commodities_tracked": ["Rice", "Wheat"],
            "contributing_factors": {
                "price_volatility": {"value": 0.7, "weight": 0.3, "contribution": 21.0}
            },
            "recommendations": [
                {"priority": 1, "title": "Build buffer stock", "action_type": "increase_inventory"}
            ],
            "computed_at": "2026-06-01T08:00:00"
        }))
        .into_response(),
        _ => detail(StatusCode::FORBIDDEN, PREMIUM_DETAIL),
    }
}

async fn signals(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    let token = b.record("GET", &uri, &headers);
    let mut feed = json!({
        "mandi": [{"commodity": "Onion", "market": "Lasalgaon", "modal_price": 1800.0}],
        "enam": [],
        "weather": [{"city": "Chennai", "disruption_severity": 0.6, "is_disruptive": true}]
    });
    if token.is_some_and(|t| b.is_paid(&t)) {
        feed["trade"] = json!([]);
        feed["logistics"] = json!([]);
    }
    Json(feed).into_response()
}

async fn upgrade(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    let Some(token) = b.record("POST", &uri, &headers) else {
        return unauthenticated();
    };
    b.set_paid(&token, true);
    Json(json!({"message": "Upgraded to premium", "tier": "paid"})).into_response()
}

async fn downgrade(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    let Some(token) = b.record("POST", &uri, &headers) else {
        return unauthenticated();
    };
    b.set_paid(&token, false);
    Json(json!({"message": "Downgraded to free", "tier": "free"})).into_response()
}

async fn login(
    State(b): State<Shared>,
    uri: Uri,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    b.record("POST", &uri, &headers);
    if body["password"] == "wrong" {
        return detail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }
    Json(json!({
        "access_token": FREE_TOKEN,
        "token_type": "bearer",
        "user": b.user(FREE_TOKEN)
    }))
    .into_response()
}

async fn me(State(b): State<Shared>, uri: Uri, headers: HeaderMap) -> Response {
    match b.record("GET", &uri, &headers) {
        Some(token) => Json(b.user(&token)).into_response(),
        None => unauthenticated(),
    }
}

pub struct FakeBackend {
    pub base: String,
    backend: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let backend = Arc::new(Backend {
            seen: Mutex::new(Vec::new()),
            paid: Mutex::new(HashSet::from([PREMIUM_TOKEN.to_string()])),
        });
        let app = Router::new()
            .route("/api/dashboard/summary", get(summary))
            .route("/api/dashboard/risk-trend", get(risk_trend))
            .route("/api/dashboard/category/:category", get(category))
            .route("/api/dashboard/signals", get(signals))
            .route("/api/auth/upgrade", post(upgrade))
            .route("/api/auth/downgrade", post(downgrade))
            .route("/api/auth/login", post(login))
            .route("/api/auth/me", get(me))
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            base: format!("http://{addr}/api"),
            backend,
        }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.backend.seen.lock().expect("seen lock").clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|s| s.path == path).count()
    }

    pub fn config(&self) -> ShieldConfig {
        ShieldConfig::default()
            .with_api_base(&self.base)
            .expect("valid base")
    }

    pub fn app(
        &self,
        session: Rc<dyn SessionProvider>,
        store: Rc<dyn PreferenceStore>,
    ) -> AppState {
        let client = ApiClient::new(&self.config()).expect("client");
        AppState::new(client, session, store)
    }
}
