//! Client-side core of the SupplyShield dashboard: the HTTP client, the
//! premium gate, persisted preferences, view models for each page, chart
//! and map geometry, and the category report exporters.
//!
//! Nothing in here touches a DOM or a terminal; `shield-ui` and
//! `shield-cli` drive these types.

pub mod api;
pub mod charts;
pub mod config;
pub mod error;
pub mod map;
pub mod pages;
pub mod report;
pub mod session;
pub mod state;
pub mod store;

pub use api::{ApiClient, Endpoint, FeedQuery, Method};
pub use config::ShieldConfig;
pub use error::{Result, ShieldError};
pub use map::{MapAdapter, MapSurface};
pub use pages::{LoadState, Phase, Ticket};
pub use report::{export, ExportArtifact, ExportFormat};
pub use session::{AnonymousSession, SessionProvider, StaticSession, StoredTokenSession};
pub use state::{AppState, Preferences, Theme};
#[cfg(feature = "sqlite")]
pub use store::SqliteStore;
pub use store::{MemoryStore, PreferenceStore};

pub use risk_registry as model;
pub use shield_access::{Access, Entitlement};
