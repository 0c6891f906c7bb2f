//! Page containers: what each screen fetches and how its load state moves.
//!
//! Every fetch follows the same shape. `begin` hands out a [`Ticket`], the
//! request runs, and `finish` applies the outcome only if that ticket is
//! still the newest one. A slow response from an earlier attempt can never
//! overwrite a later one.

use crate::api::{CategoryRequest, MapRequest, SignalsRequest, SummaryRequest, TrendRequest};
use crate::error::ShieldError;
use crate::map::MapStats;
use crate::state::AppState;
use risk_registry::{
    Category, CategoryInsight, DashboardSummary, MapData, SignalFeed, SignalSource, TierChange,
    TrendPoint,
};
use shield_access::{Access, Entitlement};

pub const DASHBOARD_TREND_DAYS: u32 = 14;
pub const DASHBOARD_ERROR: &str = "Failed to load dashboard data. Make sure the backend is running.";
pub const SIGNALS_ERROR: &str = "Failed to load live signals.";
pub const MAP_ERROR: &str = "Failed to load map data.";
pub const CATEGORY_ERROR: &str = "Failed to load category insights";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Phase<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoadState<T> {
    phase: Phase<T>,
    issued: u64,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            issued: 0,
        }
    }
}

impl<T> LoadState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.phase = Phase::Loading;
        Ticket(self.issued)
    }

    /// Same as `begin`; named for the user-triggered path after a failure.
    pub fn retry(&mut self) -> Ticket {
        self.begin()
    }

    /// Returns false when the outcome belonged to a superseded request.
    pub fn finish(&mut self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        if ticket.0 != self.issued {
            tracing::debug!(ticket = ticket.0, current = self.issued, "dropping stale response");
            return false;
        }
        self.phase = match outcome {
            Ok(value) => Phase::Loaded(value),
            Err(message) => Phase::Failed(message),
        };
        true
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            Phase::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub trend: Vec<TrendPoint>,
}

#[derive(Clone, Debug, Default)]
pub struct DashboardPage {
    pub view: LoadState<DashboardView>,
}

impl DashboardPage {
    /// Summary and trend are requested together; either failing fails the page.
    pub async fn fetch(app: &AppState) -> Result<DashboardView, String> {
        let trend = TrendRequest::new(DASHBOARD_TREND_DAYS);
        let (summary, trend) = futures::future::try_join(app.call(&SummaryRequest), app.call(&trend))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "dashboard load failed");
                DASHBOARD_ERROR.to_string()
            })?;
        Ok(DashboardView {
            summary,
            trend: trend.trend,
        })
    }

    pub async fn load(&mut self, app: &AppState) -> bool {
        let ticket = self.view.begin();
        let outcome = Self::fetch(app).await;
        self.view.finish(ticket, outcome)
    }

    /// Free users see the upgrade banner.
    pub fn shows_upgrade_banner(entitlement: Entitlement) -> bool {
        !entitlement.is_premium()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SignalsPage {
    pub feed: LoadState<SignalFeed>,
    pub active: Option<SignalSource>,
}

impl SignalsPage {
    pub async fn fetch(app: &AppState) -> Result<SignalFeed, String> {
        app.call(&SignalsRequest::default()).await.map_err(|err| {
            tracing::warn!(error = %err, "signals load failed");
            SIGNALS_ERROR.to_string()
        })
    }

    pub async fn load(&mut self, app: &AppState) -> bool {
        let ticket = self.feed.begin();
        let outcome = Self::fetch(app).await;
        self.feed.finish(ticket, outcome)
    }

    /// Tab selection; `None` shows every source.
    pub fn set_active(&mut self, source: Option<SignalSource>) {
        self.active = source;
    }

    pub fn available_sources(&self) -> Vec<SignalSource> {
        self.feed.value().map(SignalFeed::sources).unwrap_or_default()
    }

    pub fn visible_sources(&self) -> Vec<SignalSource> {
        let available = self.available_sources();
        match self.active {
            Some(source) if available.contains(&source) => vec![source],
            _ => available,
        }
    }

    /// Sources withheld from this entitlement by the backend.
    pub fn locked_sources(entitlement: Entitlement) -> Vec<SignalSource> {
        if entitlement.is_premium() {
            Vec::new()
        } else {
            vec![SignalSource::Trade, SignalSource::Logistics]
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SupplyMapPage {
    pub data: LoadState<MapData>,
}

impl SupplyMapPage {
    pub async fn fetch(app: &AppState) -> Result<MapData, String> {
        app.call(&MapRequest).await.map_err(|err| {
            tracing::warn!(error = %err, "map load failed");
            MAP_ERROR.to_string()
        })
    }

    pub async fn load(&mut self, app: &AppState) -> bool {
        let ticket = self.data.begin();
        let outcome = Self::fetch(app).await;
        self.data.finish(ticket, outcome)
    }

    pub fn stats(&self) -> Option<MapStats> {
        self.data.value().map(MapStats::of)
    }
}

/// What a category click turned into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Not entitled; nothing was sent.
    Denied,
    /// The category is already shown or on its way.
    Unchanged,
    Fetch(Ticket),
}

#[derive(Clone, Debug, Default)]
pub struct CategoriesPage {
    pub selected: Option<Category>,
    pub insight: LoadState<CategoryInsight>,
    pub notice: Option<String>,
}

impl CategoriesPage {
    pub fn request(&mut self, category: Category, entitlement: Entitlement) -> Selection {
        if !entitlement.is_premium() {
            self.notice = Some(Access::Premium.denial_message().to_string());
            return Selection::Denied;
        }

        let settled = matches!(self.insight.phase(), Phase::Loading | Phase::Loaded(_));
        if self.selected == Some(category) && settled {
            return Selection::Unchanged;
        }

        self.notice = None;
        self.selected = Some(category);
        Selection::Fetch(self.insight.begin())
    }

    pub async fn fetch(app: &AppState, category: Category) -> Result<CategoryInsight, String> {
        app.call(&CategoryRequest { category })
            .await
            .map_err(|err| category_failure(&err))
    }

    pub fn complete(&mut self, ticket: Ticket, outcome: Result<CategoryInsight, String>) -> bool {
        self.insight.finish(ticket, outcome)
    }

    pub async fn select(&mut self, category: Category, app: &AppState) -> Selection {
        let selection = self.request(category, app.entitlement());
        if let Selection::Fetch(ticket) = selection {
            let outcome = Self::fetch(app, category).await;
            self.complete(ticket, outcome);
        }
        selection
    }
}

fn category_failure(err: &ShieldError) -> String {
    tracing::warn!(error = %err, "category insight load failed");
    match err {
        ShieldError::AccessDenied(access) => access.denial_message().to_string(),
        _ => err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| CATEGORY_ERROR.to_string()),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpgradeOutcome {
    /// Anonymous visitors are sent to sign-in first.
    SignInRequired,
    AlreadyPremium,
    Upgraded(TierChange),
    Failed(String),
}

#[derive(Clone, Debug, Default)]
pub struct PricingPage {
    pub busy: bool,
}

impl PricingPage {
    pub async fn upgrade(&mut self, app: &AppState) -> UpgradeOutcome {
        match app.entitlement() {
            Entitlement::Anonymous => return UpgradeOutcome::SignInRequired,
            Entitlement::Premium => return UpgradeOutcome::AlreadyPremium,
            Entitlement::Free => {}
        }

        self.busy = true;
        let outcome = match app.upgrade_to_premium().await {
            Ok(change) => UpgradeOutcome::Upgraded(change),
            Err(err) => {
                tracing::warn!(error = %err, "upgrade failed");
                UpgradeOutcome::Failed(err.to_string())
            }
        };
        self.busy = false;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_outcome_is_dropped() {
        let mut state: LoadState<u32> = LoadState::new();
        let first = state.begin();
        let second = state.retry();

        assert!(state.finish(second, Ok(2)));
        assert!(!state.finish(first, Err("late failure".into())));
        assert_eq!(state.value(), Some(&2));
    }

    #[test]
    fn failure_then_retry_reenters_loading() {
        let mut state: LoadState<u32> = LoadState::new();
        let ticket = state.begin();
        state.finish(ticket, Err(DASHBOARD_ERROR.into()));
        assert_eq!(state.error(), Some(DASHBOARD_ERROR));

        let ticket = state.retry();
        assert!(state.is_loading());
        state.finish(ticket, Ok(5));
        assert_eq!(state.phase(), &Phase::Loaded(5));
    }

    #[test]
    fn free_category_click_is_denied_locally() {
        let mut page = CategoriesPage::default();
        assert_eq!(page.request(Category::Toys, Entitlement::Free), Selection::Denied);
        assert_eq!(page.notice.as_deref(), Some(Access::Premium.denial_message()));
        assert_eq!(page.insight.phase(), &Phase::Idle);
    }

    #[test]
    fn repeated_click_on_loaded_category_is_a_no_op() {
        let mut page = CategoriesPage::default();
        let Selection::Fetch(ticket) = page.request(Category::Food, Entitlement::Premium) else {
            panic!("expected a fetch");
        };
        assert_eq!(
            page.request(Category::Food, Entitlement::Premium),
            Selection::Unchanged
        );
        page.complete(
            ticket,
            Ok(CategoryInsight {
                category: "Food".into(),
                ..Default::default()
            }),
        );
        assert_eq!(
            page.request(Category::Food, Entitlement::Premium),
            Selection::Unchanged
        );
        assert!(matches!(
            page.request(Category::Clothing, Entitlement::Premium),
            Selection::Fetch(_)
        ));
    }

    #[test]
    fn failed_category_can_be_retried() {
        let mut page = CategoriesPage::default();
        let Selection::Fetch(ticket) = page.request(Category::Toys, Entitlement::Premium) else {
            panic!("expected a fetch");
        };
        page.complete(ticket, Err(CATEGORY_ERROR.into()));
        assert!(matches!(
            page.request(Category::Toys, Entitlement::Premium),
            Selection::Fetch(_)
        ));
    }

    #[test]
    fn forbidden_surfaces_backend_detail() {
        let err = ShieldError::from_status(403, r#"{"detail":"Upgrade needed"}"#);
        assert_eq!(category_failure(&err), "Upgrade needed");
        let err = ShieldError::Transport("refused".into());
        assert_eq!(category_failure(&err), CATEGORY_ERROR);
    }

    #[test]
    fn signals_tab_filters_loaded_sources() {
        let mut page = SignalsPage::default();
        let ticket = page.feed.begin();
        page.feed.finish(
            ticket,
            Ok(SignalFeed {
                mandi: Some(Vec::new()),
                weather: Some(Vec::new()),
                ..Default::default()
            }),
        );
        assert_eq!(
            page.visible_sources(),
            vec![SignalSource::Mandi, SignalSource::Weather]
        );
        page.set_active(Some(SignalSource::Weather));
        assert_eq!(page.visible_sources(), vec![SignalSource::Weather]);
        page.set_active(Some(SignalSource::Trade));
        assert_eq!(page.visible_sources().len(), 2);
        assert_eq!(SignalsPage::locked_sources(Entitlement::Free).len(), 2);
    }
}
