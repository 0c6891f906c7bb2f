use crate::app::{use_ui, Route, Ui};
use crate::components::charts::{FactorBars, TrendLines};
use crate::components::gauge::RiskGauge;
use crate::components::risk_badge::RiskBadge;
use leptos::*;
use risk_registry::{Bottleneck, Recommendation, SegmentKind};
use shield_core::charts::TrendChart;
use shield_core::pages::{DashboardPage, DashboardView, Phase};
use wasm_bindgen_futures::spawn_local;

#[component]
pub fn Dashboard() -> impl IntoView {
    let ui = use_ui();
    let page = create_rw_signal(DashboardPage::default());

    let load = move || {
        let Some(ticket) = page.try_update(|p| p.view.begin()) else {
            return;
        };
        let app = ui.app();
        spawn_local(async move {
            let outcome = DashboardPage::fetch(&app).await;
            page.try_update(|p| p.view.finish(ticket, outcome));
        });
    };
    load();

    move || {
        page.with(|p| match p.view.phase() {
            Phase::Idle | Phase::Loading => view! {
              <div class="loading-container">
                <div class="spinner"></div>
                <p>"Analyzing supply chain signals..."</p>
              </div>
            }
            .into_view(),
            Phase::Failed(message) => view! {
              <div class="loading-container">
                <div class="error-message">{message.clone()}</div>
                <button class="btn" on:click=move |_| load()>"Retry"</button>
              </div>
            }
            .into_view(),
            Phase::Loaded(data) => loaded(ui, data.clone()),
        })
    }
}

fn loaded(ui: Ui, data: DashboardView) -> View {
    let summary = data.summary;
    let chart = TrendChart::from_points(&data.trend);

    let segments = SegmentKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let risk = summary.segment(kind)?.risk();
            Some(view! {
              <div class="card segment-card">
                <RiskGauge score=risk.score size=120.0 label=kind.label()/>
                <RiskBadge level=risk.level/>
              </div>
            })
        })
        .collect_view();

    let sources = summary
        .signals_summary
        .as_ref()
        .map(|s| {
            let rows = s
                .rows()
                .into_iter()
                .map(|(name, count)| view! {
                  <div class="source-row"><span>{name}</span><b>{count}</b></div>
                })
                .collect_view();
            view! {
              {rows}
              <div class="source-row total"><span>"Total"</span><b>{s.total}</b></div>
            }
            .into_view()
        })
        .unwrap_or_else(|| view! { <p class="empty-state">"No signal counts reported."</p> }.into_view());

    let banner = DashboardPage::shows_upgrade_banner(ui.entitlement.get_untracked()).then(|| {
        view! {
          <div class="premium-banner">
            <div>
              <h3>"🔓 Unlock Category-Level Insights"</h3>
              <p>"Get deep analysis for Food, Clothing, Stationery and Toys with price data and category recommendations."</p>
            </div>
            <button class="upgrade-btn" on:click=move |_| ui.route.set(Route::Pricing)>"Upgrade to Premium"</button>
          </div>
        }
    });

    view! {
      <div class="dashboard">
        <header class="page-header">
          <h1>"Supply Chain Risk Dashboard"</h1>
          <span class="meta">{format!("Updated {}", summary.computed_at)}</span>
        </header>

        <section class="overview">
          <div class="card overall-card">
            <RiskGauge score=summary.overall_score label="Overall Risk"/>
            <RiskBadge level=summary.overall_risk_level/>
          </div>
          {segments}
        </section>

        {banner}

        <section class="grid-2">
          <div class="card">
            <h3>"Risk Trend (14 Days)"</h3>
            <TrendLines chart=chart/>
          </div>
          <div class="card">
            <h3>"Data Sources"</h3>
            {sources}
          </div>
        </section>

        <section class="grid-2">
          <div class="card">
            <h3>"Identified Bottlenecks"</h3>
            <Bottlenecks items=summary.bottlenecks.clone()/>
          </div>
          <div class="card">
            <h3>"Recommendations"</h3>
            <Recommendations items=summary.recommendations.clone()/>
          </div>
        </section>

        <section class="card">
          <h3>"Contributing Risk Factors (Explainability)"</h3>
          <FactorBars summary=summary.clone()/>
        </section>
      </div>
    }
    .into_view()
}

#[component]
pub fn Bottlenecks(items: Vec<Bottleneck>) -> impl IntoView {
    if items.is_empty() {
        return view! { <p class="empty-state">"No significant bottlenecks detected."</p> }.into_view();
    }
    items
        .into_iter()
        .map(|b| {
            let explanations = b
                .explanations
                .iter()
                .map(|e| view! { <li>{e.clone()}</li> })
                .collect_view();
            view! {
              <div class="bottleneck" class:severe={b.is_severe()}>
                <div class="bottleneck-head">
                  <b>{b.region.clone()}</b>
                  <RiskBadge level=b.risk_level/>
                </div>
                <div class="meta">{b.summary()}</div>
                <ul>{explanations}</ul>
              </div>
            }
        })
        .collect_view()
}

#[component]
pub fn Recommendations(items: Vec<Recommendation>) -> impl IntoView {
    if items.is_empty() {
        return view! { <p class="empty-state">"No recommendations at this time."</p> }.into_view();
    }
    items
        .into_iter()
        .map(|r| {
            view! {
              <div class="recommendation">
                <div class="recommendation-head">
                  <span class="priority">{format!("P{}", r.priority)}</span>
                  <b>{r.title.clone()}</b>
                </div>
                <p>{r.description.clone()}</p>
                <span class="action-tag">{r.action_label()}</span>
              </div>
            }
        })
        .collect_view()
}
