use crate::app::{use_ui, Route};
use crate::bridge;
use crate::components::charts::{PriceBars, Radar};
use crate::components::gauge::RiskGauge;
use crate::components::risk_badge::RiskBadge;
use crate::download;
use crate::pages::dashboard::Recommendations;
use leptos::*;
use risk_registry::{Category, CategoryInsight};
use shield_core::charts::radar_points;
use shield_core::error::ShieldError;
use shield_core::pages::{CategoriesPage, Phase, Selection};
use shield_core::report::{export, ExportFormat, ExportIndicator};
use wasm_bindgen_futures::spawn_local;

fn icon(category: Category) -> &'static str {
    match category {
        Category::Food => "🍽️",
        Category::Clothing => "👔",
        Category::Stationery => "📝",
        Category::Toys => "🧸",
    }
}

#[component]
pub fn Categories() -> impl IntoView {
    let ui = use_ui();
    let page = create_rw_signal(CategoriesPage::default());
    let exporter = create_rw_signal(ExportIndicator::default());

    let select = move |category: Category| {
        let entitlement = ui.entitlement.get_untracked();
        let Some(Selection::Fetch(ticket)) = page.try_update(|p| p.request(category, entitlement))
        else {
            return;
        };
        let app = ui.app();
        spawn_local(async move {
            let outcome = CategoriesPage::fetch(&app, category).await;
            page.try_update(|p| p.complete(ticket, outcome));
            // A 403 drops the local premium flag.
            ui.refresh();
        });
    };

    let run_export = move |format: ExportFormat| {
        let Some(Some(token)) = exporter.try_update(|e| e.start(format)) else {
            return;
        };
        let outcome = page
            .with_untracked(|p| {
                p.insight
                    .value()
                    .map(|insight| export(insight, format, bridge::today()))
            })
            .unwrap_or_else(|| Err(ShieldError::Export("no insight loaded".into())))
            .and_then(|artifact| download::save(&artifact));
        let delay = exporter.with_untracked(|e| e.settle(token, &outcome));
        set_timeout(
            move || {
                exporter.try_update(|e| e.clear(token));
            },
            delay,
        );
    };

    let premium = move || ui.entitlement.get().is_premium();

    let cards = Category::ALL
        .into_iter()
        .map(|category| {
            let summary = move || {
                page.with(|p| {
                    let insight = p.insight.value().filter(|_| p.selected == Some(category))?;
                    let level = insight.risk_level;
                    Some(view! {
                      <div class="category-score">
                        <RiskBadge level=level/>
                        <div class=format!("category-value {}", level.css_class())>
                          {format!("{:.1}", insight.risk_score)}
                        </div>
                      </div>
                    })
                })
            };
            view! {
              <div
                class="card category-card"
                class:locked=move || !premium()
                class:selected=move || page.with(|p| p.selected == Some(category))
                style=format!("--accent:{}", category.accent())
                on:click=move |_| select(category)
              >
                <div class="category-icon">{icon(category)}</div>
                <div class="category-name">{category.as_str()}</div>
                <div class="category-desc">{category.description()}</div>
                {summary}
              </div>
            }
        })
        .collect_view();

    let detail = move || {
        page.with(|p| match p.insight.phase() {
            Phase::Idle => ().into_view(),
            Phase::Loading => {
                let name = p.selected.map(|c| c.as_str()).unwrap_or_default();
                view! {
                  <div class="loading-container">
                    <div class="spinner"></div>
                    <p>{format!("Analyzing {name} supply chain...")}</p>
                  </div>
                }
                .into_view()
            }
            Phase::Failed(message) => view! { <div class="error-message">{message.clone()}</div> }.into_view(),
            Phase::Loaded(insight) => insight_view(insight.clone(), exporter, run_export),
        })
    };

    view! {
      <div class="categories">
        <header class="page-header">
          <h1>"Category Intelligence"</h1>
          <p>
            "Deep segment-level risk analysis per product category"
            {move || (!premium()).then_some(" • Premium feature")}
          </p>
        </header>

        <Show when=move || !premium() fallback=|| ()>
          <div class="premium-banner">
            <div>
              <h3>"🔒 Premium Feature"</h3>
              <p>"Category-level insights are available for premium subscribers. Get deep analysis for each product category."</p>
            </div>
            <button class="upgrade-btn" on:click=move |_| ui.route.set(Route::Pricing)>"Upgrade to Premium"</button>
          </div>
        </Show>

        {move || page.with(|p| p.notice.clone()).map(|n| view! { <div class="error-message">{n}</div> })}

        <section class="category-grid">{cards}</section>
        {detail}
      </div>
    }
}

fn insight_view(
    insight: CategoryInsight,
    exporter: RwSignal<ExportIndicator>,
    run_export: impl Fn(ExportFormat) + Copy + 'static,
) -> View {
    let heading_icon = insight.category.parse::<Category>().map(icon).unwrap_or("📦");

    let export_button = move |format: ExportFormat| {
        let busy = move || exporter.with(|e| e.exporting());
        view! {
          <button
            class="btn btn-sm btn-secondary"
            disabled=move || busy().is_some()
            on:click=move |_| run_export(format)
          >
            {move || {
                if busy() == Some(format) {
                    "Exporting...".to_string()
                } else {
                    format!("📄 Export {}", format.label())
                }
            }}
          </button>
        }
    };

    let commodities = insight
        .commodities_tracked
        .iter()
        .map(|c| view! { <span class="tag">{c.clone()}</span> })
        .collect_view();

    let prices = (!insight.price_data.is_empty()).then(|| {
        view! {
          <div class="card">
            <div class="card-header"><span class="card-title">"Price Data"</span></div>
            <PriceBars rows=insight.price_data.clone()/>
          </div>
        }
    });

    let bottlenecks = (!insight.bottlenecks.is_empty()).then(|| {
        let items = insight
            .bottlenecks
            .iter()
            .map(|b| view! {
              <div class="bottleneck-card">
                <div class="bottleneck-risk" class:severe={b.is_severe()}>
                  {format!("{:.0}%", b.combined_risk)}
                </div>
                <div class="bottleneck-info">
                  <h4>{b.region.clone()}</h4>
                  <p>{format!("{} signals", b.signal_count)}</p>
                </div>
              </div>
            })
            .collect_view();
        view! {
          <div class="card">
            <div class="card-header"><span class="card-title">"🔍 Category Bottlenecks"</span></div>
            <div class="grid-3">{items}</div>
          </div>
        }
    });

    view! {
      <div class="category-detail">
        <div class="export-actions">
          {export_button(ExportFormat::Csv)}
          {export_button(ExportFormat::Pdf)}
        </div>

        <section class="grid-2">
          <div class="card">
            <div class="card-header">
              <span class="card-title">{format!("{heading_icon} {} Risk Analysis", insight.category)}</span>
              <RiskBadge level=insight.risk_level/>
            </div>
            <div class="category-summary">
              <RiskGauge score=insight.risk_score label=insight.category.clone()/>
              <div>
                <span class="meta">"Tracked Commodities"</span>
                <div class="tags">{commodities}</div>
              </div>
            </div>
          </div>
          <div class="card">
            <div class="card-header"><span class="card-title">"Risk Factor Radar"</span></div>
            <Radar axes=radar_points(&insight)/>
          </div>
        </section>

        <section class="grid-2">
          {prices}
          <div class="card">
            <div class="card-header"><span class="card-title">"💡 Category Recommendations"</span></div>
            <Recommendations items=insight.recommendations.clone()/>
          </div>
        </section>

        {bottlenecks}
      </div>
    }
    .into_view()
}
