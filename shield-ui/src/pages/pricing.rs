use crate::app::{use_ui, Route};
use leptos::*;
use shield_core::pages::{PricingPage, UpgradeOutcome};
use shield_core::Entitlement;
use wasm_bindgen_futures::spawn_local;

const FREE_FEATURES: [(&str, bool); 11] = [
    ("Macro supply risk dashboard", true),
    ("Overall risk score", true),
    ("Segment-level overview (Procurement, Transport, Trade)", true),
    ("Mandi & eNAM price feeds", true),
    ("Weather disruption signals", true),
    ("Basic recommendations", true),
    ("7-day risk trend", true),
    ("Category-level insights", false),
    ("Trade & logistics raw data", false),
    ("Supply network corridors", false),
    ("Deep bottleneck analysis", false),
];

const PREMIUM_FEATURES: [&str; 11] = [
    "Everything in Free",
    "Category-level insights (Food, Clothing, Stationery, Toys)",
    "Deep segment-level risk analysis",
    "Import/Export trade data access",
    "Logistics corridor monitoring",
    "Supply network corridor visualization",
    "Advanced bottleneck detection",
    "Category-specific recommendations",
    "Radar chart risk factor analysis",
    "Full recommendation engine",
    "Priority support",
];

const COMPARISON: [(&str, &str, &str); 6] = [
    ("Overall risk score", "✓", "✓"),
    ("Live price and weather signals", "✓", "✓"),
    ("Trade & logistics signals", "—", "✓"),
    ("Category insights", "—", "✓"),
    ("CSV / PDF category reports", "—", "✓"),
    ("Support", "Community", "Priority"),
];

#[component]
pub fn Pricing() -> impl IntoView {
    let ui = use_ui();
    let busy = create_rw_signal(false);
    let failure = create_rw_signal(None::<String>);

    let upgrade = move || {
        if busy.get_untracked() {
            return;
        }
        busy.set(true);
        failure.set(None);
        let app = ui.app();
        spawn_local(async move {
            let mut pricing = PricingPage::default();
            let outcome = pricing.upgrade(&app).await;
            busy.set(pricing.busy);
            match outcome {
                UpgradeOutcome::SignInRequired => ui.sign_in(),
                UpgradeOutcome::AlreadyPremium => ui.refresh(),
                UpgradeOutcome::Upgraded(change) => {
                    tracing::info!(message = %change.message, "subscription upgraded");
                    ui.refresh();
                    ui.route.set(Route::Categories);
                }
                UpgradeOutcome::Failed(message) => failure.set(Some(message)),
            }
        });
    };

    let free_list = FREE_FEATURES
        .into_iter()
        .map(|(text, included)| view! { <li class:disabled={!included}>{text}</li> })
        .collect_view();
    let premium_list = PREMIUM_FEATURES
        .into_iter()
        .map(|text| view! { <li>{text}</li> })
        .collect_view();
    let comparison = COMPARISON
        .into_iter()
        .map(|(feature, free, premium)| view! {
          <tr><td>{feature}</td><td>{free}</td><td>{premium}</td></tr>
        })
        .collect_view();

    let free_action = move || match ui.entitlement.get() {
        Entitlement::Anonymous => view! {
          <button class="btn btn-secondary btn-lg" on:click=move |_| ui.sign_in()>"Get Started Free"</button>
        }
        .into_view(),
        Entitlement::Free => view! {
          <button class="btn btn-secondary btn-lg" disabled=true>"Current Plan"</button>
        }
        .into_view(),
        Entitlement::Premium => ().into_view(),
    };

    let premium_action = move || match ui.entitlement.get() {
        Entitlement::Premium => view! {
          <button class="btn btn-secondary btn-lg" disabled=true>"Current Plan"</button>
        }
        .into_view(),
        entitlement => view! {
          <button class="btn btn-premium btn-lg" disabled=move || busy.get() on:click=move |_| upgrade()>
            {move || {
                if busy.get() {
                    "Upgrading..."
                } else if entitlement == Entitlement::Anonymous {
                    "Start Free Trial"
                } else {
                    "Upgrade Now"
                }
            }}
          </button>
        }
        .into_view(),
    };

    view! {
      <div class="pricing">
        <header class="pricing-header">
          <h1>"Choose Your Plan"</h1>
          <p>"Get the supply chain intelligence you need. Start free, upgrade when you need deeper insights."</p>
        </header>

        <section class="pricing-grid">
          <div class="card pricing-card">
            <div class="plan-name">"Free"</div>
            <div class="plan-price">"₹0 "<span>"/month"</span></div>
            <ul class="plan-features">{free_list}</ul>
            {free_action}
          </div>
          <div class="card pricing-card featured">
            <div class="plan-name">"Premium"</div>
            <div class="plan-price">"₹2,999 "<span>"/month"</span></div>
            <ul class="plan-features">{premium_list}</ul>
            {premium_action}
          </div>
        </section>

        {move || failure.get().map(|m| view! { <div class="error-message">{m}</div> })}

        <section class="card">
          <div class="card-header"><span class="card-title">"Feature Comparison"</span></div>
          <table class="data-table">
            <thead><tr><th>"Feature"</th><th>"Free"</th><th>"Premium"</th></tr></thead>
            <tbody>{comparison}</tbody>
          </table>
        </section>
      </div>
    }
}
