use crate::app::{use_ui, Route};
use leptos::*;
use risk_registry::{LogisticsSignal, PriceRow, SignalFeed, SignalSource, TradeSignal, WeatherSignal};
use shield_core::pages::{Phase, SignalsPage};
use wasm_bindgen_futures::spawn_local;

fn icon(source: SignalSource) -> &'static str {
    match source {
        SignalSource::Mandi => "🌾",
        SignalSource::Enam => "🏪",
        SignalSource::Weather => "🌦️",
        SignalSource::Trade => "📊",
        SignalSource::Logistics => "🚚",
    }
}

fn severity_class(fraction: f64, high: f64, medium: f64) -> &'static str {
    if fraction > high {
        "text-high"
    } else if fraction > medium {
        "text-medium"
    } else {
        "text-low"
    }
}

#[component]
pub fn Signals() -> impl IntoView {
    let ui = use_ui();
    let page = create_rw_signal(SignalsPage::default());

    let load = move || {
        let Some(ticket) = page.try_update(|p| p.feed.begin()) else {
            return;
        };
        let app = ui.app();
        spawn_local(async move {
            let outcome = SignalsPage::fetch(&app).await;
            page.try_update(|p| p.feed.finish(ticket, outcome));
        });
    };
    load();

    let tab = move |source: Option<SignalSource>, label: String| {
        view! {
          <button
            class=move || {
                if page.with(|p| p.active == source) {
                    "btn btn-sm btn-primary"
                } else {
                    "btn btn-sm btn-secondary"
                }
            }
            on:click=move |_| page.update(|p| p.set_active(source))
          >
            {label}
          </button>
        }
    };

    let body = move || {
        page.with(|p| match p.feed.phase() {
            Phase::Idle | Phase::Loading => view! {
              <div class="loading-container">
                <div class="spinner"></div>
                <p>"Fetching live signals..."</p>
              </div>
            }
            .into_view(),
            Phase::Failed(message) => view! { <div class="error-message">{message.clone()}</div> }.into_view(),
            Phase::Loaded(feed) => {
                let locked = SignalsPage::locked_sources(ui.entitlement.get())
                    .into_iter()
                    .any(|s| feed.count(s).is_none());
                let banner = locked.then(|| view! {
                  <div class="premium-banner">
                    <div>
                      <h3>"🔒 Trade & Logistics Data"</h3>
                      <p>"Upgrade to premium for access to import/export trade and logistics corridor data."</p>
                    </div>
                    <button class="upgrade-btn" on:click=move |_| ui.route.set(Route::Pricing)>"Upgrade"</button>
                  </div>
                });
                let cards = p
                    .visible_sources()
                    .into_iter()
                    .map(|source| source_card(source, feed))
                    .collect_view();
                view! { {banner} {cards} }.into_view()
            }
        })
    };

    view! {
      <div class="signals">
        <header class="page-header">
          <h1>"Live Signal Feed"</h1>
          <p>"Real-time data from all integrated API sources"</p>
          <div class="page-header-actions">
            {tab(None, "All Sources".to_string())}
            {move || {
                page.with(|p| p.available_sources())
                    .into_iter()
                    .map(|s| tab(Some(s), format!("{} {}", icon(s), s.label())))
                    .collect_view()
            }}
            <button class="btn btn-sm btn-secondary" on:click=move |_| load()>"🔄 Refresh"</button>
          </div>
        </header>
        {body}
      </div>
    }
}

fn source_card(source: SignalSource, feed: &SignalFeed) -> View {
    let count = feed.count(source).unwrap_or_default();
    let content = match source {
        SignalSource::Mandi => price_table("Market", feed.mandi.as_deref().unwrap_or_default()),
        SignalSource::Enam => price_table("APMC", feed.enam.as_deref().unwrap_or_default()),
        SignalSource::Weather => weather_grid(feed.weather.as_deref().unwrap_or_default()),
        SignalSource::Trade => trade_table(feed.trade.as_deref().unwrap_or_default()),
        SignalSource::Logistics => logistics_table(feed.logistics.as_deref().unwrap_or_default()),
    };
    view! {
      <div class="card signal-card">
        <div class="card-header">
          <span class="card-title">{format!("{} {} ({count} records)", icon(source), source.label())}</span>
          <span class="live-dot">"● Live"</span>
        </div>
        {content}
      </div>
    }
    .into_view()
}

fn price_table(place: &'static str, rows: &[PriceRow]) -> View {
    let body = rows
        .iter()
        .map(|r| view! {
          <tr>
            <td>{r.state.clone()}</td>
            <td>{r.market.clone()}</td>
            <td class="strong">{r.commodity.clone()}</td>
            <td>{format!("₹{:.0}", r.min_price)}</td>
            <td>{format!("₹{:.0}", r.max_price)}</td>
            <td class="strong text-low">{format!("₹{:.0}", r.modal_price)}</td>
          </tr>
        })
        .collect_view();
    view! {
      <table class="data-table">
        <thead>
          <tr>
            <th>"State"</th><th>{place}</th><th>"Commodity"</th>
            <th>"Min ₹"</th><th>"Max ₹"</th><th>"Modal ₹"</th>
          </tr>
        </thead>
        <tbody>{body}</tbody>
      </table>
    }
    .into_view()
}

fn weather_grid(rows: &[WeatherSignal]) -> View {
    let items = rows
        .iter()
        .map(|w| {
            let disruptive = w.is_disruptive.then(|| view! { <span class="disruption-tag">"⚠ Disruption Risk"</span> });
            view! {
              <div class="signal-item">
                <div class="signal-item-head">
                  <h5>{w.city.clone()}</h5>
                  <span class=severity_class(w.disruption_severity, 0.5, 0.2)>
                    {format!("{:.0}%", w.disruption_severity * 100.0)}
                  </span>
                </div>
                <p class="meta">
                  {format!("{} • {}°C • Wind: {} m/s", w.weather_description, w.temperature, w.wind_speed)}
                </p>
                {disruptive}
              </div>
            }
        })
        .collect_view();
    view! { <div class="grid-3">{items}</div> }.into_view()
}

fn trade_table(rows: &[TradeSignal]) -> View {
    let body = rows
        .iter()
        .map(|t| {
            let (sign, class) = if t.change_pct > 0.0 {
                ("+", "strong text-low")
            } else {
                ("", "strong text-high")
            };
            view! {
              <tr>
                <td class="strong">{t.commodity.clone()}</td>
                <td>{t.country.clone()}</td>
                <td class="capitalize">{t.trade_type.clone()}</td>
                <td>{format!("{:.0}", t.quantity_mt)}</td>
                <td>{format!("₹{} Cr", t.value_inr_cr)}</td>
                <td class=class>
                  {format!("{sign}{}%", t.change_pct)}
                </td>
              </tr>
            }
        })
        .collect_view();
    view! {
      <table class="data-table">
        <thead>
          <tr>
            <th>"Commodity"</th><th>"Country"</th><th>"Type"</th>
            <th>"Quantity (MT)"</th><th>"Value (₹ Cr)"</th><th>"Change %"</th>
          </tr>
        </thead>
        <tbody>{body}</tbody>
      </table>
    }
    .into_view()
}

fn logistics_table(rows: &[LogisticsSignal]) -> View {
    let body = rows
        .iter()
        .map(|l| {
            let pct = l.congestion_level * 100.0;
            view! {
              <tr>
                <td class="strong ellipsis">{l.corridor_name.clone()}</td>
                <td class="capitalize">{l.mode.clone()}</td>
                <td>{format!("{:.1}h", l.current_delay_hours)}</td>
                <td>
                  <div class="congestion">
                    <div class="congestion-track">
                      <div
                        class=format!("congestion-fill {}", severity_class(l.congestion_level, 0.5, 0.3))
                        style=format!("width:{pct:.0}%")
                      ></div>
                    </div>
                    <span>{format!("{pct:.0}%")}</span>
                  </div>
                </td>
                <td>
                  <span class="status-tag" class:congested={l.is_congested()}>{l.status.clone()}</span>
                </td>
              </tr>
            }
        })
        .collect_view();
    view! {
      <table class="data-table">
        <thead>
          <tr>
            <th>"Corridor"</th><th>"Mode"</th><th>"Delay (hrs)"</th>
            <th>"Congestion"</th><th>"Status"</th>
          </tr>
        </thead>
        <tbody>{body}</tbody>
      </table>
    }
    .into_view()
}
