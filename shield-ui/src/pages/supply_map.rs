use crate::app::use_ui;
use crate::components::risk_badge::RiskBadge;
use crate::leaflet::LeafletSurface;
use leptos::*;
use risk_registry::{MapData, RiskPoint};
use shield_core::map::MapStats;
use shield_core::pages::{Phase, SupplyMapPage};
use shield_core::MapAdapter;
use wasm_bindgen_futures::spawn_local;

fn details(point: &RiskPoint) -> String {
    point
        .details
        .iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => format!("{k}: {s}"),
            other => format!("{k}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(" • ")
}

#[component]
pub fn SupplyMap() -> impl IntoView {
    let ui = use_ui();
    let page = create_rw_signal(SupplyMapPage::default());
    let adapter = store_value(None::<MapAdapter<LeafletSurface>>);
    let map_error = create_rw_signal(None::<String>);
    let container = create_node_ref::<html::Div>();

    let draw = move |data: &MapData| {
        let outcome = adapter
            .try_update_value(|slot| slot.as_mut().map(|a| a.apply(data)))
            .flatten();
        match outcome {
            Some(Err(err)) => {
                tracing::error!(error = %err, "map render failed");
                map_error.set(Some(err.to_string()));
            }
            Some(Ok(_)) => map_error.set(None),
            None => {}
        }
    };

    container.on_load(move |div| {
        let element = web_sys::HtmlElement::clone(&div);
        adapter.set_value(Some(MapAdapter::new(LeafletSurface::new(element))));
        page.with_untracked(|p| {
            if let Some(data) = p.data.value() {
                draw(data);
            }
        });
    });

    create_effect(move |_| {
        page.with(|p| {
            if let Some(data) = p.data.value() {
                draw(data);
            }
        });
    });

    on_cleanup(move || {
        // Dropping the adapter tears the map down.
        adapter.try_update_value(|slot| slot.take());
    });

    let ticket = page.try_update(|p| p.data.begin());
    if let Some(ticket) = ticket {
        let app = ui.app();
        spawn_local(async move {
            let outcome = SupplyMapPage::fetch(&app).await;
            page.try_update(|p| p.data.finish(ticket, outcome));
        });
    }

    let subtitle = move || {
        let mut text = String::from(
            "Geographic visualization of supply chain risk overlays across major hubs and corridors",
        );
        if !ui.entitlement.get().is_premium() {
            text.push_str(" • Upgrade for corridor details");
        }
        text
    };

    let stats = move || {
        let MapStats {
            points,
            corridors,
            high_risk_zones,
        } = page.with(|p| p.stats()).unwrap_or_default();
        view! {
          <div class="card"><div class="card-title">"Risk Points"</div><div class="card-value">{points}</div></div>
          <div class="card"><div class="card-title">"Active Corridors"</div><div class="card-value">{corridors}</div></div>
          <div class="card"><div class="card-title">"High Risk Zones"</div><div class="card-value risk-high">{high_risk_zones}</div></div>
          <div class="card"><div class="card-title">"Coverage"</div><div class="card-value accent">"India"</div></div>
        }
    };

    let status = move || {
        page.with(|p| match p.data.phase() {
            Phase::Idle | Phase::Loading => view! {
              <div class="loading-container">
                <div class="spinner"></div>
                <p>"Loading supply chain map..."</p>
              </div>
            }
            .into_view(),
            Phase::Failed(message) => view! { <div class="error-message">{message.clone()}</div> }.into_view(),
            Phase::Loaded(_) => ().into_view(),
        })
    };

    let rows = move || {
        page.with(|p| {
            p.data
                .value()
                .map(|data| {
                    data.points
                        .iter()
                        .map(|point| view! {
                          <tr>
                            <td class="strong">{point.region.clone()}</td>
                            <td class="capitalize">{point.segment.clone()}</td>
                            <td>
                              <span class=format!("strong {}", point.risk_level.css_class())>
                                {format!("{}%", point.risk_score)}
                              </span>
                            </td>
                            <td><RiskBadge level=point.risk_level/></td>
                            <td class="small">{details(point)}</td>
                          </tr>
                        })
                        .collect_view()
                })
                .unwrap_or_else(|| ().into_view())
        })
    };

    view! {
      <div class="supply-map">
        <header class="page-header">
          <h1>"Supply Chain Network Map"</h1>
          <p>{subtitle}</p>
        </header>
        {status}
        <section class="grid-4">{stats}</section>
        <section class="card map-card">
          <div class="map-container" node_ref=container></div>
          {move || map_error.get().map(|e| view! { <div class="error-message">{e}</div> })}
        </section>
        <section class="card">
          <div class="card-header"><span class="card-title">"Risk Points Detail"</span></div>
          <table class="data-table">
            <thead>
              <tr>
                <th>"Region"</th><th>"Segment"</th><th>"Risk Score"</th><th>"Level"</th><th>"Details"</th>
              </tr>
            </thead>
            <tbody>{rows}</tbody>
          </table>
        </section>
      </div>
    }
}
