use leptos::*;
use shield_core::charts::GaugeGeometry;

#[component]
pub fn RiskGauge(
    score: f64,
    #[prop(default = GaugeGeometry::DEFAULT_SIZE)] size: f64,
    #[prop(optional, into)] label: Option<String>,
) -> impl IntoView {
    let g = GaugeGeometry::new(score, size);
    let c = g.center();
    view! {
      <div class="gauge">
        <svg width=g.size height=g.size viewBox=format!("0 0 {0} {0}", g.size)>
          <circle class="gauge-track" cx=c cy=c r=g.radius fill="none" stroke-width="10"/>
          <circle
            class="gauge-value"
            cx=c
            cy=c
            r=g.radius
            fill="none"
            stroke=g.color
            stroke-width="10"
            stroke-linecap="round"
            stroke-dasharray=g.circumference
            stroke-dashoffset=g.dash_offset
            transform=format!("rotate(-90 {c} {c})")
          />
        </svg>
        <div class=format!("gauge-score {}", g.css_class)>{g.display}</div>
        {label.map(|l| view! { <div class="gauge-label">{l}</div> })}
      </div>
    }
}
