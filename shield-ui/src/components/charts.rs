//! SVG renderings of the geometry in `shield_core::charts`.

use leptos::*;
use risk_registry::{DashboardSummary, PriceRow};
use shield_core::charts::{
    self, factor_bars, price_bars, radar_polygon, FactorRow, RadarAxis, SeriesKind, TrendChart,
    Y_TICKS,
};

const TREND_W: f64 = 640.0;
const TREND_H: f64 = 240.0;
const AXIS_PAD: f64 = 36.0;

#[component]
pub fn TrendLines(chart: TrendChart) -> impl IntoView {
    if chart.is_empty() {
        return view! { <p class="empty-state">"No trend data yet."</p> }.into_view();
    }
    let n = chart.labels.len();
    let label_every = (n / 7).max(1);

    let grid = Y_TICKS
        .iter()
        .map(|tick| {
            let y = charts::y_at(*tick, TREND_H);
            view! {
              <line class="grid" x1=0 x2=TREND_W y1=y y2=y/>
              <text class="tick" x="-6" y={y + 4.0} text-anchor="end">{*tick as i64}</text>
            }
        })
        .collect_view();

    let labels = chart
        .labels
        .iter()
        .enumerate()
        .filter(|(i, _)| i % label_every == 0)
        .map(|(i, label)| {
            let x = charts::x_at(i, n, TREND_W);
            view! { <text class="tick" x=x y={TREND_H + 18.0} text-anchor="middle">{label.clone()}</text> }
        })
        .collect_view();

    let paths = chart
        .series
        .iter()
        .map(|s| match s.kind {
            SeriesKind::Area => view! {
              <path d=s.area_path(TREND_W, TREND_H) fill=s.color fill-opacity="0.15" stroke="none"/>
              <path d=s.svg_path(TREND_W, TREND_H) fill="none" stroke=s.color stroke-width="2"/>
            }
            .into_view(),
            SeriesKind::Line => view! {
              <path d=s.svg_path(TREND_W, TREND_H) fill="none" stroke=s.color stroke-width="1.5"/>
            }
            .into_view(),
        })
        .collect_view();

    let legend = chart
        .series
        .iter()
        .map(|s| {
            view! {
              <span class="legend-item">
                <span class="legend-swatch" style=format!("background:{}", s.color)></span>
                {s.name}
              </span>
            }
        })
        .collect_view();

    view! {
      <svg class="trend-chart" viewBox=format!("{} -10 {} {}", -AXIS_PAD, TREND_W + AXIS_PAD + 10.0, TREND_H + 40.0)>
        {grid}
        {labels}
        {paths}
      </svg>
      <div class="chart-legend">{legend}</div>
    }
    .into_view()
}

#[component]
pub fn FactorBars(summary: DashboardSummary) -> impl IntoView {
    let rows = factor_bars(&summary);
    if rows.iter().all(|r| r.stacks.is_empty()) {
        return view! { <p class="empty-state">"No factor data available."</p> }.into_view();
    }
    let max = rows.iter().map(FactorRow::total).fold(0.0_f64, f64::max).max(1.0);

    rows.into_iter()
        .map(|row| {
            let stacks = row
                .stacks
                .iter()
                .map(|s| {
                    let pct = s.value.max(0.0) / max * 100.0;
                    view! {
                      <div
                        class="factor-stack"
                        title=format!("{}: {:.1}", s.name, s.value)
                        style=format!("width:{pct:.2}%;background:{}", s.color)
                      ></div>
                    }
                })
                .collect_view();
            view! {
              <div class="factor-row">
                <span class="factor-segment">{row.segment}</span>
                <div class="factor-track">{stacks}</div>
                <span class="factor-total">{format!("{:.1}", row.total())}</span>
              </div>
            }
        })
        .collect_view()
}

const RADAR: f64 = 280.0;

#[component]
pub fn Radar(axes: Vec<RadarAxis>) -> impl IntoView {
    if axes.is_empty() {
        return view! { <p class="empty-state">"No factor data available."</p> }.into_view();
    }
    let center = (RADAR / 2.0, RADAR / 2.0);
    let radius = RADAR / 2.0 - 40.0;

    // Full-length spokes, every axis at the maximum.
    let outer: Vec<RadarAxis> = axes
        .iter()
        .map(|a| RadarAxis { value: 1.0, ..a.clone() })
        .collect();
    let rim = radar_polygon(&outer, center, radius);
    let shape = radar_polygon(&axes, center, radius);

    let to_points = |pts: &[(f64, f64)]| {
        pts.iter()
            .map(|(x, y)| format!("{x:.2},{y:.2}"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let spokes = rim
        .iter()
        .zip(axes.iter())
        .map(|((x, y), axis)| {
            let lx = center.0 + (x - center.0) * 1.18;
            let ly = center.1 + (y - center.1) * 1.18;
            view! {
              <line class="grid" x1=center.0 y1=center.1 x2={*x} y2={*y}/>
              <text class="radar-label" x=lx y=ly text-anchor="middle">{axis.factor.clone()}</text>
            }
        })
        .collect_view();

    view! {
      <svg class="radar-chart" viewBox=format!("0 0 {RADAR} {RADAR}")>
        <polygon class="grid" points=to_points(&rim) fill="none"/>
        {spokes}
        <polygon points=to_points(&shape) fill="#8b5cf6" fill-opacity="0.35" stroke="#8b5cf6" stroke-width="2"/>
      </svg>
    }
    .into_view()
}

#[component]
pub fn PriceBars(rows: Vec<PriceRow>) -> impl IntoView {
    let bars = price_bars(&rows);
    let max = bars.iter().map(|b| b.max).fold(0.0_f64, f64::max).max(1.0);
    bars.into_iter()
        .map(|bar| {
            let pct = |v: f64| v.max(0.0) / max * 100.0;
            view! {
              <div class="price-bar">
                <span class="price-commodity">{bar.commodity.clone()}</span>
                <div class="price-track">
                  <div class="price-min" style=format!("width:{:.2}%", pct(bar.min))></div>
                  <div class="price-modal" style=format!("width:{:.2}%", pct(bar.modal))></div>
                  <div class="price-max" style=format!("width:{:.2}%", pct(bar.max))></div>
                </div>
                <span class="price-values">
                  {format!("₹{:.0} / ₹{:.0} / ₹{:.0}", bar.min, bar.modal, bar.max)}
                </span>
              </div>
            }
        })
        .collect_view()
}
