//! Chart data shaping. Everything here is pure; the UI only turns the
//! returned geometry into SVG elements.

use risk_registry::{
    CategoryInsight, DashboardSummary, PriceRow, RiskLevel, SegmentKind, TrendPoint,
};
use std::f64::consts::PI;

pub const Y_DOMAIN: (f64, f64) = (0.0, 100.0);
pub const Y_TICKS: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 100.0];
pub const MAX_PRICE_BARS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeriesKind {
    Area,
    Line,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub kind: SeriesKind,
    /// One slot per x position; `None` is a gap.
    pub values: Vec<Option<f64>>,
}

impl Series {
    /// Contiguous runs of present values as `(index, value)` pairs.
    pub fn segments(&self) -> Vec<Vec<(usize, f64)>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for (i, value) in self.values.iter().enumerate() {
            match value {
                Some(v) if v.is_finite() => current.push((i, *v)),
                _ => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    /// `M`/`L` path per run, Y on the fixed 0..100 domain.
    pub fn svg_path(&self, width: f64, height: f64) -> String {
        let n = self.values.len();
        self.segments()
            .iter()
            .map(|run| {
                run.iter()
                    .enumerate()
                    .map(|(j, (i, v))| {
                        let cmd = if j == 0 { 'M' } else { 'L' };
                        format!("{cmd}{:.2},{:.2}", x_at(*i, n, width), y_at(*v, height))
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Closed fill under each run, down to the baseline.
    pub fn area_path(&self, width: f64, height: f64) -> String {
        let n = self.values.len();
        self.segments()
            .iter()
            .filter_map(|run| {
                let (first, _) = run.first()?;
                let (last, _) = run.last()?;
                let line = run
                    .iter()
                    .map(|(i, v)| format!("L{:.2},{:.2}", x_at(*i, n, width), y_at(*v, height)))
                    .collect::<Vec<_>>()
                    .join(" ");
                Some(format!(
                    "M{:.2},{:.2} {line} L{:.2},{:.2} Z",
                    x_at(*first, n, width),
                    height,
                    x_at(*last, n, width),
                    height
                ))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn x_at(index: usize, count: usize, width: f64) -> f64 {
    if count <= 1 {
        width / 2.0
    } else {
        index as f64 * width / (count - 1) as f64
    }
}

pub fn y_at(value: f64, height: f64) -> f64 {
    let (lo, hi) = Y_DOMAIN;
    let v = value.clamp(lo, hi);
    height - (v - lo) / (hi - lo) * height
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrendChart {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
}

impl TrendChart {
    pub fn from_points(points: &[TrendPoint]) -> Self {
        let labels = points.iter().map(|p| p.date.clone()).collect();
        let mut series = vec![Series {
            key: "overall",
            name: "Overall",
            color: "#3b82f6",
            kind: SeriesKind::Area,
            values: points.iter().map(|p| p.overall).collect(),
        }];
        for (kind, name, color) in [
            (SegmentKind::Procurement, "Procurement", "#10b981"),
            (SegmentKind::Transport, "Transport", "#8b5cf6"),
            (SegmentKind::ImportExport, "Import/Export", "#06b6d4"),
        ] {
            series.push(Series {
                key: kind.key(),
                name,
                color,
                kind: SeriesKind::Line,
                values: points.iter().map(|p| p.segment(kind)).collect(),
            });
        }
        Self { labels, series }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Factors stacked in the explainability chart, in drawing order.
pub const FACTOR_KEYS: [(&str, &str, &str); 6] = [
    ("price_volatility", "Price Volatility", "#f43f5e"),
    ("weather_severity", "Weather", "#06b6d4"),
    ("logistics_delay", "Logistics Delay", "#8b5cf6"),
    ("supply_demand_ratio", "Supply/Demand", "#10b981"),
    ("congestion_level", "Congestion", "#f97316"),
    ("trade_volume_change", "Trade Volume", "#3b82f6"),
];

#[derive(Clone, Debug, PartialEq)]
pub struct FactorStack {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FactorRow {
    pub segment: &'static str,
    pub stacks: Vec<FactorStack>,
}

impl FactorRow {
    pub fn total(&self) -> f64 {
        self.stacks.iter().map(|s| s.value).sum()
    }
}

/// One row per segment present in the summary; absent factors are skipped.
pub fn factor_bars(summary: &DashboardSummary) -> Vec<FactorRow> {
    SegmentKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let segment = summary.segment(kind)?;
            let stacks = FACTOR_KEYS
                .into_iter()
                .filter_map(|(key, name, color)| {
                    let factor = segment.contributing_factors.get(key)?;
                    Some(FactorStack {
                        key,
                        name,
                        color,
                        value: finite_or_zero(factor.contribution),
                    })
                })
                .collect();
            Some(FactorRow {
                segment: kind.label(),
                stacks,
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct RadarAxis {
    pub factor: String,
    pub value: f64,
    /// Weight as a percentage.
    pub weight: f64,
}

pub fn radar_points(insight: &CategoryInsight) -> Vec<RadarAxis> {
    insight
        .contributing_factors
        .iter()
        .map(|(key, factor)| RadarAxis {
            factor: key.replace('_', " "),
            value: finite_or_zero(factor.contribution),
            weight: finite_or_zero(factor.weight) * 100.0,
        })
        .collect()
}

/// Polygon vertices for the radar, first axis pointing up, clockwise.
pub fn radar_polygon(axes: &[RadarAxis], center: (f64, f64), radius: f64) -> Vec<(f64, f64)> {
    let max = axes
        .iter()
        .map(|a| a.value)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let n = axes.len().max(1) as f64;
    axes.iter()
        .enumerate()
        .map(|(i, axis)| {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / n;
            let r = radius * (axis.value.max(0.0) / max);
            (center.0 + r * angle.cos(), center.1 + r * angle.sin())
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceBar {
    pub commodity: String,
    pub min: f64,
    pub modal: f64,
    pub max: f64,
}

pub fn price_bars(rows: &[PriceRow]) -> Vec<PriceBar> {
    rows.iter()
        .take(MAX_PRICE_BARS)
        .map(|row| PriceBar {
            commodity: row.commodity.clone(),
            min: row.min_price,
            modal: row.modal_price,
            max: row.max_price,
        })
        .collect()
}

/// Circular score gauge geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeGeometry {
    pub size: f64,
    pub radius: f64,
    pub circumference: f64,
    pub dash_offset: f64,
    pub color: &'static str,
    pub css_class: &'static str,
    /// Score as shown in the middle of the ring.
    pub display: i64,
}

impl GaugeGeometry {
    pub const DEFAULT_SIZE: f64 = 160.0;

    pub fn new(score: f64, size: f64) -> Self {
        let level = RiskLevel::from_score(score);
        let radius = (size - 20.0) / 2.0;
        let circumference = 2.0 * PI * radius;
        let arc = if score.is_finite() { score.clamp(0.0, 100.0) } else { 0.0 };
        let progress = arc / 100.0 * circumference;
        Self {
            size,
            radius,
            circumference,
            dash_offset: circumference - progress,
            color: level.color(),
            css_class: level.css_class(),
            display: if score.is_finite() { score.round() as i64 } else { 0 },
        }
    }

    pub fn center(&self) -> f64 {
        self.size / 2.0
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_registry::{FactorContribution, SegmentRisk};

    fn point(date: &str, overall: f64, transport: Option<f64>) -> TrendPoint {
        TrendPoint {
            date: date.into(),
            overall: Some(overall),
            procurement: Some(40.0),
            transport,
            import_export: Some(20.0),
        }
    }

    #[test]
    fn missing_segment_value_becomes_gap() {
        let chart = TrendChart::from_points(&[
            point("2026-03-01", 50.0, Some(30.0)),
            point("2026-03-02", 55.0, None),
            point("2026-03-03", 60.0, Some(35.0)),
        ]);
        assert_eq!(chart.series.len(), 4);
        assert_eq!(chart.series[0].kind, SeriesKind::Area);

        let transport = &chart.series[2];
        assert_eq!(transport.key, "transport");
        assert_eq!(transport.values, vec![Some(30.0), None, Some(35.0)]);
        assert_eq!(transport.segments().len(), 2);
        assert_eq!(transport.svg_path(100.0, 100.0), "M0.00,70.00 M100.00,65.00");
    }

    #[test]
    fn path_uses_fixed_domain() {
        let series = Series {
            key: "overall",
            name: "Overall",
            color: "#3b82f6",
            kind: SeriesKind::Area,
            values: vec![Some(0.0), Some(100.0), Some(140.0)],
        };
        assert_eq!(
            series.svg_path(200.0, 50.0),
            "M0.00,50.00 L100.00,0.00 L200.00,0.00"
        );
        assert!(series.area_path(200.0, 50.0).ends_with('Z'));
    }

    #[test]
    fn factor_bars_follow_segment_order() {
        let mut factors = std::collections::BTreeMap::new();
        factors.insert(
            "logistics_delay".to_string(),
            FactorContribution {
                contribution: 12.5,
                ..Default::default()
            },
        );
        factors.insert(
            "unknown".to_string(),
            FactorContribution {
                contribution: 99.0,
                ..Default::default()
            },
        );
        let mut summary = DashboardSummary::default();
        summary.segments.insert(
            SegmentKind::Transport,
            SegmentRisk {
                score: 40.0,
                contributing_factors: factors,
                ..Default::default()
            },
        );
        summary
            .segments
            .insert(SegmentKind::Procurement, SegmentRisk::default());

        let rows = factor_bars(&summary);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].segment, "Procurement");
        assert_eq!(rows[1].stacks.len(), 1);
        assert_eq!(rows[1].total(), 12.5);
    }

    #[test]
    fn radar_axes_replace_underscores() {
        let mut insight = CategoryInsight::default();
        insight.contributing_factors.insert(
            "supply_demand_ratio".into(),
            FactorContribution {
                contribution: 8.0,
                weight: 0.25,
                ..Default::default()
            },
        );
        let axes = radar_points(&insight);
        assert_eq!(axes[0].factor, "supply demand ratio");
        assert_eq!(axes[0].weight, 25.0);

        let polygon = radar_polygon(&axes, (50.0, 50.0), 40.0);
        assert!((polygon[0].0 - 50.0).abs() < 1e-9);
        assert!((polygon[0].1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn price_bars_cap_at_eight() {
        let rows = vec![PriceRow::default(); 12];
        assert_eq!(price_bars(&rows).len(), MAX_PRICE_BARS);
    }

    #[test]
    fn gauge_clamps_arc_but_not_label() {
        let g = GaugeGeometry::new(120.0, GaugeGeometry::DEFAULT_SIZE);
        assert_eq!(g.radius, 70.0);
        assert!(g.dash_offset.abs() < 1e-9);
        assert_eq!(g.color, "#f43f5e");
        assert_eq!(g.display, 120);

        let g = GaugeGeometry::new(-5.0, 100.0);
        assert!((g.dash_offset - g.circumference).abs() < 1e-9);
        assert_eq!(g.css_class, "risk-low");
    }
}
