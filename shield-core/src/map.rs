//! Lifecycle and styling for the supply map.
//!
//! The map widget itself is imperative (Leaflet in the browser). A
//! [`MapAdapter`] owns one instance through a [`MapSurface`] and keeps its
//! layers in step with the latest [`MapData`]: the instance is created once
//! on mount, each `apply` adds, replaces or removes only the layers that
//! changed, and `unmount` tears everything down.

use crate::error::Result;
use risk_registry::{Corridor, LatLng, MapData, RiskLevel, RiskPoint, TransportMode};
use std::collections::BTreeMap;

pub const MARKER_MIN_RADIUS: f64 = 8.0;
pub const MARKER_MAX_RADIUS: f64 = 20.0;
pub const HIGH_RISK_THRESHOLD: f64 = 50.0;
pub const LEGEND_TITLE: &str = "Risk Level";
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str = "© OpenStreetMap";
pub const TILE_MAX_ZOOM: u8 = 18;

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn for_point(point: &RiskPoint) -> Self {
        let radius = if point.risk_score.is_finite() {
            (point.risk_score / 5.0).clamp(MARKER_MIN_RADIUS, MARKER_MAX_RADIUS)
        } else {
            MARKER_MIN_RADIUS
        };
        Self {
            radius,
            color: point.risk_level.color(),
            weight: 2.0,
            opacity: 0.8,
            fill_opacity: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
    pub dash_array: Option<&'static str>,
}

impl LineStyle {
    pub fn for_corridor(corridor: &Corridor) -> Self {
        let dash_array = match corridor.mode {
            TransportMode::Air => Some("8, 8"),
            TransportMode::Sea => Some("12, 6"),
            _ => None,
        };
        Self {
            color: corridor.risk_level.color(),
            weight: 3.0,
            opacity: 0.6,
            dash_array,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Popup {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl Popup {
    pub fn for_point(point: &RiskPoint) -> Self {
        let mut rows = vec![
            ("Risk Score".to_string(), format!("{}%", point.risk_score)),
            ("Segment".to_string(), capitalize(&point.segment)),
        ];
        rows.extend(
            point
                .details
                .iter()
                .map(|(key, value)| (capitalize(&key.replace('_', " ")), detail_text(value))),
        );
        Self {
            title: point.region.clone(),
            rows,
        }
    }

    pub fn for_corridor(corridor: &Corridor) -> Self {
        let delay = corridor
            .delay
            .filter(|d| d.is_finite())
            .map(|d| format!("{d:.1}h"))
            .unwrap_or_else(|| "n/a".to_string());
        Self {
            title: format!("{} → {}", corridor.origin.name, corridor.destination.name),
            rows: vec![
                ("Mode".to_string(), corridor.mode.as_str().to_string()),
                ("Delay".to_string(), delay),
            ],
        }
    }

    /// Compact one-line form, e.g. `Mode: sea • Delay: 6.5h`.
    pub fn summary(&self) -> String {
        self.rows
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(" • ")
    }

    /// Popup markup with every text value escaped.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"map-popup\"><h4>{}</h4>",
            escape_html(&self.title)
        );
        for (key, value) in &self.rows {
            html.push_str(&format!(
                "<div class=\"map-popup-row\"><span>{}</span><span>{}</span></div>",
                escape_html(key),
                escape_html(value)
            ));
        }
        html.push_str("</div>");
        html
    }
}

fn detail_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendEntry {
    pub level: RiskLevel,
    pub label: &'static str,
    pub color: &'static str,
}

pub fn legend() -> [LegendEntry; 4] {
    RiskLevel::ALL.map(|level| LegendEntry {
        level,
        label: level.legend_text(),
        color: level.color(),
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapStats {
    pub points: usize,
    pub corridors: usize,
    pub high_risk_zones: usize,
}

impl MapStats {
    pub fn of(data: &MapData) -> Self {
        Self {
            points: data.points.len(),
            corridors: data.corridors.len(),
            high_risk_zones: data
                .points
                .iter()
                .filter(|p| p.risk_score > HIGH_RISK_THRESHOLD)
                .count(),
        }
    }
}

/// The imperative map widget.
pub trait MapSurface {
    type Layer;

    fn create(&mut self, center: LatLng, zoom: u8) -> Result<()>;

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle, popup: &Popup) -> Result<Self::Layer>;

    fn add_line(
        &mut self,
        from: LatLng,
        to: LatLng,
        style: &LineStyle,
        popup: &Popup,
    ) -> Result<Self::Layer>;

    fn remove_layer(&mut self, layer: Self::Layer);

    fn set_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()>;

    fn destroy(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LayerKey {
    Point(String),
    Line(String),
}

#[derive(Clone, Debug, PartialEq)]
enum LayerSpec {
    Marker {
        at: LatLng,
        style: MarkerStyle,
        popup: Popup,
    },
    Line {
        from: LatLng,
        to: LatLng,
        style: LineStyle,
        popup: Popup,
    },
}

struct Placed<L> {
    spec: LayerSpec,
    handle: L,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub added: usize,
    pub removed: usize,
    pub kept: usize,
}

pub struct MapAdapter<S: MapSurface> {
    surface: S,
    mounted: bool,
    layers: BTreeMap<LayerKey, Placed<S::Layer>>,
}

impl<S: MapSurface> MapAdapter<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            mounted: false,
            layers: BTreeMap::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Create the instance and legend. Later calls do nothing.
    pub fn mount(&mut self, center: LatLng, zoom: u8) -> Result<()> {
        if self.mounted {
            return Ok(());
        }
        self.surface.create(center, zoom)?;
        self.mounted = true;
        self.surface.set_legend(LEGEND_TITLE, &legend())?;
        Ok(())
    }

    /// Bring the layers in line with `data`, mounting first if needed.
    pub fn apply(&mut self, data: &MapData) -> Result<ApplyReport> {
        self.mount(data.center, data.zoom)?;

        let desired = desired_layers(data);
        let mut report = ApplyReport::default();

        let stale: Vec<LayerKey> = self
            .layers
            .iter()
            .filter(|(key, placed)| desired.get(*key) != Some(&placed.spec))
            .map(|(key, _)| key.clone())
            .collect();
        for key in stale {
            if let Some(placed) = self.layers.remove(&key) {
                self.surface.remove_layer(placed.handle);
                report.removed += 1;
            }
        }

        for (key, spec) in desired {
            if self.layers.contains_key(&key) {
                report.kept += 1;
                continue;
            }
            let handle = match &spec {
                LayerSpec::Marker { at, style, popup } => {
                    self.surface.add_marker(*at, style, popup)?
                }
                LayerSpec::Line {
                    from,
                    to,
                    style,
                    popup,
                } => self.surface.add_line(*from, *to, style, popup)?,
            };
            self.layers.insert(key, Placed { spec, handle });
            report.added += 1;
        }

        tracing::debug!(
            added = report.added,
            removed = report.removed,
            kept = report.kept,
            "map layers applied"
        );
        Ok(report)
    }

    pub fn marker_count(&self) -> usize {
        self.layers
            .keys()
            .filter(|k| matches!(k, LayerKey::Point(_)))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.layers
            .keys()
            .filter(|k| matches!(k, LayerKey::Line(_)))
            .count()
    }

    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        let layers = std::mem::take(&mut self.layers);
        for (_, placed) in layers {
            self.surface.remove_layer(placed.handle);
        }
        self.surface.destroy();
        self.mounted = false;
    }
}

impl<S: MapSurface> Drop for MapAdapter<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Keys are stable across payloads; repeats of the same key get a suffix so
/// every point and corridor maps to exactly one layer.
fn desired_layers(data: &MapData) -> BTreeMap<LayerKey, LayerSpec> {
    let mut out = BTreeMap::new();
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut unique = |base: String| {
        let n = seen.entry(base.clone()).or_insert(0);
        *n += 1;
        if *n == 1 {
            base
        } else {
            format!("{base}#{n}")
        }
    };

    for point in &data.points {
        let key = unique(format!("point|{}|{}", point.region, point.segment));
        out.insert(
            LayerKey::Point(key),
            LayerSpec::Marker {
                at: point.position(),
                style: MarkerStyle::for_point(point),
                popup: Popup::for_point(point),
            },
        );
    }
    for corridor in &data.corridors {
        let key = unique(format!(
            "line|{}|{}|{}",
            corridor.origin.name,
            corridor.destination.name,
            corridor.mode.as_str()
        ));
        out.insert(
            LayerKey::Line(key),
            LayerSpec::Line {
                from: corridor.origin.position(),
                to: corridor.destination.position(),
                style: LineStyle::for_corridor(corridor),
                popup: Popup::for_corridor(corridor),
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_registry::Place;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Log {
        creates: usize,
        destroys: usize,
        legends: usize,
        live: BTreeMap<u32, &'static str>,
        next: u32,
    }

    #[derive(Clone, Default)]
    struct FakeSurface(Rc<RefCell<Log>>);

    impl MapSurface for FakeSurface {
        type Layer = u32;

        fn create(&mut self, _center: LatLng, _zoom: u8) -> Result<()> {
            self.0.borrow_mut().creates += 1;
            Ok(())
        }

        fn add_marker(&mut self, _at: LatLng, _style: &MarkerStyle, _popup: &Popup) -> Result<u32> {
            let mut log = self.0.borrow_mut();
            log.next += 1;
            let id = log.next;
            log.live.insert(id, "marker");
            Ok(id)
        }

        fn add_line(
            &mut self,
            _from: LatLng,
            _to: LatLng,
            _style: &LineStyle,
            _popup: &Popup,
        ) -> Result<u32> {
            let mut log = self.0.borrow_mut();
            log.next += 1;
            let id = log.next;
            log.live.insert(id, "line");
            Ok(id)
        }

        fn remove_layer(&mut self, layer: u32) {
            self.0.borrow_mut().live.remove(&layer);
        }

        fn set_legend(&mut self, _title: &str, _entries: &[LegendEntry]) -> Result<()> {
            self.0.borrow_mut().legends += 1;
            Ok(())
        }

        fn destroy(&mut self) {
            self.0.borrow_mut().destroys += 1;
        }
    }

    fn point(region: &str, score: f64) -> RiskPoint {
        RiskPoint {
            lat: 19.0,
            lng: 72.8,
            region: region.into(),
            risk_score: score,
            risk_level: RiskLevel::from_score(score),
            segment: "weather".into(),
            ..Default::default()
        }
    }

    fn corridor(mode: &str) -> Corridor {
        Corridor {
            origin: Place {
                lat: 19.076,
                lng: 72.877,
                name: "Mumbai".into(),
            },
            destination: Place {
                lat: 28.704,
                lng: 77.102,
                name: "Delhi".into(),
            },
            mode: TransportMode::from(mode.to_string()),
            risk_level: RiskLevel::High,
            delay: Some(6.54),
        }
    }

    fn live(log: &Rc<RefCell<Log>>, kind: &str) -> usize {
        log.borrow().live.values().filter(|k| **k == kind).count()
    }

    #[test]
    fn layers_match_payload_and_reapply_is_idempotent() {
        let surface = FakeSurface::default();
        let log = surface.0.clone();
        let mut adapter = MapAdapter::new(surface);

        let data = MapData {
            points: vec![point("Chennai", 60.0), point("Chennai", 60.0), point("Pune", 10.0)],
            corridors: vec![corridor("road"), corridor("sea")],
            ..Default::default()
        };
        let report = adapter.apply(&data).expect("apply");
        assert_eq!(report.added, 5);
        assert_eq!(live(&log, "marker"), 3);
        assert_eq!(live(&log, "line"), 2);

        let again = adapter.apply(&data).expect("reapply");
        assert_eq!(again, ApplyReport { added: 0, removed: 0, kept: 5 });
        assert_eq!(log.borrow().creates, 1);
        assert_eq!(log.borrow().legends, 1);
    }

    #[test]
    fn changed_and_vanished_layers_are_replaced() {
        let surface = FakeSurface::default();
        let log = surface.0.clone();
        let mut adapter = MapAdapter::new(surface);

        adapter
            .apply(&MapData {
                points: vec![point("Chennai", 60.0), point("Pune", 10.0)],
                corridors: vec![corridor("air")],
                ..Default::default()
            })
            .expect("first");

        let report = adapter
            .apply(&MapData {
                points: vec![point("Chennai", 80.0)],
                ..Default::default()
            })
            .expect("second");
        assert_eq!(report.removed, 3);
        assert_eq!(report.added, 1);
        assert_eq!(adapter.marker_count(), 1);
        assert_eq!(adapter.line_count(), 0);
        assert_eq!(log.borrow().live.len(), 1);
    }

    #[test]
    fn unmount_tears_down_once() {
        let surface = FakeSurface::default();
        let log = surface.0.clone();
        {
            let mut adapter = MapAdapter::new(surface);
            adapter
                .apply(&MapData {
                    points: vec![point("Delhi", 30.0)],
                    ..Default::default()
                })
                .expect("apply");
            adapter.unmount();
            assert!(!adapter.is_mounted());
        }
        assert_eq!(log.borrow().destroys, 1);
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn marker_radius_is_clamped() {
        assert_eq!(MarkerStyle::for_point(&point("a", 10.0)).radius, 8.0);
        assert_eq!(MarkerStyle::for_point(&point("a", 60.0)).radius, 12.0);
        assert_eq!(MarkerStyle::for_point(&point("a", 300.0)).radius, 20.0);
    }

    #[test]
    fn corridor_dash_and_popup() {
        assert_eq!(LineStyle::for_corridor(&corridor("air")).dash_array, Some("8, 8"));
        assert_eq!(LineStyle::for_corridor(&corridor("sea")).dash_array, Some("12, 6"));
        assert_eq!(LineStyle::for_corridor(&corridor("rail")).dash_array, None);

        let popup = Popup::for_corridor(&corridor("sea"));
        assert_eq!(popup.title, "Mumbai → Delhi");
        assert_eq!(popup.summary(), "Mode: sea • Delay: 6.5h");
    }

    #[test]
    fn point_popup_lists_details_and_escapes() {
        let mut p = point("<Kochi>", 42.0);
        p.details.insert("delay_hours".into(), serde_json::json!(4.5));
        p.details.insert("condition".into(), serde_json::json!("Rain"));
        let popup = Popup::for_point(&p);
        assert_eq!(popup.rows[0], ("Risk Score".into(), "42%".into()));
        assert_eq!(popup.rows[2], ("Condition".into(), "Rain".into()));
        assert_eq!(popup.rows[3], ("Delay hours".into(), "4.5".into()));
        assert!(popup.to_html().contains("&lt;Kochi&gt;"));
    }

    #[test]
    fn stats_count_high_risk_zones() {
        let data = MapData {
            points: vec![point("a", 50.0), point("b", 50.5), point("c", 90.0)],
            corridors: vec![corridor("road")],
            ..Default::default()
        };
        assert_eq!(
            MapStats::of(&data),
            MapStats {
                points: 3,
                corridors: 1,
                high_risk_zones: 2
            }
        );
        assert_eq!(legend()[1].label, "Medium (25-50)");
    }
}
