//! [`MapSurface`] over the page's Leaflet global (`window.L`).

use js_sys::{Array, Function, Reflect};
use risk_registry::LatLng;
use serde::Serialize;
use shield_core::error::{Result, ShieldError};
use shield_core::map::{
    LegendEntry, LineStyle, MapSurface, MarkerStyle, Popup, TILE_ATTRIBUTION, TILE_MAX_ZOOM,
    TILE_URL,
};
use wasm_bindgen::{JsCast, JsValue};

fn js_err(e: JsValue) -> ShieldError {
    ShieldError::Map(format!("{e:?}"))
}

fn leaflet() -> Result<JsValue> {
    let window = web_sys::window().ok_or_else(|| ShieldError::Map("window not available".into()))?;
    let l = Reflect::get(&window, &JsValue::from_str("L")).map_err(js_err)?;
    if l.is_undefined() || l.is_null() {
        return Err(ShieldError::Map("Leaflet is not loaded".into()));
    }
    Ok(l)
}

fn invoke(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue> {
    let f: Function = Reflect::get(target, &JsValue::from_str(method))
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| ShieldError::Map(format!("{method} is not a function")))?;
    let list = Array::new();
    for arg in args {
        list.push(arg);
    }
    Reflect::apply(&f, target, &list).map_err(js_err)
}

fn options<T: Serialize>(value: &T) -> Result<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| ShieldError::Map(e.to_string()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions {
    center: [f64; 2],
    zoom: u8,
    zoom_control: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TileOptions {
    attribution: &'static str,
    max_zoom: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    color: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill_color: Option<&'static str>,
    weight: f64,
    opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    fill_opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dash_array: Option<&'static str>,
}

fn point(at: LatLng) -> JsValue {
    let pair = Array::new();
    pair.push(&JsValue::from_f64(at.lat));
    pair.push(&JsValue::from_f64(at.lng));
    pair.into()
}

pub struct LeafletSurface {
    container: web_sys::HtmlElement,
    map: Option<JsValue>,
    legend: Option<web_sys::Element>,
}

impl LeafletSurface {
    pub fn new(container: web_sys::HtmlElement) -> Self {
        Self {
            container,
            map: None,
            legend: None,
        }
    }

    fn map(&self) -> Result<&JsValue> {
        self.map
            .as_ref()
            .ok_or_else(|| ShieldError::Map("map not created".into()))
    }

    fn place(&self, layer: JsValue, popup: &Popup) -> Result<JsValue> {
        let layer = invoke(&layer, "bindPopup", &[JsValue::from_str(&popup.to_html())])?;
        invoke(&layer, "addTo", &[self.map()?.clone()])
    }
}

impl MapSurface for LeafletSurface {
    type Layer = JsValue;

    fn create(&mut self, center: LatLng, zoom: u8) -> Result<()> {
        let l = leaflet()?;
        let map = invoke(
            &l,
            "map",
            &[
                JsValue::from(self.container.clone()),
                options(&MapOptions {
                    center: [center.lat, center.lng],
                    zoom,
                    zoom_control: true,
                })?,
            ],
        )?;
        let tiles = invoke(
            &l,
            "tileLayer",
            &[
                JsValue::from_str(TILE_URL),
                options(&TileOptions {
                    attribution: TILE_ATTRIBUTION,
                    max_zoom: TILE_MAX_ZOOM,
                })?,
            ],
        )?;
        invoke(&tiles, "addTo", &[map.clone()])?;
        self.map = Some(map);
        Ok(())
    }

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle, popup: &Popup) -> Result<JsValue> {
        let marker = invoke(
            &leaflet()?,
            "circleMarker",
            &[
                point(at),
                options(&PathOptions {
                    radius: Some(style.radius),
                    color: style.color,
                    fill_color: Some(style.color),
                    weight: style.weight,
                    opacity: style.opacity,
                    fill_opacity: Some(style.fill_opacity),
                    dash_array: None,
                })?,
            ],
        )?;
        self.place(marker, popup)
    }

    fn add_line(
        &mut self,
        from: LatLng,
        to: LatLng,
        style: &LineStyle,
        popup: &Popup,
    ) -> Result<JsValue> {
        let path = Array::new();
        path.push(&point(from));
        path.push(&point(to));
        let opts = PathOptions {
            radius: None,
            color: style.color,
            fill_color: None,
            weight: style.weight,
            opacity: style.opacity,
            fill_opacity: None,
            dash_array: style.dash_array,
        };
        let line = invoke(&leaflet()?, "polyline", &[path.into(), options(&opts)?])?;
        self.place(line, popup)
    }

    fn remove_layer(&mut self, layer: JsValue) {
        if let Some(map) = &self.map {
            if let Err(err) = invoke(map, "removeLayer", &[layer]) {
                tracing::warn!(error = %err, "failed to remove map layer");
            }
        }
    }

    fn set_legend(&mut self, title: &str, entries: &[LegendEntry]) -> Result<()> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| ShieldError::Map("document not available".into()))?;
        let legend = document.create_element("div").map_err(js_err)?;
        legend.set_class_name("map-legend");
        let rows: String = entries
            .iter()
            .map(|e| {
                format!(
                    r#"<div class="map-legend-item"><span class="map-legend-dot" style="background:{}"></span>{}</div>"#,
                    e.color, e.label
                )
            })
            .collect();
        legend.set_inner_html(&format!(
            r#"<div class="map-legend-title">{}</div>{rows}"#,
            shield_core::map::escape_html(title)
        ));
        self.container.append_child(&legend).map_err(js_err)?;
        if let Some(old) = self.legend.replace(legend) {
            old.remove();
        }
        Ok(())
    }

    fn destroy(&mut self) {
        if let Some(legend) = self.legend.take() {
            legend.remove();
        }
        if let Some(map) = self.map.take() {
            if let Err(err) = invoke(&map, "remove", &[]) {
                tracing::warn!(error = %err, "failed to destroy map");
            }
        }
    }
}
