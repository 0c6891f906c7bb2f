use crate::level::{level_from_score, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Geo-located risk marker from `/dashboard/map-data`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct RiskPoint {
    pub lat: f64,
    pub lng: f64,
    pub region: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub segment: String,
    #[serde(default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

level_from_score!(RiskPoint, "risk_score" => "risk_level");

impl RiskPoint {
    pub fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: String,
}

impl Place {
    pub fn position(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportMode {
    #[default]
    Road,
    Rail,
    Air,
    Sea,
    Other(String),
}

impl TransportMode {
    pub fn as_str(&self) -> &str {
        match self {
            TransportMode::Road => "road",
            TransportMode::Rail => "rail",
            TransportMode::Air => "air",
            TransportMode::Sea => "sea",
            TransportMode::Other(s) => s,
        }
    }
}

impl From<String> for TransportMode {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "road" => TransportMode::Road,
            "rail" => TransportMode::Rail,
            "air" => TransportMode::Air,
            "sea" => TransportMode::Sea,
            _ => TransportMode::Other(value),
        }
    }
}

impl From<TransportMode> for String {
    fn from(value: TransportMode) -> Self {
        value.as_str().to_string()
    }
}

/// Trade corridor drawn as a line between two hubs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Corridor {
    pub origin: Place,
    pub destination: Place,
    #[serde(default)]
    pub mode: TransportMode,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub delay: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub points: Vec<RiskPoint>,
    #[serde(default)]
    pub corridors: Vec<Corridor>,
    #[serde(default = "default_center")]
    pub center: LatLng,
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapData {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            corridors: Vec::new(),
            center: default_center(),
            zoom: default_zoom(),
        }
    }
}

fn default_center() -> LatLng {
    LatLng {
        lat: 22.5937,
        lng: 78.9629,
    }
}

fn default_zoom() -> u8 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_payload_decodes_with_defaults() {
        let data: MapData = serde_json::from_value(serde_json::json!({
            "points": [{
                "lat": 19.076, "lng": 72.877, "region": "Mumbai",
                "risk_score": 64.0, "risk_level": "high", "segment": "weather",
                "details": {"condition": "Rain", "temp": 29.5}
            }],
            "corridors": [{
                "origin": {"lat": 19.076, "lng": 72.877, "name": "Mumbai"},
                "destination": {"lat": 28.704, "lng": 77.102, "name": "Delhi"},
                "mode": "rail", "risk_level": "medium", "delay": 3.25
            }]
        }))
        .expect("decode");
        assert_eq!(data.zoom, 5);
        assert_eq!(data.points[0].details.len(), 2);
        assert_eq!(data.corridors[0].mode, TransportMode::Rail);
    }

    #[test]
    fn point_without_level_takes_it_from_the_score() {
        let point: RiskPoint = serde_json::from_value(serde_json::json!({
            "lat": 13.08, "lng": 80.27, "region": "Chennai", "risk_score": 51.0
        }))
        .expect("decode");
        assert_eq!(point.risk_level, RiskLevel::High);
    }

    #[test]
    fn unknown_modes_are_preserved() {
        let mode: TransportMode = serde_json::from_str("\"pipeline\"").unwrap();
        assert_eq!(mode, TransportMode::Other("pipeline".into()));
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"pipeline\"");
    }
}
