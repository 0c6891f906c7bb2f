use crate::insight::PriceRow;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSource {
    Mandi,
    Enam,
    Weather,
    Trade,
    Logistics,
}

impl SignalSource {
    pub const ALL: [SignalSource; 5] = [
        SignalSource::Mandi,
        SignalSource::Enam,
        SignalSource::Weather,
        SignalSource::Trade,
        SignalSource::Logistics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Mandi => "mandi",
            SignalSource::Enam => "enam",
            SignalSource::Weather => "weather",
            SignalSource::Trade => "trade",
            SignalSource::Logistics => "logistics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalSource::Mandi => "Mandi Prices",
            SignalSource::Enam => "eNAM Markets",
            SignalSource::Weather => "Weather",
            SignalSource::Trade => "Trade Data",
            SignalSource::Logistics => "Logistics",
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mandi" => Ok(SignalSource::Mandi),
            "enam" => Ok(SignalSource::Enam),
            "weather" => Ok(SignalSource::Weather),
            "trade" => Ok(SignalSource::Trade),
            "logistics" => Ok(SignalSource::Logistics),
            other => Err(format!("unknown signal source '{other}'")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSignal {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub weather_main: String,
    #[serde(default)]
    pub weather_description: String,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub disruption_severity: f64,
    #[serde(default)]
    pub is_disruptive: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSignal {
    #[serde(default)]
    pub commodity: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub trade_type: String,
    #[serde(default)]
    pub quantity_mt: f64,
    #[serde(default)]
    pub value_inr_cr: f64,
    #[serde(default)]
    pub change_pct: f64,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub year_month: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogisticsSignal {
    #[serde(default)]
    pub corridor_id: String,
    #[serde(default)]
    pub corridor_name: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub current_delay_hours: f64,
    #[serde(default)]
    pub congestion_level: f64,
    #[serde(default)]
    pub status: String,
}

impl LogisticsSignal {
    pub fn is_congested(&self) -> bool {
        self.status == "congested"
    }
}

/// Payload of `/dashboard/signals`. Sources the caller is not entitled to are absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalFeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandi: Option<Vec<PriceRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enam: Option<Vec<PriceRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Vec<WeatherSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade: Option<Vec<TradeSignal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<Vec<LogisticsSignal>>,
}

impl SignalFeed {
    pub fn sources(&self) -> Vec<SignalSource> {
        SignalSource::ALL
            .into_iter()
            .filter(|s| self.count(*s).is_some())
            .collect()
    }

    pub fn count(&self, source: SignalSource) -> Option<usize> {
        match source {
            SignalSource::Mandi => self.mandi.as_ref().map(Vec::len),
            SignalSource::Enam => self.enam.as_ref().map(Vec::len),
            SignalSource::Weather => self.weather.as_ref().map(Vec::len),
            SignalSource::Trade => self.trade.as_ref().map(Vec::len),
            SignalSource::Logistics => self.logistics.as_ref().map(Vec::len),
        }
    }

    /// Trade/logistics are only returned to premium callers.
    pub fn has_premium_sources(&self) -> bool {
        self.trade.is_some() || self.logistics.is_some()
    }
}

/// Payload of the raw `/data/{feed}` endpoints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}
