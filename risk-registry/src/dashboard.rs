use crate::insight::{Bottleneck, Recommendation, SegmentKind, SegmentRisk};
use crate::level::{level_from_score, RiskLevel, RiskScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalsSummary {
    #[serde(default)]
    pub mandi_records: u32,
    #[serde(default)]
    pub enam_records: u32,
    #[serde(default)]
    pub trade_records: u32,
    #[serde(default)]
    pub weather_records: u32,
    #[serde(default)]
    pub logistics_records: u32,
    #[serde(default)]
    pub total: u32,
}

impl SignalsSummary {
    /// (label, count) rows in the order the data-source panel lists them.
    pub fn rows(&self) -> [(&'static str, u32); 5] {
        [
            ("Mandi Prices", self.mandi_records),
            ("eNAM Markets", self.enam_records),
            ("Weather Signals", self.weather_records),
            ("Trade Data", self.trade_records),
            ("Logistics", self.logistics_records),
        ]
    }
}

/// Payload of `/dashboard/summary`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct DashboardSummary {
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub overall_risk_level: RiskLevel,
    #[serde(default)]
    pub segments: BTreeMap<SegmentKind, SegmentRisk>,
    #[serde(default)]
    pub signals_summary: Option<SignalsSummary>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub bottlenecks: Vec<Bottleneck>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub categories_available: Vec<String>,
    #[serde(default)]
    pub computed_at: String,
}

level_from_score!(DashboardSummary, "overall_score" => "overall_risk_level");

impl DashboardSummary {
    pub fn overall(&self) -> RiskScore {
        RiskScore {
            score: self.overall_score,
            level: self.overall_risk_level,
        }
    }

    pub fn segment(&self, kind: SegmentKind) -> Option<&SegmentRisk> {
        self.segments.get(&kind)
    }
}

/// One day of the risk trend. Segment keys may be absent for a day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    #[serde(default)]
    pub overall: Option<f64>,
    #[serde(default)]
    pub procurement: Option<f64>,
    #[serde(default)]
    pub transport: Option<f64>,
    #[serde(default)]
    pub import_export: Option<f64>,
}

impl TrendPoint {
    pub fn segment(&self, kind: SegmentKind) -> Option<f64> {
        match kind {
            SegmentKind::Procurement => self.procurement,
            SegmentKind::Transport => self.transport,
            SegmentKind::ImportExport => self.import_export,
        }
    }
}

/// Payload of `/dashboard/risk-trend`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskTrend {
    #[serde(default)]
    pub trend: Vec<TrendPoint>,
    #[serde(default)]
    pub days: u32,
}
