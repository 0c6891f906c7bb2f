use crate::level::{level_from_score, RiskLevel, RiskScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Clothing,
    Stationery,
    Toys,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Clothing,
        Category::Stationery,
        Category::Toys,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Clothing => "Clothing",
            Category::Stationery => "Stationery",
            Category::Toys => "Toys",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Food => "Agricultural commodities, grains, perishables",
            Category::Clothing => "Textiles, cotton, fabrics, garments",
            Category::Stationery => "Paper products, office supplies",
            Category::Toys => "Toys, games, plastic products",
        }
    }

    pub fn accent(&self) -> &'static str {
        match self {
            Category::Food => "#10b981",
            Category::Clothing => "#3b82f6",
            Category::Stationery => "#8b5cf6",
            Category::Toys => "#f59e0b",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "clothing" => Ok(Category::Clothing),
            "stationery" => Ok(Category::Stationery),
            "toys" => Ok(Category::Toys),
            other => Err(format!(
                "invalid category '{other}'; choose from Food, Clothing, Stationery, Toys"
            )),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Procurement,
    Transport,
    ImportExport,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 3] = [
        SegmentKind::Procurement,
        SegmentKind::Transport,
        SegmentKind::ImportExport,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SegmentKind::Procurement => "procurement",
            SegmentKind::Transport => "transport",
            SegmentKind::ImportExport => "import_export",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SegmentKind::Procurement => "Procurement",
            SegmentKind::Transport => "Transport",
            SegmentKind::ImportExport => "Import / Export",
        }
    }
}

/// One explainability entry: how much a single feature pushed the score.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub contribution: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml_importance: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct SegmentRisk {
    pub score: f64,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub contributing_factors: BTreeMap<String, FactorContribution>,
    #[serde(default)]
    pub feature_weights: BTreeMap<String, f64>,
}

level_from_score!(SegmentRisk, "score" => "risk_level");

impl SegmentRisk {
    pub fn risk(&self) -> RiskScore {
        RiskScore {
            score: self.score,
            level: self.risk_level,
        }
    }
}

/// A mandi or eNAM price record. eNAM names its market `apmc`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub district: String,
    #[serde(default, alias = "apmc")]
    pub market: String,
    #[serde(default)]
    pub commodity: String,
    #[serde(default)]
    pub variety: String,
    #[serde(default)]
    pub min_price: f64,
    #[serde(default)]
    pub max_price: f64,
    #[serde(default)]
    pub modal_price: f64,
    #[serde(default, alias = "trade_date")]
    pub arrival_date: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct Bottleneck {
    pub region: String,
    #[serde(default)]
    pub combined_risk: f64,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub factors: BTreeMap<String, f64>,
    #[serde(default)]
    pub explanations: Vec<String>,
    #[serde(default)]
    pub signal_count: u32,
}

level_from_score!(Bottleneck, "combined_risk" => "risk_level");

impl Bottleneck {
    /// Explanations joined for a one-line summary, or the signal count when none were given.
    pub fn summary(&self) -> String {
        if self.explanations.is_empty() {
            format!("{} signals detected", self.signal_count)
        } else {
            self.explanations.join(" • ")
        }
    }

    pub fn is_severe(&self) -> bool {
        self.combined_risk > 50.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub priority: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub segment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_impact: Option<f64>,
}

impl Recommendation {
    /// `increase_inventory` -> `increase inventory`.
    pub fn action_label(&self) -> String {
        self.action_type.replace('_', " ")
    }
}

/// Per-category drill-down payload from `/dashboard/category/{category}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct CategoryInsight {
    pub category: String,
    #[serde(default)]
    pub risk_score: f64,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub contributing_factors: BTreeMap<String, FactorContribution>,
    #[serde(default)]
    pub feature_weights: BTreeMap<String, f64>,
    #[serde(default)]
    pub commodities_tracked: Vec<String>,
    #[serde(default)]
    pub price_data: Vec<PriceRow>,
    #[serde(default)]
    pub bottlenecks: Vec<Bottleneck>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub supply_network: serde_json::Value,
    #[serde(default)]
    pub computed_at: String,
}

level_from_score!(CategoryInsight, "risk_score" => "risk_level");

impl CategoryInsight {
    pub fn risk(&self) -> RiskScore {
        RiskScore {
            score: self.risk_score,
            level: self.risk_level,
        }
    }
}
