//! Canonical payloads exchanged with the SupplyShield backend, plus the
//! score-to-tier mapping every view shares.

pub mod auth;
pub mod dashboard;
pub mod geo;
pub mod insight;
pub mod level;
pub mod signals;

pub use auth::{
    LoginRequest, RegisterRequest, SubscriptionTier, TierChange, TokenResponse, UserProfile,
};
pub use dashboard::{DashboardSummary, RiskTrend, SignalsSummary, TrendPoint};
pub use geo::{Corridor, LatLng, MapData, Place, RiskPoint, TransportMode};
pub use insight::{
    Bottleneck, Category, CategoryInsight, FactorContribution, PriceRow, Recommendation,
    SegmentKind, SegmentRisk,
};
pub use level::{RiskLevel, RiskScore};
pub use signals::{
    FeedResponse, LogisticsSignal, SignalFeed, SignalSource, TradeSignal, WeatherSignal,
};

pub fn validate_insight(insight: &CategoryInsight) -> Result<(), String> {
    insight.category.parse::<Category>()?;
    if !insight.risk_score.is_finite() {
        return Err(format!("risk_score must be finite, got {}", insight.risk_score));
    }
    for rec in &insight.recommendations {
        if rec.title.trim().is_empty() {
            return Err("recommendation title is required".into());
        }
    }
    for b in &insight.bottlenecks {
        if b.region.trim().is_empty() {
            return Err("bottleneck region is required".into());
        }
    }
    Ok(())
}

pub fn validate_summary(summary: &DashboardSummary) -> Result<(), String> {
    if !summary.overall_score.is_finite() {
        return Err(format!(
            "overall_score must be finite, got {}",
            summary.overall_score
        ));
    }
    for (kind, segment) in &summary.segments {
        if !segment.score.is_finite() {
            return Err(format!("segment '{}' has a non-finite score", kind.key()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insight() -> CategoryInsight {
        CategoryInsight {
            category: "Food".into(),
            risk_score: 58.3,
            risk_level: RiskLevel::High,
            ..Default::default()
        }
    }

    #[test]
    fn validates_category_insight() {
        assert!(validate_insight(&insight()).is_ok());
    }

    #[test]
    fn rejects_unknown_category() {
        let mut bad = insight();
        bad.category = "Furniture".into();
        let err = validate_insight(&bad).expect_err("unknown category");
        assert!(err.contains("Furniture") || err.contains("furniture"));
    }

    #[test]
    fn rejects_nan_summary_score() {
        let summary = DashboardSummary {
            overall_score: f64::NAN,
            ..Default::default()
        };
        assert!(validate_summary(&summary).is_err());
    }
}
