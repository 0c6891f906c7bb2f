use serde::{Deserialize, Serialize};

/// Discrete risk tier derived from a 0-100 score.
/// Ordered by increasing severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

pub const CRITICAL_THRESHOLD: f64 = 75.0;
pub const HIGH_THRESHOLD: f64 = 50.0;
pub const MEDIUM_THRESHOLD: f64 = 25.0;

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Map a score onto its tier using the fixed 25/50/75 breakpoints.
    ///
    /// Total over `f64`: anything above 100 is still critical, anything
    /// below zero (and NaN) is low.
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Unknown tier names fall back to `Low`, matching how the badge renders them.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "critical" => RiskLevel::Critical,
            "high" => RiskLevel::High,
            "medium" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#f97316",
            RiskLevel::Critical => "#f43f5e",
        }
    }

    /// Color as 0-255 RGB, for renderers that do not take hex strings.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            RiskLevel::Low => (16, 185, 129),
            RiskLevel::Medium => (245, 158, 11),
            RiskLevel::High => (249, 115, 22),
            RiskLevel::Critical => (244, 63, 94),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "risk-low",
            RiskLevel::Medium => "risk-medium",
            RiskLevel::High => "risk-high",
            RiskLevel::Critical => "risk-critical",
        }
    }

    pub fn badge_class(&self) -> &'static str {
        match self {
            RiskLevel::Low => "risk-badge-low",
            RiskLevel::Medium => "risk-badge-medium",
            RiskLevel::High => "risk-badge-high",
            RiskLevel::Critical => "risk-badge-critical",
        }
    }

    /// Legend range text, e.g. `Medium (25-50)`.
    pub fn legend_text(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low (0-25)",
            RiskLevel::Medium => "Medium (25-50)",
            RiskLevel::High => "High (50-75)",
            RiskLevel::Critical => "Critical (75+)",
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        RiskLevel::parse_lenient(&value)
    }
}

impl From<RiskLevel> for String {
    fn from(value: RiskLevel) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Fill `level_key` from `score_key` when a payload leaves the tier out, so
/// the decoded level always agrees with the score.
pub fn fill_missing_level(value: &mut serde_json::Value, score_key: &str, level_key: &str) {
    let Some(fields) = value.as_object_mut() else {
        return;
    };
    if fields.get(level_key).is_some_and(|level| !level.is_null()) {
        return;
    }
    let score = fields
        .get(score_key)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0);
    fields.insert(
        level_key.to_string(),
        serde_json::Value::String(RiskLevel::from_score(score).as_str().to_string()),
    );
}

/// Serde impls for a `#[serde(remote = "Self")]` payload whose tier field
/// may be omitted by the backend.
macro_rules! level_from_score {
    ($ty:ty, $score:literal => $level:literal) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                <$ty>::serialize(self, serializer)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let mut value = <serde_json::Value as serde::Deserialize>::deserialize(deserializer)?;
                $crate::level::fill_missing_level(&mut value, $score, $level);
                <$ty>::deserialize(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use level_from_score;

/// A score together with the tier it maps to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub score: f64,
    pub level: RiskLevel,
}

impl RiskScore {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            level: RiskLevel::from_score(score),
        }
    }

    /// Score pinned into 0..=100, for gauges and bars.
    pub fn clamped(&self) -> f64 {
        if self.score.is_nan() {
            0.0
        } else {
            self.score.clamp(0.0, 100.0)
        }
    }
}
