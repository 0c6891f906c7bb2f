//! Sectioned CSV report. Each section is a title line, a column header, then
//! rows; sections are separated by a blank line.

use crate::error::{Result, ShieldError};
use chrono::NaiveDate;
use risk_registry::{CategoryInsight, RiskLevel};

pub const RISK_SUMMARY: &str = "RISK SUMMARY";
pub const TRACKED_COMMODITIES: &str = "TRACKED COMMODITIES";
pub const CONTRIBUTING_FACTORS: &str = "CONTRIBUTING FACTORS";
pub const PRICE_DATA: &str = "PRICE DATA";
pub const BOTTLENECKS: &str = "BOTTLENECKS";
pub const RECOMMENDATIONS: &str = "RECOMMENDATIONS";

pub const SECTIONS: [&str; 6] = [
    RISK_SUMMARY,
    TRACKED_COMMODITIES,
    CONTRIBUTING_FACTORS,
    PRICE_DATA,
    BOTTLENECKS,
    RECOMMENDATIONS,
];

type Writer = ::csv::Writer<Vec<u8>>;

pub fn render(insight: &CategoryInsight, date: NaiveDate) -> Result<String> {
    let sections = [
        section(RISK_SUMMARY, &["Field", "Value"], |w| {
            w.write_record(["Category", insight.category.as_str()])?;
            let score = format!("{:.1}", finite(insight.risk_score));
            w.write_record(["Risk Score", score.as_str()])?;
            w.write_record(["Risk Level", insight.risk_level.label()])?;
            w.write_record(["Computed At", insight.computed_at.as_str()])?;
            let report_date = date.format("%Y-%m-%d").to_string();
            w.write_record(["Report Date", report_date.as_str()])?;
            Ok(())
        })?,
        section(TRACKED_COMMODITIES, &["Commodity"], |w| {
            for commodity in &insight.commodities_tracked {
                w.write_record([commodity.as_str()])?;
            }
            Ok(())
        })?,
        section(
            CONTRIBUTING_FACTORS,
            &["Factor", "Value", "Weight", "Contribution"],
            |w| {
                for (name, factor) in &insight.contributing_factors {
                    w.write_record([
                        name.clone(),
                        number(factor.value),
                        number(factor.weight),
                        number(factor.contribution),
                    ])?;
                }
                Ok(())
            },
        )?,
        section(
            PRICE_DATA,
            &[
                "Commodity",
                "Variety",
                "Market",
                "District",
                "State",
                "Min Price",
                "Max Price",
                "Modal Price",
                "Date",
            ],
            |w| {
                for row in &insight.price_data {
                    w.write_record([
                        row.commodity.clone(),
                        row.variety.clone(),
                        row.market.clone(),
                        row.district.clone(),
                        row.state.clone(),
                        number(row.min_price),
                        number(row.max_price),
                        number(row.modal_price),
                        row.arrival_date.clone(),
                    ])?;
                }
                Ok(())
            },
        )?,
        section(
            BOTTLENECKS,
            &["Region", "Combined Risk", "Risk Level", "Signals", "Explanations"],
            |w| {
                for b in &insight.bottlenecks {
                    w.write_record([
                        b.region.clone(),
                        format!("{:.1}", finite(b.combined_risk)),
                        b.risk_level.label().to_string(),
                        b.signal_count.to_string(),
                        b.explanations.join("; "),
                    ])?;
                }
                Ok(())
            },
        )?,
        section(
            RECOMMENDATIONS,
            &[
                "Priority",
                "Title",
                "Description",
                "Action",
                "Segment",
                "Estimated Impact",
            ],
            |w| {
                for r in &insight.recommendations {
                    w.write_record([
                        r.priority.to_string(),
                        r.title.clone(),
                        r.description.clone(),
                        r.action_label(),
                        r.segment.clone(),
                        r.estimated_impact.map(number).unwrap_or_default(),
                    ])?;
                }
                Ok(())
            },
        )?,
    ];

    Ok(sections.join("\n"))
}

/// One section: title line, column header, then whatever `rows` writes.
fn section(
    title: &str,
    header: &[&str],
    rows: impl FnOnce(&mut Writer) -> Result<()>,
) -> Result<String> {
    let mut w = ::csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    w.write_record([title])?;
    w.write_record(header)?;
    rows(&mut w)?;

    let bytes = w
        .into_inner()
        .map_err(|e| ShieldError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ShieldError::Export(e.to_string()))
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn number(v: f64) -> String {
    finite(v).to_string()
}

/// The fields of the RISK SUMMARY section, read back from a rendered report.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    pub category: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub computed_at: String,
}

pub fn read_summary(text: &str) -> Result<SummaryRecord> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut in_summary = false;
    let mut category = None;
    let mut score = None;
    let mut level = None;
    let mut computed_at = String::new();

    for record in reader.records() {
        let record = record?;
        let first = record.get(0).unwrap_or_default();
        if record.len() == 1 && SECTIONS.contains(&first) {
            if in_summary {
                break;
            }
            in_summary = first == RISK_SUMMARY;
            continue;
        }
        if !in_summary {
            continue;
        }
        if record.len() == 1 && first.is_empty() {
            break;
        }

        let value = record.get(1).unwrap_or_default();
        match first {
            "Category" => category = Some(value.to_string()),
            "Risk Score" => {
                score = Some(value.parse::<f64>().map_err(|_| {
                    ShieldError::Export(format!("risk score '{value}' is not a number"))
                })?)
            }
            "Risk Level" => level = Some(RiskLevel::parse_lenient(value)),
            "Computed At" => computed_at = value.to_string(),
            _ => {}
        }
    }

    match (category, score, level) {
        (Some(category), Some(risk_score), Some(risk_level)) => Ok(SummaryRecord {
            category,
            risk_score,
            risk_level,
            computed_at,
        }),
        _ => Err(ShieldError::Export(
            "report has no complete RISK SUMMARY section".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_registry::{Bottleneck, FactorContribution, PriceRow, Recommendation};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 2).expect("date")
    }

    fn insight() -> CategoryInsight {
        let mut insight = CategoryInsight {
            category: "Clothing".into(),
            risk_score: 67.349,
            risk_level: RiskLevel::High,
            commodities_tracked: vec!["Cotton".into(), "Jute".into()],
            computed_at: "2026-05-02T06:30:00".into(),
            ..Default::default()
        };
        insight.contributing_factors.insert(
            "price_volatility".into(),
            FactorContribution {
                value: 0.62,
                weight: 0.3,
                contribution: 18.6,
                ml_importance: None,
            },
        );
        insight.price_data.push(PriceRow {
            commodity: "Cotton".into(),
            market: "Rajkot, APMC".into(),
            state: "Gujarat".into(),
            min_price: 6100.0,
            max_price: 7200.0,
            modal_price: 6650.0,
            ..Default::default()
        });
        insight.bottlenecks.push(Bottleneck {
            region: "Mumbai Port".into(),
            combined_risk: 71.0,
            risk_level: RiskLevel::High,
            explanations: vec!["Congestion \"severe\"".into()],
            signal_count: 3,
            ..Default::default()
        });
        insight.recommendations.push(Recommendation {
            priority: 1,
            title: "Diversify suppliers".into(),
            action_type: "diversify_sourcing".into(),
            segment: "procurement".into(),
            ..Default::default()
        });
        insight
    }

    #[test]
    fn summary_round_trips() {
        let text = render(&insight(), day()).expect("render");
        let summary = read_summary(&text).expect("summary");
        assert_eq!(summary.category, "Clothing");
        assert_eq!(summary.risk_score, 67.3);
        assert_eq!(summary.risk_level, RiskLevel::High);
        assert_eq!(summary.computed_at, "2026-05-02T06:30:00");
    }

    #[test]
    fn sections_appear_in_order_with_blank_separators() {
        let text = render(&insight(), day()).expect("render");
        let positions: Vec<usize> = SECTIONS
            .iter()
            .map(|s| text.find(&format!("{s}\n")).expect("section present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("Report Date,2026-05-02\n\nTRACKED COMMODITIES\nCommodity\n"));
        assert!(text.contains("Jute\n\nCONTRIBUTING FACTORS\n"));
        assert!(text.contains("\n\nRECOMMENDATIONS\n"));
    }

    #[test]
    fn delimiters_and_quotes_are_escaped() {
        let text = render(&insight(), day()).expect("render");
        assert!(text.contains("\"Rajkot, APMC\""));
        assert!(text.contains("\"Congestion \"\"severe\"\"\""));
        assert!(text.contains("diversify sourcing"));
    }

    #[test]
    fn empty_insight_renders_every_section() {
        let empty = CategoryInsight {
            category: "Toys".into(),
            risk_score: f64::NAN,
            ..Default::default()
        };
        let text = render(&empty, day()).expect("render");
        for section in SECTIONS {
            assert!(text.contains(section));
        }
        let summary = read_summary(&text).expect("summary");
        assert_eq!(summary.risk_score, 0.0);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn missing_summary_is_an_error() {
        assert!(read_summary("PRICE DATA\nCommodity\n").is_err());
    }
}
