//! Category report exporters.
//!
//! Both formats read an already-fetched [`CategoryInsight`]; nothing here
//! touches the network.

pub mod csv;
pub mod document;
pub mod pdf;

use crate::error::{Result, ShieldError};
use chrono::NaiveDate;
use risk_registry::{Category, CategoryInsight};
use std::time::Duration;

pub const PRODUCT_NAME: &str = "SupplyShield";
/// How long the "exporting" state lingers after an export settles.
pub const EXPORT_RESET_DELAY: Duration = Duration::from_millis(1500);

/// `SupplyShield_<Category>_Report_<YYYY-MM-DD>.<ext>`
pub fn report_file_name(category: Category, date: NaiveDate, ext: &str) -> String {
    format!(
        "{PRODUCT_NAME}_{}_Report_{}.{ext}",
        category.as_str(),
        date.format("%Y-%m-%d")
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Pdf => "PDF",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown export format '{other}' (expected csv or pdf)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Build the report file. Failures are logged here and returned.
pub fn export(
    insight: &CategoryInsight,
    format: ExportFormat,
    date: NaiveDate,
) -> Result<ExportArtifact> {
    let outcome = build(insight, format, date);
    match &outcome {
        Ok(artifact) => tracing::info!(
            file = %artifact.file_name,
            bytes = artifact.bytes.len(),
            "report exported"
        ),
        Err(err) => tracing::error!(
            category = %insight.category,
            format = format.label(),
            error = %err,
            "report export failed"
        ),
    }
    outcome
}

fn build(insight: &CategoryInsight, format: ExportFormat, date: NaiveDate) -> Result<ExportArtifact> {
    let category: Category = insight
        .category
        .parse()
        .map_err(|_| ShieldError::InvalidCategory(insight.category.clone()))?;

    let bytes = match format {
        ExportFormat::Csv => csv::render(insight, date)?.into_bytes(),
        ExportFormat::Pdf => pdf::render(&document::layout(insight, date)),
    };

    Ok(ExportArtifact {
        file_name: report_file_name(category, date, format.extension()),
        mime: format.mime(),
        bytes,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportToken(u64);

/// The "exporting…" state behind the export buttons.
#[derive(Clone, Debug, Default)]
pub struct ExportIndicator {
    active: Option<(ExportFormat, u64)>,
    issued: u64,
}

impl ExportIndicator {
    pub fn exporting(&self) -> Option<ExportFormat> {
        self.active.map(|(format, _)| format)
    }

    /// `None` while another export is still showing.
    pub fn start(&mut self, format: ExportFormat) -> Option<ExportToken> {
        if self.active.is_some() {
            return None;
        }
        self.issued += 1;
        self.active = Some((format, self.issued));
        Some(ExportToken(self.issued))
    }

    /// Returns the delay after which [`clear`](Self::clear) should run,
    /// the same for success and failure.
    pub fn settle<T>(&self, token: ExportToken, outcome: &Result<T>) -> Duration {
        if let Err(err) = outcome {
            tracing::error!(token = token.0, error = %err, "export settled with an error");
        }
        EXPORT_RESET_DELAY
    }

    pub fn clear(&mut self, token: ExportToken) -> bool {
        match self.active {
            Some((_, id)) if id == token.0 => {
                self.active = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).expect("date")
    }

    #[test]
    fn file_name_includes_category_and_date() {
        assert_eq!(
            report_file_name(Category::Toys, day(), "pdf"),
            "SupplyShield_Toys_Report_2026-03-09.pdf"
        );
    }

    #[test]
    fn export_rejects_unknown_category() {
        let insight = CategoryInsight {
            category: "Furniture".into(),
            ..Default::default()
        };
        let err = export(&insight, ExportFormat::Csv, day()).expect_err("invalid category");
        assert!(matches!(err, ShieldError::InvalidCategory(_)));
    }

    #[test]
    fn export_builds_both_formats() {
        let insight = CategoryInsight {
            category: "food".into(),
            risk_score: 61.25,
            ..Default::default()
        };
        let csv = export(&insight, ExportFormat::Csv, day()).expect("csv");
        assert_eq!(csv.file_name, "SupplyShield_Food_Report_2026-03-09.csv");
        assert!(csv.mime.starts_with("text/csv"));

        let pdf = export(&insight, ExportFormat::Pdf, day()).expect("pdf");
        assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
    }

    #[test]
    fn indicator_resets_after_fixed_delay_either_way() {
        let mut indicator = ExportIndicator::default();
        let token = indicator.start(ExportFormat::Pdf).expect("start");
        assert!(indicator.start(ExportFormat::Csv).is_none());
        assert_eq!(indicator.exporting(), Some(ExportFormat::Pdf));

        let failed: Result<()> = Err(ShieldError::Export("boom".into()));
        assert_eq!(indicator.settle(token, &failed), EXPORT_RESET_DELAY);
        assert_eq!(indicator.settle(token, &Ok(())), EXPORT_RESET_DELAY);

        assert!(indicator.clear(token));
        assert!(!indicator.clear(token));
        assert_eq!(indicator.exporting(), None);
    }
}
