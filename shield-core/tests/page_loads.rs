mod support;

use chrono::NaiveDate;
use risk_registry::{Category, RiskLevel};
use shield_core::pages::{CategoriesPage, DashboardPage, Phase, DASHBOARD_ERROR};
use shield_core::report::{self, csv::read_summary, ExportFormat};
use shield_core::store::PREMIUM_KEY;
use shield_core::{AnonymousSession, ApiClient, AppState, MemoryStore, StaticSession};
use std::rc::Rc;
use support::{FakeBackend, PREMIUM_TOKEN};

#[tokio::test]
async fn dashboard_loads_summary_with_two_week_trend() {
    let backend = FakeBackend::start().await;
    let app = backend.app(Rc::new(AnonymousSession), Rc::new(MemoryStore::new()));
    let mut page = DashboardPage::default();

    assert!(page.load(&app).await);
    let view = page.view.value().expect("loaded");
    assert_eq!(view.summary.overall_risk_level, RiskLevel::Medium);
    assert_eq!(view.trend.len(), 14);

    let trend = backend
        .requests()
        .into_iter()
        .find(|s| s.path == "/api/dashboard/risk-trend")
        .expect("trend requested");
    assert_eq!(trend.query.as_deref(), Some("days=14"));
    assert_eq!(backend.count("/api/dashboard/summary"), 1);
    assert!(DashboardPage::shows_upgrade_banner(app.entitlement()));
}

#[tokio::test]
async fn dashboard_failure_shows_fixed_message_and_retries() {
    let backend = FakeBackend::start().await;
    let broken = backend
        .config()
        .with_api_base(&format!("{}/missing", backend.base))
        .expect("base");
    let app = AppState::new(
        ApiClient::new(&broken).expect("client"),
        Rc::new(AnonymousSession),
        Rc::new(MemoryStore::new()),
    );
    let mut page = DashboardPage::default();

    assert!(page.load(&app).await);
    assert_eq!(page.view.phase(), &Phase::Failed(DASHBOARD_ERROR.to_string()));

    // Retry goes through Loading again and fails the same way.
    assert!(page.load(&app).await);
    assert_eq!(page.view.error(), Some(DASHBOARD_ERROR));
}

#[tokio::test]
async fn fetched_insight_exports_to_csv_and_pdf() {
    let backend = FakeBackend::start().await;
    let store = MemoryStore::with(&[(PREMIUM_KEY, "true")]);
    let app = backend.app(Rc::new(StaticSession::new(PREMIUM_TOKEN)), Rc::new(store));
    let mut page = CategoriesPage::default();
    page.select(Category::Clothing, &app).await;
    let insight = page.insight.value().expect("insight loaded");

    let day = NaiveDate::from_ymd_opt(2026, 6, 1).expect("date");
    let csv = report::export(insight, ExportFormat::Csv, day).expect("csv");
    assert_eq!(csv.file_name, "SupplyShield_Clothing_Report_2026-06-01.csv");
    let text = String::from_utf8(csv.bytes).expect("utf8");
    let summary = read_summary(&text).expect("summary section");
    assert_eq!(summary.category, "Clothing");
    assert_eq!(summary.risk_score, 63.0);
    assert_eq!(summary.risk_level, RiskLevel::High);

    let pdf = report::export(insight, ExportFormat::Pdf, day).expect("pdf");
    assert_eq!(pdf.mime, "application/pdf");
    assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
}
