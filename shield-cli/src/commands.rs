use crate::{Command, PremiumAction, ThemeAction};
use anyhow::Context;
use risk_registry::{
    CategoryInsight, DashboardSummary, FeedResponse, LoginRequest, MapData, RegisterRequest,
    RiskTrend, SegmentKind, SignalFeed, SignalSource, SubscriptionTier, TierChange, UserProfile,
};
use serde::Serialize;
use shield_core::api::{CategoryRequest, FeedRequest, MapRequest, SignalsRequest, SummaryRequest, TrendRequest};
use shield_core::map::MapStats;
use shield_core::{export, AppState, Entitlement, FeedQuery, Theme};
use std::io::{self, Write};
use std::path::Path;

type Render<T> = fn(&mut dyn Write, &T) -> io::Result<()>;

/// Run one subcommand against `app`, writing its result to `out`.
pub async fn execute(
    app: &AppState,
    command: Command,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Dashboard => {
            let summary = app.call(&SummaryRequest).await?;
            emit(out, json, &summary, render_dashboard)
        }
        Command::Trend { days } => {
            let trend = app.call(&TrendRequest::new(days)).await?;
            emit(out, json, &trend, render_trend)
        }
        Command::Signals { source } => {
            let feed = app.call(&SignalsRequest { source }).await?;
            emit(out, json, &feed, render_signals)
        }
        Command::Map => {
            let data = app.call(&MapRequest).await?;
            emit(out, json, &data, render_map)
        }
        Command::Category { category } => {
            let insight = app.call(&CategoryRequest { category }).await?;
            emit(out, json, &insight, render_insight)
        }
        Command::Export {
            category,
            format,
            out: dir,
        } => {
            let insight = app.call(&CategoryRequest { category }).await?;
            let artifact = export(&insight, format, chrono::Local::now().date_naive())?;
            let path = write_artifact(&dir, &artifact.file_name, &artifact.bytes)?;
            writeln!(out, "{}", path.display())?;
            Ok(())
        }
        Command::Data {
            feed,
            commodity,
            state,
            country,
            corridor_id,
            mode,
            limit,
        } => {
            let request = FeedRequest {
                source: feed,
                filter: FeedQuery {
                    commodity,
                    state,
                    country,
                    corridor_id,
                    mode,
                    limit,
                },
            };
            let response = app.call(&request).await?;
            emit(out, json, &response, render_feed)
        }
        Command::Premium { action } => premium(app, action, json, out).await,
        Command::Theme { action } => theme(app, action, out),
        Command::Login { email, password } => {
            let user = app.login(&LoginRequest { email, password }).await?;
            writeln!(out, "Signed in as {}", user.display_name())?;
            Ok(())
        }
        Command::Register {
            email,
            password,
            full_name,
            company,
        } => {
            let payload = RegisterRequest {
                email,
                password,
                full_name,
                company,
            };
            let user = app.register(&payload).await?;
            writeln!(out, "Account created for {}", user.display_name())?;
            Ok(())
        }
        Command::Me => {
            let profile = app.refresh_profile().await?;
            emit(out, json, &profile, render_profile)
        }
        Command::Logout => {
            app.sign_out().await?;
            writeln!(out, "Signed out")?;
            Ok(())
        }
    }
}

async fn premium(
    app: &AppState,
    action: PremiumAction,
    json: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match action {
        PremiumAction::Status => {
            // Re-sync the local flag when the backend can be asked.
            if app.is_signed_in() {
                if let Err(err) = app.refresh_profile().await {
                    tracing::warn!(error = %err, "could not refresh profile");
                }
            }
            let entitlement = app.entitlement();
            if json {
                serde_json::to_writer_pretty(&mut *out, &serde_json::json!({
                    "entitlement": entitlement_name(entitlement),
                    "premium": entitlement.is_premium(),
                }))?;
                writeln!(out)?;
            } else {
                writeln!(out, "{}", entitlement_name(entitlement))?;
            }
            Ok(())
        }
        PremiumAction::Upgrade => {
            if app.entitlement().is_premium() {
                writeln!(out, "Already on the premium plan")?;
                return Ok(());
            }
            let change = app.upgrade_to_premium().await?;
            emit(out, json, &change, render_tier_change)
        }
        PremiumAction::Downgrade => {
            let change = app.downgrade_to_free().await?;
            emit(out, json, &change, render_tier_change)
        }
    }
}

fn theme(app: &AppState, action: ThemeAction, out: &mut dyn Write) -> anyhow::Result<()> {
    let prefs = app.preferences();
    let theme = match action {
        ThemeAction::Show => prefs.theme(false),
        ThemeAction::Dark => {
            prefs.set_theme(Theme::Dark)?;
            Theme::Dark
        }
        ThemeAction::Light => {
            prefs.set_theme(Theme::Light)?;
            Theme::Light
        }
        ThemeAction::Toggle => prefs.toggle_theme(false)?,
    };
    writeln!(out, "{}", theme.as_str())?;
    Ok(())
}

fn entitlement_name(entitlement: Entitlement) -> &'static str {
    match entitlement {
        Entitlement::Anonymous => "anonymous",
        Entitlement::Free => "free",
        Entitlement::Premium => "premium",
    }
}

fn emit<T: Serialize>(
    out: &mut dyn Write,
    json: bool,
    value: &T,
    render: Render<T>,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
    } else {
        render(out, value)?;
    }
    Ok(())
}

pub fn write_artifact(dir: &Path, file_name: &str, bytes: &[u8]) -> anyhow::Result<std::path::PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "report written");
    Ok(path)
}

fn score_line(out: &mut dyn Write, label: &str, score: f64, level: &str) -> io::Result<()> {
    writeln!(out, "  {label:<18} {score:>6.1}  {level}")
}

pub fn render_dashboard(out: &mut dyn Write, summary: &DashboardSummary) -> io::Result<()> {
    writeln!(out, "Supply chain risk ({})", summary.computed_at)?;
    let overall = summary.overall();
    score_line(out, "Overall", overall.score, overall.level.label())?;
    for kind in SegmentKind::ALL {
        if let Some(segment) = summary.segment(kind) {
            let risk = segment.risk();
            score_line(out, kind.label(), risk.score, risk.level.label())?;
        }
    }

    if let Some(signals) = &summary.signals_summary {
        writeln!(out, "\nData sources")?;
        for (name, count) in signals.rows() {
            writeln!(out, "  {name:<18} {count:>6}")?;
        }
        writeln!(out, "  {:<18} {:>6}", "Total", signals.total)?;
    }

    writeln!(out, "\nBottlenecks")?;
    if summary.bottlenecks.is_empty() {
        writeln!(out, "  none detected")?;
    }
    for b in &summary.bottlenecks {
        writeln!(out, "  {:<18} {}", b.region, b.summary())?;
    }

    writeln!(out, "\nRecommendations")?;
    if summary.recommendations.is_empty() {
        writeln!(out, "  none at this time")?;
    }
    for r in &summary.recommendations {
        writeln!(out, "  P{} {} [{}]", r.priority, r.title, r.action_label())?;
    }
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into())
}

pub fn render_trend(out: &mut dyn Write, trend: &RiskTrend) -> io::Result<()> {
    writeln!(
        out,
        "{:<12} {:>8} {:>12} {:>10} {:>14}",
        "date", "overall", "procurement", "transport", "import_export"
    )?;
    for p in &trend.trend {
        writeln!(
            out,
            "{:<12} {:>8} {:>12} {:>10} {:>14}",
            p.date,
            cell(p.overall),
            cell(p.procurement),
            cell(p.transport),
            cell(p.import_export)
        )?;
    }
    Ok(())
}

pub fn render_signals(out: &mut dyn Write, feed: &SignalFeed) -> io::Result<()> {
    for source in SignalSource::ALL {
        match feed.count(source) {
            Some(count) => writeln!(out, "{:<14} {count:>5} records", source.label())?,
            None if matches!(source, SignalSource::Trade | SignalSource::Logistics) => {
                writeln!(out, "{:<14} premium only", source.label())?
            }
            None => {}
        }
    }

    for row in feed.mandi.iter().chain(feed.enam.iter()).flatten() {
        writeln!(
            out,
            "  {:<14} {:<16} {:>9.0} ({})",
            row.commodity, row.market, row.modal_price, row.state
        )?;
    }
    for w in feed.weather.iter().flatten() {
        let flag = if w.is_disruptive { "disruptive" } else { "" };
        writeln!(
            out,
            "  {:<14} {:<16} severity {:.2} {flag}",
            w.city, w.weather_main, w.disruption_severity
        )?;
    }
    for t in feed.trade.iter().flatten() {
        writeln!(
            out,
            "  {:<14} {:<10} {:<8} {:+.1}%",
            t.commodity, t.country, t.trade_type, t.change_pct
        )?;
    }
    for l in feed.logistics.iter().flatten() {
        writeln!(
            out,
            "  {:<24} {:>5.1}h delay  {}",
            l.corridor_name, l.current_delay_hours, l.status
        )?;
    }
    Ok(())
}

pub fn render_map(out: &mut dyn Write, data: &MapData) -> io::Result<()> {
    let stats = MapStats::of(data);
    writeln!(
        out,
        "{} risk points, {} corridors, {} high risk zones",
        stats.points, stats.corridors, stats.high_risk_zones
    )?;
    for p in &data.points {
        writeln!(
            out,
            "  {:<18} {:<14} {:>5.1}  {}",
            p.region,
            p.segment,
            p.risk_score,
            p.risk_level.label()
        )?;
    }
    for c in &data.corridors {
        let delay = c.delay.map(|d| format!("{d:.1}h")).unwrap_or_else(|| "-".into());
        writeln!(
            out,
            "  {} -> {} ({}) {} delay {delay}",
            c.origin.name,
            c.destination.name,
            c.mode.as_str(),
            c.risk_level.label()
        )?;
    }
    Ok(())
}

pub fn render_insight(out: &mut dyn Write, insight: &CategoryInsight) -> io::Result<()> {
    writeln!(
        out,
        "{}: {:.1} ({})",
        insight.category,
        insight.risk_score,
        insight.risk_level.label()
    )?;
    if !insight.commodities_tracked.is_empty() {
        writeln!(out, "Tracked: {}", insight.commodities_tracked.join(", "))?;
    }
    if !insight.contributing_factors.is_empty() {
        writeln!(out, "\nFactors")?;
        for (name, factor) in &insight.contributing_factors {
            writeln!(out, "  {name:<24} {:>6.1}", factor.contribution)?;
        }
    }
    if !insight.bottlenecks.is_empty() {
        writeln!(out, "\nBottlenecks")?;
        for b in &insight.bottlenecks {
            writeln!(out, "  {:<18} {}", b.region, b.summary())?;
        }
    }
    if !insight.recommendations.is_empty() {
        writeln!(out, "\nRecommendations")?;
        for r in &insight.recommendations {
            writeln!(out, "  P{} {}", r.priority, r.title)?;
        }
    }
    Ok(())
}

pub fn render_feed(out: &mut dyn Write, response: &FeedResponse) -> io::Result<()> {
    writeln!(out, "{}: {} records", response.source, response.count)?;
    for record in &response.data {
        writeln!(out, "  {record}")?;
    }
    Ok(())
}

pub fn render_profile(out: &mut dyn Write, profile: &UserProfile) -> io::Result<()> {
    writeln!(out, "{} <{}>", profile.display_name(), profile.email)?;
    if let Some(company) = &profile.company {
        writeln!(out, "Company: {company}")?;
    }
    let plan = match profile.subscription_tier {
        SubscriptionTier::Free => "free",
        SubscriptionTier::Paid => "premium",
    };
    writeln!(out, "Plan: {plan}")
}

fn render_tier_change(out: &mut dyn Write, change: &TierChange) -> io::Result<()> {
    writeln!(out, "{}", change.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_registry::Category;
    use shield_core::{AnonymousSession, ApiClient, MemoryStore, ShieldConfig, ShieldError};
    use std::rc::Rc;

    fn anonymous_app() -> AppState {
        let client = ApiClient::new(&ShieldConfig::default()).unwrap();
        AppState::new(client, Rc::new(AnonymousSession), Rc::new(MemoryStore::new()))
    }

    fn text(render: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf as &mut dyn Write).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn dashboard_lists_segments_and_empty_sections() {
        let summary: DashboardSummary = serde_json::from_value(serde_json::json!({
            "overall_score": 58.4,
            "overall_risk_level": "high",
            "segments": {
                "procurement": {"score": 71.0, "risk_level": "high"},
                "transport": {"score": 22.5, "risk_level": "low"}
            },
            "computed_at": "2026-10-17T08:00:00"
        }))
        .unwrap();

        let out = text(|w| render_dashboard(w, &summary));
        assert!(out.contains("Overall"));
        assert!(out.contains("58.4"));
        assert!(out.contains("Procurement"));
        assert!(!out.contains("Import / Export"));
        assert!(out.contains("none detected"));
        assert!(out.contains("none at this time"));
    }

    #[test]
    fn free_signal_feed_marks_premium_sources() {
        let feed: SignalFeed = serde_json::from_value(serde_json::json!({
            "mandi": [{"commodity": "Wheat", "market": "Azadpur", "modal_price": 2200.0, "state": "Delhi"}],
            "weather": []
        }))
        .unwrap();

        let out = text(|w| render_signals(w, &feed));
        assert!(out.contains("Mandi Prices"));
        assert!(out.contains("Wheat"));
        assert!(out.contains("Trade Data     premium only"));
        assert!(!out.contains("eNAM Markets"));
    }

    #[test]
    fn missing_trend_values_render_as_dash() {
        let trend: RiskTrend = serde_json::from_value(serde_json::json!({
            "trend": [{"date": "2026-10-16", "overall": 40.0}],
            "days": 1
        }))
        .unwrap();
        let out = text(|w| render_trend(w, &trend));
        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("2026-10-16"));
        assert!(row.contains("40.0"));
        assert!(row.trim_end().ends_with('-'));
    }

    #[tokio::test]
    async fn theme_commands_persist_choice() {
        let app = anonymous_app();
        let mut out = Vec::new();
        execute(&app, Command::Theme { action: ThemeAction::Show }, false, &mut out)
            .await
            .unwrap();
        execute(&app, Command::Theme { action: ThemeAction::Toggle }, false, &mut out)
            .await
            .unwrap();
        execute(&app, Command::Theme { action: ThemeAction::Show }, false, &mut out)
            .await
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "dark\nlight\nlight\n");
    }

    #[tokio::test]
    async fn anonymous_premium_status_needs_no_backend() {
        let app = anonymous_app();
        let mut out = Vec::new();
        execute(&app, Command::Premium { action: PremiumAction::Status }, true, &mut out)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["entitlement"], "anonymous");
        assert_eq!(value["premium"], false);
    }

    #[tokio::test]
    async fn category_is_withheld_before_any_request() {
        let app = anonymous_app();
        let mut out = Vec::new();
        let err = execute(
            &app,
            Command::Category {
                category: Category::Toys,
            },
            false,
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ShieldError>(),
            Some(ShieldError::AccessDenied(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn artifact_lands_in_a_created_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("reports");
        let path = write_artifact(&target, "food_risk_report_2026-10-17.csv", b"a,b\n").unwrap();
        assert_eq!(path, target.join("food_risk_report_2026-10-17.csv"));
        assert_eq!(std::fs::read(&path).unwrap(), b"a,b\n");
    }
}
