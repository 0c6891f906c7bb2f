use leptos::*;
use risk_registry::RiskLevel;

#[component]
pub fn RiskBadge(level: RiskLevel) -> impl IntoView {
    view! { <span class=format!("risk-badge {}", level.badge_class())>{level.label()}</span> }
}
