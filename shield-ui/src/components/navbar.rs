use crate::app::{use_ui, Route};
use leptos::*;
use shield_core::Theme;

#[component]
pub fn Navbar() -> impl IntoView {
    let ui = use_ui();

    let links = Route::NAV
        .into_iter()
        .map(|route| {
            view! {
              <button
                class="nav-link"
                class:active=move || ui.route.get() == route
                on:click=move |_| ui.route.set(route)
              >
                {route.label()}
              </button>
            }
        })
        .collect_view();

    let theme_icon = move || match ui.theme.get() {
        Theme::Dark => "☀️",
        Theme::Light => "🌙",
    };

    let account = move || {
        let _ = ui.entitlement.get();
        match ui.app().current_user() {
            Some(user) => view! {
              <span class="nav-user">{user.display_name().to_string()}</span>
              <button class="nav-link" on:click=move |_| ui.sign_out()>"Sign Out"</button>
            }
            .into_view(),
            None => view! {
              <button class="nav-link" on:click=move |_| ui.sign_in()>"Sign In"</button>
            }
            .into_view(),
        }
    };

    view! {
      <nav class="navbar">
        <div class="nav-brand" on:click=move |_| ui.route.set(Route::Dashboard)>
          <span class="brand-icon">"🛡️"</span>
          <span class="brand-name">"SupplyShield"</span>
        </div>
        <div class="nav-links">{links}</div>
        <div class="nav-actions">
          <button class="theme-toggle" title="Toggle theme" on:click=move |_| ui.toggle_theme()>
            {theme_icon}
          </button>
          <Show
            when=move || ui.entitlement.get().is_premium()
            fallback=move || view! {
              <button class="upgrade-btn" on:click=move |_| ui.route.set(Route::Pricing)>"Upgrade"</button>
            }
          >
            <span class="premium-badge">"⭐ Premium"</span>
          </Show>
          {account}
        </div>
      </nav>
    }
}
