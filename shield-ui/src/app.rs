use crate::bridge;
use crate::components::navbar::Navbar;
use crate::pages::{
    categories::Categories, dashboard::Dashboard, pricing::Pricing, signals::Signals,
    supply_map::SupplyMap,
};
use crate::pages::sign_in::SignIn;
use leptos::*;
use shield_core::{AppState, Entitlement, Theme};
use wasm_bindgen_futures::spawn_local;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    SupplyMap,
    Signals,
    Categories,
    Pricing,
    SignIn,
}

impl Route {
    pub const NAV: [Route; 4] = [
        Route::Dashboard,
        Route::SupplyMap,
        Route::Signals,
        Route::Categories,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::SupplyMap => "Supply Map",
            Route::Signals => "Live Signals",
            Route::Categories => "Categories",
            Route::Pricing => "Pricing",
            Route::SignIn => "Sign In",
        }
    }
}

/// Reactive view of the parts of [`AppState`] the chrome renders.
#[derive(Clone, Copy)]
pub struct Ui {
    pub route: RwSignal<Route>,
    pub theme: RwSignal<Theme>,
    pub entitlement: RwSignal<Entitlement>,
    app: StoredValue<AppState>,
}

impl Ui {
    pub fn app(&self) -> AppState {
        self.app.get_value()
    }

    /// Re-read the entitlement after anything that may have changed it.
    pub fn refresh(&self) {
        self.entitlement
            .set(self.app.with_value(|app| app.entitlement()));
    }

    pub fn toggle_theme(&self) {
        let next = self
            .app
            .with_value(|app| app.preferences().toggle_theme(bridge::prefers_light()));
        match next {
            Ok(theme) => self.theme.set(theme),
            Err(err) => tracing::warn!(error = %err, "failed to save theme"),
        }
    }

    /// Hosted modal when available, otherwise the built-in form.
    pub fn sign_in(&self) {
        if !crate::session::open_hosted_sign_in() {
            self.route.set(Route::SignIn);
        }
    }

    pub fn sign_out(&self) {
        let ui = *self;
        spawn_local(async move {
            if let Err(err) = ui.app().sign_out().await {
                tracing::warn!(error = %err, "sign out failed");
            }
            ui.refresh();
            ui.route.set(Route::Dashboard);
        });
    }
}

pub fn use_ui() -> Ui {
    expect_context::<Ui>()
}

#[component]
pub fn App() -> impl IntoView {
    match bridge::build_state() {
        Ok(state) => view! { <Shell state=state/> }.into_view(),
        Err(err) => {
            tracing::error!(error = %err, "failed to start");
            view! {
              <div class="loading-container">
                <div class="error-message">{err.to_string()}</div>
              </div>
            }
            .into_view()
        }
    }
}

#[component]
fn Shell(state: AppState) -> impl IntoView {
    let theme = create_rw_signal(state.preferences().theme(bridge::prefers_light()));
    let ui = Ui {
        route: create_rw_signal(Route::Dashboard),
        theme,
        entitlement: create_rw_signal(state.entitlement()),
        app: store_value(state),
    };
    provide_context(ui);

    create_effect(move |_| bridge::apply_theme(theme.get()));

    view! {
      <div class="app">
        <Navbar/>
        <main class="main-content">
          {move || match ui.route.get() {
            Route::Dashboard => view! { <Dashboard/> }.into_view(),
            Route::SupplyMap => view! { <SupplyMap/> }.into_view(),
            Route::Signals => view! { <Signals/> }.into_view(),
            Route::Categories => view! { <Categories/> }.into_view(),
            Route::Pricing => view! { <Pricing/> }.into_view(),
            Route::SignIn => view! { <SignIn/> }.into_view(),
          }}
        </main>
        <footer class="app-footer">
          <span>"SupplyShield • Supply Chain Risk Intelligence"</span>
        </footer>
      </div>
    }
}
