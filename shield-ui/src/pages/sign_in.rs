use crate::app::{use_ui, Route};
use leptos::*;
use risk_registry::{LoginRequest, RegisterRequest};
use wasm_bindgen_futures::spawn_local;

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Email and password form used when no hosted sign-in is loaded.
#[component]
pub fn SignIn() -> impl IntoView {
    let ui = use_ui();
    let registering = create_rw_signal(false);
    let email = create_rw_signal(String::new());
    let password = create_rw_signal(String::new());
    let full_name = create_rw_signal(String::new());
    let company = create_rw_signal(String::new());
    let error = create_rw_signal(None::<String>);
    let busy = create_rw_signal(false);

    let submit = move || {
        if busy.get_untracked() {
            return;
        }
        let email = email.get_untracked().trim().to_string();
        let password = password.get_untracked();
        if email.is_empty() || password.is_empty() {
            error.set(Some("Email and password are required.".to_string()));
            return;
        }
        busy.set(true);
        error.set(None);
        let app = ui.app();
        let register = registering.get_untracked().then(|| RegisterRequest {
            email: email.clone(),
            password: password.clone(),
            full_name: optional(full_name.get_untracked()),
            company: optional(company.get_untracked()),
        });
        spawn_local(async move {
            let outcome = match register {
                Some(payload) => app.register(&payload).await,
                None => app.login(&LoginRequest { email, password }).await,
            };
            busy.set(false);
            match outcome {
                Ok(user) => {
                    tracing::info!(user = %user.email, "signed in");
                    ui.refresh();
                    ui.route.set(Route::Dashboard);
                }
                Err(err) => error.set(Some(err.detail().unwrap_or("Sign-in failed.").to_string())),
            }
        });
    };

    let field = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
          <label class="form-field">
            <span>{label}</span>
            <input
              type=kind
              prop:value=move || value.get()
              on:input=move |ev| value.set(event_target_value(&ev))
            />
          </label>
        }
    };

    view! {
      <div class="auth-page">
        <div class="card auth-card">
          <h1>{move || if registering.get() { "Create your account" } else { "Welcome back" }}</h1>
          {field("Email", "email", email)}
          {field("Password", "password", password)}
          <Show when=move || registering.get() fallback=|| ()>
            {field("Full name", "text", full_name)}
            {field("Company", "text", company)}
          </Show>
          {move || error.get().map(|e| view! { <div class="error-message">{e}</div> })}
          <button class="btn btn-primary btn-lg" disabled=move || busy.get() on:click=move |_| submit()>
            {move || match (busy.get(), registering.get()) {
                (true, _) => "Please wait...",
                (false, true) => "Create Account",
                (false, false) => "Sign In",
            }}
          </button>
          <button class="btn btn-link" on:click=move |_| registering.update(|r| *r = !*r)>
            {move || if registering.get() { "Already have an account? Sign in" } else { "New here? Create an account" }}
          </button>
        </div>
      </div>
    }
}
