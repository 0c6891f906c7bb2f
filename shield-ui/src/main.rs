mod app;
mod bridge;
mod components;
mod download;
mod leaflet;
mod pages;
mod session;
mod storage;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    leptos::mount_to_body(|| leptos::view! { <app::App/> });
}
