use leptos::*;
use plymeasure::{Connectivity, Session};

use crate::config::APP_NAME;
use crate::services::{spawn_health_check, use_service};

#[component]
pub fn Header(session: RwSignal<Session>) -> impl IntoView {
    let service = use_service();
    let connectivity = move || session.with(|s| s.connectivity());

    // Retry the probe
    let on_retry = move |_| {
        log::info!("🔌 Retrying connection...");
        spawn_health_check(service.clone(), session);
    };

    view! {
        <header>
            <div class="header-left">
                <a href="#" class="logo">{APP_NAME}</a>
            </div>
            <div class="header-right">
                <div class="server-status" class:connected=move || connectivity() == Connectivity::Connected>
                    <span
                        class="status-dot"
                        class:connected=move || connectivity() == Connectivity::Connected
                        class:checking=move || connectivity() == Connectivity::Checking
                    ></span>
                    <span>"Server: " {move || connectivity().label()}</span>
                </div>
                <Show
                    when=move || connectivity() == Connectivity::Disconnected
                    fallback=|| view! { }
                >
                    <button class="retry-button" on:click=on_retry.clone()>"Retry"</button>
                </Show>
            </div>
        </header>
    }
}
