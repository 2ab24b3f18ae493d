//! Error surfaces.
//!
//! A failed health probe shows as a banner under the header; a failed
//! submission shows as a dismissable notice. The two never share a slot.

use leptos::*;
use plymeasure::Session;

#[component]
pub fn ConnectivityBanner(session: RwSignal<Session>) -> impl IntoView {
    let message = move || session.with(|s| s.connectivity_error().map(str::to_string));

    view! {
        <Show
            when=move || message().is_some()
            fallback=|| view! { }
        >
            <div class="banner banner-error">
                "🔌 " {move || message().unwrap_or_default()}
            </div>
        </Show>
    }
}

#[component]
pub fn ErrorNotice(session: RwSignal<Session>) -> impl IntoView {
    let message = move || session.with(|s| s.error().map(str::to_string));

    view! {
        <Show
            when=move || message().is_some()
            fallback=|| view! { }
        >
            <div class="error-notice">
                <span>"❌ " {move || message().unwrap_or_default()}</span>
                <button
                    class="dismiss-button"
                    on:click=move |_| session.update(|s| s.dismiss_error())
                >
                    "×"
                </button>
            </div>
        </Show>
    }
}
