use leptos::*;
use plymeasure::Session;

use crate::services::{spawn_submission, use_service};

/// Process button and the progress bar of the running submission.
#[component]
pub fn ProgressSection(session: RwSignal<Session>, on_settled: Callback<()>) -> impl IntoView {
    let service = use_service();

    let on_process = move |_| {
        spawn_submission(service.clone(), session, move || on_settled.call(()));
    };

    view! {
        <div class="progress-section">
            <button
                class="process-button"
                disabled=move || session.with(|s| !s.can_submit())
                on:click=on_process
            >
                {move || session.with(|s| s.submit_label())}
            </button>

            <Show
                when=move || session.with(|s| s.is_in_flight())
                fallback=|| view! { }
            >
                <div class="progress-bar">
                    <div
                        class="progress-fill"
                        style:width=move || format!("{}%", session.with(|s| s.percent()))
                    ></div>
                </div>
                <div class="progress-stage">
                    {move || session.with(|s| s.progress().map(|p| p.stage.label()).unwrap_or_default())}
                </div>
            </Show>
        </div>
    }
}
