//! PLY file selection.
//!
//! Clicking the zone opens the file dialog; the chosen file is validated
//! and read into the session. Nothing is sent until the user presses
//! the process button.

use leptos::*;
use plymeasure::{pick_file, Session};
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlInputElement};

use crate::services::BrowserPicker;

#[component]
pub fn UploadSection(session: RwSignal<Session>) -> impl IntoView {
    let (pick_error, set_pick_error) = create_signal(None::<String>);
    let in_flight = move || session.with(|s| s.is_in_flight());

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        let picker = BrowserPicker::from_input(&input);
        // Allow picking the same file again after a rejection.
        input.set_value("");

        spawn_local(async move {
            let picked = pick_file(&picker).await;
            match session.try_update(|s| s.apply_pick(picked)) {
                Some(Err(e)) => {
                    log::warn!("📄 {}", e);
                    set_pick_error.set(Some(e.to_string()));
                }
                _ => set_pick_error.set(None),
            }
        });
    };

    let trigger_file_input = move |_| {
        if in_flight() {
            return;
        }
        if let Some(window) = web_sys::window() {
            if let Some(document) = window.document() {
                if let Some(input) = document.get_element_by_id("fileInput") {
                    if let Some(html_input) = input.dyn_ref::<HtmlInputElement>() {
                        html_input.click();
                    }
                }
            }
        }
    };

    view! {
        <div
            class="upload-section"
            class:disabled=in_flight
            id="uploadZone"
            on:click=trigger_file_input
        >
            <div class="upload-icon">"📤"</div>
            <div class="upload-text">
                {move || session.with(|s| match s.file() {
                    Some(file) => format!("{} ({})", file.name, file.size_label()),
                    None => "Select a PLY file".to_string(),
                })}
            </div>
            <div class="upload-hint">"Click to choose a .ply point cloud"</div>

            <Show
                when=move || pick_error.get().is_some()
                fallback=|| view! { }
            >
                <div class="error-message">
                    {move || pick_error.get().unwrap_or_default()}
                </div>
            </Show>

            <input
                type="file"
                id="fileInput"
                accept=".ply"
                style="display:none"
                on:change=on_file_change
            />
        </div>
    }
}
