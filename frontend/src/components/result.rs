//! Result card of the last successful submission.

use leptos::*;
use plymeasure::Session;

#[component]
pub fn ResultCard(session: RwSignal<Session>) -> impl IntoView {
    let result = move || session.with(|s| s.result().cloned());

    view! {
        <Show
            when=move || result().is_some()
            fallback=|| view! { }
        >
            {move || result().map(|result| {
                view! {
                    <div class="result-card">
                        <h2>"Results"</h2>
                        <div class="result-row">
                            <span class="result-label">"File"</span>
                            <span class="result-value">{result.filename.clone()}</span>
                        </div>
                        <div class="result-row">
                            <span class="result-label">"Method"</span>
                            <span class="result-value">{result.method.label()}</span>
                        </div>
                        <h3>"Dimensions"</h3>
                        {result
                            .dimensions
                            .format_units()
                            .into_iter()
                            .map(|(label, value)| view! {
                                <div class="result-row">
                                    <span class="result-label">{label}</span>
                                    <span class="result-value">{value}</span>
                                </div>
                            })
                            .collect_view()}
                    </div>
                }
            })}
        </Show>
    }
}
