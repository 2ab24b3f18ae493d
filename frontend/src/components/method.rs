use leptos::*;
use plymeasure::{ProcessingMethod, Session};

/// Three mutually exclusive method buttons and the long name of the choice.
#[component]
pub fn MethodSelector(session: RwSignal<Session>) -> impl IntoView {
    let current = move || session.with(|s| s.method());

    view! {
        <div class="method-section">
            <div class="method-buttons">
                {ProcessingMethod::ALL
                    .into_iter()
                    .map(|method| {
                        view! {
                            <button
                                class="method-button"
                                class:active=move || current() == method
                                disabled=move || session.with(|s| s.is_in_flight())
                                on:click=move |_| session.update(|s| s.select_method(method))
                            >
                                {method.as_str()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <div class="method-label">{move || current().label()}</div>
        </div>
    }
}
