//! Latest result records, newest first, with a delete action.
//!
//! Reloads on mount, whenever `refresh` changes, and after a delete.

use leptos::*;
use plymeasure::ResultRecord;

use crate::config::HISTORY_LIMIT;
use crate::services::use_service;
use crate::types::{created_label, dimensions_summary, status_class, HistoryState};

#[component]
pub fn HistoryPanel(refresh: ReadSignal<u32>) -> impl IntoView {
    let service = use_service();
    let history = create_rw_signal(HistoryState::Loading);
    let (delete_error, set_delete_error) = create_signal(None::<String>);
    let (deleting, set_deleting) = create_signal(None::<String>);

    let load = {
        let service = service.clone();
        Callback::new(move |()| {
            history.set(HistoryState::Loading);
            let service = service.clone();
            spawn_local(async move {
                let state = match service.list_results(HISTORY_LIMIT).await {
                    Ok(records) => {
                        log::debug!("📋 {} history records", records.len());
                        HistoryState::Loaded(records)
                    }
                    Err(e) => {
                        log::warn!("📋 {}", e);
                        HistoryState::Failed(e.to_string())
                    }
                };
                history.set(state);
            });
        })
    };

    create_effect(move |_| {
        refresh.get();
        load.call(());
    });

    let on_delete = Callback::new(move |record: ResultRecord| {
        set_delete_error.set(None);
        set_deleting.set(Some(record.id.clone()));
        let service = service.clone();
        spawn_local(async move {
            match service.delete_result(&record.id, &record.file_id).await {
                Ok(()) => {
                    log::info!("🗑️ Deleted {}", record.id);
                    load.call(());
                }
                Err(e) => {
                    log::error!("❌ {}", e);
                    set_delete_error.set(Some(e.to_string()));
                }
            }
            set_deleting.set(None);
        });
    });

    let records = move || match history.get() {
        HistoryState::Loaded(records) => records,
        _ => Vec::new(),
    };

    view! {
        <div class="history-panel">
            <div class="history-header">
                <h2>"History"</h2>
                <button
                    class="refresh-button"
                    disabled=move || history.with(|h| h.is_loading())
                    on:click=move |_| load.call(())
                >
                    "Refresh"
                </button>
            </div>

            {move || history.with(|h| match h {
                HistoryState::Loading => view! { <div class="history-empty">"Loading..."</div> }.into_view(),
                HistoryState::Failed(message) => view! { <div class="error-message">{message.clone()}</div> }.into_view(),
                HistoryState::Loaded(records) if records.is_empty() => {
                    view! { <div class="history-empty">"No results yet"</div> }.into_view()
                }
                HistoryState::Loaded(_) => ().into_view(),
            })}

            <Show
                when=move || delete_error.get().is_some()
                fallback=|| view! { }
            >
                <div class="error-message">{move || delete_error.get().unwrap_or_default()}</div>
            </Show>

            <ul class="history-list">
                <For
                    each=records
                    key=|record| record.id.clone()
                    children=move |record| {
                        let id = record.id.clone();
                        let busy = move || deleting.get().as_deref() == Some(id.as_str());
                        let summary = dimensions_summary(&record);
                        let created = created_label(record.created_at);
                        let filename = record.filename.clone();
                        let method = record.method.as_str();
                        let status = record.status;
                        let error = record.error.clone();
                        view! {
                            <li class="history-item">
                                <div class="history-main">
                                    <span class="history-filename">{filename}</span>
                                    <span class="history-method">{method}</span>
                                    <span class=status_class(status)>{status.to_string()}</span>
                                </div>
                                <div class="history-meta">
                                    <span>{created}</span>
                                    {summary.map(|s| view! { <span class="history-dims">{s}</span> })}
                                    {error.map(|e| view! { <span class="history-error">{e}</span> })}
                                </div>
                                <button
                                    class="delete-button"
                                    disabled=busy.clone()
                                    on:click=move |_| on_delete.call(record.clone())
                                >
                                    {move || if busy() { "Deleting..." } else { "Delete" }}
                                </button>
                            </li>
                        }
                    }
                />
            </ul>
        </div>
    }
}
