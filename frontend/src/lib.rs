//! PLY Measure - Frontend Rust/Leptos Application
//!
//! A WebAssembly frontend for measuring PLY point clouds through an
//! Appwrite project.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Header (server status, retry)                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  MainContent                                                 │
//! │  ├── Hero (title, description)                              │
//! │  ├── ConnectivityBanner / ErrorNotice                       │
//! │  ├── UploadSection + MethodSelector                         │
//! │  ├── ProgressSection (process button, bar)                  │
//! │  ├── ResultCard (when a result is in)                       │
//! │  └── HistoryPanel                                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] - Build-time Appwrite settings
//! - [`types`] - History state and display helpers
//! - [`components`] - UI components
//! - [`services`] - Service construction, browser sleeper and file picker

use leptos::*;
use leptos_meta::{provide_meta_context, Title};
use leptos_router::*;
use plymeasure::Session;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::HistoryState;

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// Install the panic hook and console logger, then mount the app.
pub fn mount() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 PLY Measure - Starting Leptos App");

    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    provide_context(build_service());

    view! {
        <Title text=APP_NAME/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=MainContent/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn MainContent() -> impl IntoView {
    // Global state for the application
    let session = create_rw_signal(Session::new());
    let (history_version, set_history_version) = create_signal(0u32);

    // Probe the backend once at startup
    spawn_health_check(use_service(), session);

    let on_settled = Callback::new(move |()| set_history_version.update(|v| *v += 1));

    view! {
        <Header session=session/>

        <div class="container">
            <Hero/>
            <ConnectivityBanner session=session/>
            <ErrorNotice session=session/>

            <UploadSection session=session/>
            <MethodSelector session=session/>
            <ProgressSection session=session on_settled=on_settled/>

            <ResultCard session=session/>
            <HistoryPanel refresh=history_version/>
        </div>

        <Footer/>
    }
}
