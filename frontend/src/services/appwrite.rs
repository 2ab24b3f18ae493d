//! Appwrite access from the browser.
//!
//! The orchestration lives in [`plymeasure::ProcessingService`]; this module
//! wires it to a timer that works on wasm and runs its calls on the
//! browser's event loop against the shared [`Session`] signal.

use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use leptos::*;
use plymeasure::{AppwriteClient, ProcessingService, ServiceSettings, Session, Sleeper};

use crate::config::{appwrite_config, poll_policy};

/// Sleeper backed by `setTimeout`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooSleeper;

impl Sleeper for GlooSleeper {
    async fn sleep(&self, duration: Duration) {
        let millis = u32::try_from(duration.as_millis()).unwrap_or(u32::MAX);
        TimeoutFuture::new(millis).await;
    }
}

pub type Service = ProcessingService<AppwriteClient, AppwriteClient, AppwriteClient, GlooSleeper>;

/// Build the service from the compiled-in configuration.
pub fn build_service() -> Rc<Service> {
    let config = appwrite_config();
    log::info!("🔧 Appwrite endpoint: {} (project {})", config.endpoint, config.project_id);

    let client = AppwriteClient::new(config);
    Rc::new(ProcessingService::new(
        client.clone(),
        client.clone(),
        client.clone(),
        GlooSleeper,
        ServiceSettings::from_config(client.config(), poll_policy()),
    ))
}

/// The service provided by the app root.
pub fn use_service() -> Rc<Service> {
    expect_context::<Rc<Service>>()
}

/// Probe the backend and store the answer in the session.
pub fn spawn_health_check(service: Rc<Service>, session: RwSignal<Session>) {
    session.update(|s| s.begin_health_check());
    spawn_local(async move {
        let result = service.check_health().await;
        match &result {
            Ok(()) => log::info!("✅ Appwrite reachable"),
            Err(e) => log::warn!("🔌 Appwrite unreachable: {}", e),
        }
        session.update(|s| s.finish_health_check(result));
    });
}

/// Run the submission the session accepts, if any.
///
/// `on_settled` runs once the call settles, whatever the outcome.
pub fn spawn_submission(service: Rc<Service>, session: RwSignal<Session>, on_settled: impl Fn() + 'static) {
    let Some(Ok(submission)) = session.try_update(|s| s.begin_submission()) else {
        return;
    };

    log::info!("📤 Submitting {} ({})", submission.file.name, submission.method);
    spawn_local(async move {
        let outcome = service
            .submit_for_processing(&submission.file, submission.method, |progress| {
                log::debug!("{}", progress);
                session.update(|s| s.record_progress(progress));
            })
            .await;

        match &outcome {
            Ok(result) => log::info!("✅ {} measured", result.filename),
            Err(e) => log::error!("❌ Processing failed: {}", e),
        }
        session.update(|s| s.finish_submission(outcome));
        on_settled();
    });
}
