//! Application configuration.
//!
//! The browser has no process environment, so Appwrite settings are baked in
//! at build time: any `APPWRITE_*` / `PLYMEASURE_POLL_*` variable set while
//! running `trunk build` overrides the library defaults.

use plymeasure::{AppwriteConfig, PollPolicy};

/// Application name shown in the header and page title.
pub const APP_NAME: &str = "PLY Measure";

/// Number of history records shown.
pub const HISTORY_LIMIT: u32 = 10;

/// Build-time value of a configuration variable.
fn build_time_value(name: &str) -> Option<&'static str> {
    match name {
        "APPWRITE_ENDPOINT" => option_env!("APPWRITE_ENDPOINT"),
        "APPWRITE_PROJECT_ID" => option_env!("APPWRITE_PROJECT_ID"),
        "APPWRITE_DATABASE_ID" => option_env!("APPWRITE_DATABASE_ID"),
        "APPWRITE_COLLECTION_ID" => option_env!("APPWRITE_COLLECTION_ID"),
        "APPWRITE_BUCKET_ID" => option_env!("APPWRITE_BUCKET_ID"),
        "APPWRITE_FUNCTION_ID" => option_env!("APPWRITE_FUNCTION_ID"),
        "PLYMEASURE_POLL_INTERVAL_SECS" => option_env!("PLYMEASURE_POLL_INTERVAL_SECS"),
        "PLYMEASURE_POLL_MAX_ATTEMPTS" => option_env!("PLYMEASURE_POLL_MAX_ATTEMPTS"),
        // API keys never ship to the browser.
        _ => None,
    }
}

/// Appwrite project settings.
pub fn appwrite_config() -> AppwriteConfig {
    AppwriteConfig::from_lookup(|name| build_time_value(name).map(str::to_string))
}

/// Polling bounds. An invalid build-time value falls back to the defaults.
pub fn poll_policy() -> PollPolicy {
    PollPolicy::from_lookup(|name| build_time_value(name).map(str::to_string)).unwrap_or_else(|e| {
        log::warn!("⚠️ {}, using default polling", e);
        PollPolicy::default()
    })
}
