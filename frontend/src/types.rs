//! View-side types shared by the components.
//!
//! Submission state lives in [`plymeasure::Session`]; this module only adds
//! what the history panel and the result card need on top of it.

use chrono::{DateTime, Local, Utc};
use plymeasure::{RecordStatus, ResultRecord};

// =============================================================================
// History
// =============================================================================

/// State of the history panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum HistoryState {
    /// A fetch is running.
    #[default]
    Loading,
    /// Records, newest first.
    Loaded(Vec<ResultRecord>),
    /// The fetch failed.
    Failed(String),
}

impl HistoryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, HistoryState::Loading)
    }
}

/// Get CSS class for a record status badge.
pub fn status_class(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Processing => "status status-processing",
        RecordStatus::Completed => "status status-completed",
        RecordStatus::Failed => "status status-failed",
    }
}

/// Creation time in the browser's timezone, `-` when unknown.
pub fn created_label(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One-line summary of a record's dimensions.
pub fn dimensions_summary(record: &ResultRecord) -> Option<String> {
    (record.status == RecordStatus::Completed).then(|| {
        let dims = record.dimensions();
        format!("{:.3} × {:.3} × {:.3}", dims.width, dims.length, dims.height)
    })
}
