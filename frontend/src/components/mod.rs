//! UI Components for the PLY Measure application.
//!
//! Every component reads and writes the shared `RwSignal<Session>`; none
//! keeps its own copy of submission state.
//!
//! # Layout Components
//! - [`Header`] - App name, server status and retry
//! - [`Hero`] - Main title and description
//! - [`Footer`] - Page footer
//!
//! # Feature Components
//! - [`UploadSection`] - PLY file selection
//! - [`MethodSelector`] - AABB / OBB / PCA choice
//! - [`ProgressSection`] - Process button and progress bar
//! - [`ResultCard`] - Dimensions of the last result
//! - [`ConnectivityBanner`], [`ErrorNotice`] - Error surfaces
//! - [`HistoryPanel`] - Previous results with delete

mod header;
mod hero;
mod upload;
mod method;
mod progress;
mod result;
mod notice;
mod history;
mod footer;

pub use header::*;
pub use hero::*;
pub use upload::*;
pub use method::*;
pub use progress::*;
pub use result::*;
pub use notice::*;
pub use history::*;
pub use footer::*;
