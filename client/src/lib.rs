//! # Plymeasure - bounding-box measurements for PLY point clouds
//!
//! Uploads a `.ply` file to an Appwrite project, asks the `process-ply`
//! function for an AABB, OBB or PCA bounding box and waits for the result
//! record to complete.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  PLY file   │────▶│   Storage    │────▶│  Function   │────▶│ Result record│
//! │  (picked)   │     │   (upload)   │     │  (trigger)  │     │   (polled)   │
//! └─────────────┘     └──────────────┘     └─────────────┘     └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plymeasure::{AppwriteClient, AppwriteConfig, PollPolicy, ProcessingService};
//! use plymeasure::{ProcessingMethod, SelectedFile};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = AppwriteClient::new(AppwriteConfig::from_env());
//!     let service = ProcessingService::appwrite(client, PollPolicy::default());
//!     let file = SelectedFile::new("scan.ply", std::fs::read("scan.ply").unwrap());
//!     let result = service
//!         .submit_for_processing(&file, ProcessingMethod::Obb, |p| println!("{}", p))
//!         .await
//!         .unwrap();
//!     println!("{:?}", result.dimensions);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Backend and client error types
//! - [`models`] - Methods, files, records and results
//! - [`config`] - Appwrite project settings and polling bounds
//! - [`backend`] - Collaborator contracts (storage, documents, functions, sleep)
//! - [`appwrite`] - REST implementation of the contracts
//! - [`service`] - Submission orchestration, history and deletion
//! - [`session`] - UI-agnostic presentation state

// Core modules
pub mod error;
pub mod models;
pub mod config;

// Backend access
pub mod backend;
pub mod appwrite;

// Orchestration
pub mod service;

// Presentation state
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{BackendError, BackendResult, ClientError, ClientResult, ConfigError};

pub use models::{
    Dimensions, Execution, MethodInfo, NewResultRecord, ProcessingMethod, ProcessingPayload,
    ProcessingResult, RecordStatus, ResultRecord, SelectedFile, StoredObject,
};

pub use config::{AppwriteConfig, PollPolicy};

pub use backend::{DocumentStore, FunctionRunner, ListQuery, ObjectStorage, ObjectUpload, Sleeper};

#[cfg(feature = "cli")]
pub use backend::TokioSleeper;

pub use appwrite::{unique_id, AppwriteClient};

pub use service::{
    polling_percent, ProcessingService, Progress, ServiceSettings, Stage, DEFAULT_HISTORY_LIMIT,
};

pub use session::{
    is_ply_name, pick_file, validate_file_name, Connectivity, FilePicker, Outcome, Session,
    Submission,
};

#[cfg(feature = "cli")]
pub use session::PathPicker;
