//! Presentation state, independent of any UI toolkit.
//!
//! [`Session`] holds what the screen shows: connectivity, the picked file,
//! the selected method, submission progress and the last outcome. The web
//! frontend and the terminal front end both render from it and feed it the
//! results of [`crate::service::ProcessingService`] calls.
//!
//! File picking goes through [`FilePicker`]; [`pick_file`] rejects anything
//! that is not a `.ply` file before the backend is ever contacted.

#![allow(async_fn_in_trait)]

use crate::error::{ClientError, ClientResult};
use crate::models::{ProcessingMethod, ProcessingResult, SelectedFile};
use crate::service::Progress;

/// Accepted file extension, compared case-insensitively.
pub const PLY_EXTENSION: &str = ".ply";

/// Whether `name` ends in `.ply`, ignoring case.
pub fn is_ply_name(name: &str) -> bool {
    name.to_lowercase().ends_with(PLY_EXTENSION)
}

/// Reject names that are not `.ply` files.
pub fn validate_file_name(name: &str) -> ClientResult<()> {
    if is_ply_name(name) {
        Ok(())
    } else {
        Err(ClientError::InvalidInput("Please select a PLY file".to_string()))
    }
}

/// Source of user-chosen files.
pub trait FilePicker {
    /// Open the chooser. `Ok(None)` when the user cancels.
    async fn pick(&self) -> ClientResult<Option<SelectedFile>>;
}

/// Pick a file and check its extension.
pub async fn pick_file<P: FilePicker>(picker: &P) -> ClientResult<Option<SelectedFile>> {
    match picker.pick().await? {
        Some(file) => {
            validate_file_name(&file.name)?;
            Ok(Some(file))
        }
        None => Ok(None),
    }
}

/// Picker over a path given on the command line.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PathPicker {
    path: std::path::PathBuf,
}

#[cfg(feature = "cli")]
impl PathPicker {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(feature = "cli")]
impl FilePicker for PathPicker {
    async fn pick(&self) -> ClientResult<Option<SelectedFile>> {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        // Check the name before reading a potentially large file.
        validate_file_name(&name)?;

        let content = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ClientError::Io(format!("{}: {}", self.path.display(), e)))?;
        Ok(Some(SelectedFile::new(name, content)))
    }
}

// =============================================================================
// Session State
// =============================================================================

/// Backend reachability as last probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    #[default]
    Checking,
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Checking => "Checking...",
            Connectivity::Connected => "Connected",
            Connectivity::Disconnected => "Disconnected",
        }
    }
}

/// How the last submission ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Succeeded(ProcessingResult),
    Failed(String),
}

/// A submission the session has accepted; hand it to the service.
#[derive(Debug, Clone)]
pub struct Submission {
    pub file: SelectedFile,
    pub method: ProcessingMethod,
}

/// What the screen shows.
#[derive(Debug, Clone, Default)]
pub struct Session {
    connectivity: Connectivity,
    connectivity_error: Option<String>,
    file: Option<SelectedFile>,
    method: ProcessingMethod,
    in_flight: bool,
    progress: Option<Progress>,
    outcome: Option<Outcome>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // --- connectivity ---

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Message for the connectivity banner, set while disconnected.
    pub fn connectivity_error(&self) -> Option<&str> {
        self.connectivity_error.as_deref()
    }

    /// A probe (initial or retry) is starting.
    pub fn begin_health_check(&mut self) {
        self.connectivity = Connectivity::Checking;
        self.connectivity_error = None;
    }

    /// Apply the result of a health probe.
    pub fn finish_health_check(&mut self, result: ClientResult<()>) {
        match result {
            Ok(()) => {
                self.connectivity = Connectivity::Connected;
                self.connectivity_error = None;
            }
            Err(e) => {
                self.connectivity = Connectivity::Disconnected;
                self.connectivity_error = Some(e.to_string());
            }
        }
    }

    // --- file and method ---

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    /// Apply the result of [`pick_file`].
    ///
    /// A new file clears the previous outcome; a cancel keeps everything; a
    /// rejected file keeps the previous selection and returns the error for
    /// the view to show.
    pub fn apply_pick(&mut self, picked: ClientResult<Option<SelectedFile>>) -> ClientResult<()> {
        if self.in_flight {
            return Ok(());
        }
        if let Some(file) = picked? {
            validate_file_name(&file.name)?;
            self.file = Some(file);
            self.outcome = None;
        }
        Ok(())
    }

    pub fn method(&self) -> ProcessingMethod {
        self.method
    }

    /// Change the method. Ignored while a submission is running.
    pub fn select_method(&mut self, method: ProcessingMethod) {
        if !self.in_flight {
            self.method = method;
        }
    }

    // --- submission ---

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.file.is_some() && !self.in_flight && self.connectivity == Connectivity::Connected
    }

    /// Start a submission.
    pub fn begin_submission(&mut self) -> ClientResult<Submission> {
        let file = self.file.clone().ok_or_else(|| {
            ClientError::InvalidInput("Please select a PLY file first".to_string())
        })?;
        if self.in_flight {
            return Err(ClientError::InvalidInput(
                "A file is already being processed".to_string(),
            ));
        }
        if self.connectivity != Connectivity::Connected {
            return Err(ClientError::InvalidInput(
                "Not connected to the server".to_string(),
            ));
        }

        self.in_flight = true;
        self.progress = Some(Progress::new(0, crate::service::Stage::Uploading));
        self.outcome = None;
        Ok(Submission { file, method: self.method })
    }

    /// Record a progress notification. Never moves backwards.
    pub fn record_progress(&mut self, progress: Progress) {
        if !self.in_flight {
            return;
        }
        match self.progress {
            Some(current) if current.percent > progress.percent => {}
            _ => self.progress = Some(progress),
        }
    }

    /// Current progress, while a submission runs.
    pub fn progress(&self) -> Option<Progress> {
        self.progress
    }

    /// Percentage for the progress bar, 0 when idle.
    pub fn percent(&self) -> u8 {
        self.progress.map(|p| p.percent).unwrap_or(0)
    }

    /// Apply the outcome of a submission and return to idle.
    pub fn finish_submission(&mut self, result: ClientResult<ProcessingResult>) {
        self.in_flight = false;
        self.progress = None;
        self.outcome = Some(match result {
            Ok(result) => Outcome::Succeeded(result),
            Err(e) => Outcome::Failed(e.to_string()),
        });
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Result to display, if the last submission succeeded.
    pub fn result(&self) -> Option<&ProcessingResult> {
        match &self.outcome {
            Some(Outcome::Succeeded(result)) => Some(result),
            _ => None,
        }
    }

    /// Error notice to display, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Some(Outcome::Failed(message)) => Some(message),
            _ => None,
        }
    }

    /// Close the error notice.
    pub fn dismiss_error(&mut self) {
        if matches!(self.outcome, Some(Outcome::Failed(_))) {
            self.outcome = None;
        }
    }

    /// Label of the submit control.
    pub fn submit_label(&self) -> String {
        match self.progress {
            Some(p) if self.in_flight && p.percent < 100 => format!("Uploading {}%", p.percent),
            _ if self.in_flight => "Processing...".to_string(),
            _ => "Process File".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dimensions;
    use crate::service::Stage;

    struct FixedPicker(Option<SelectedFile>);

    impl FilePicker for FixedPicker {
        async fn pick(&self) -> ClientResult<Option<SelectedFile>> {
            Ok(self.0.clone())
        }
    }

    fn connected_with_file() -> Session {
        let mut session = Session::new();
        session.finish_health_check(Ok(()));
        session
            .apply_pick(Ok(Some(SelectedFile::new("scan.ply", vec![1, 2, 3]))))
            .unwrap();
        session
    }

    fn sample_result() -> ProcessingResult {
        ProcessingResult {
            filename: "scan.ply".into(),
            method: ProcessingMethod::Aabb,
            dimensions: Dimensions { width: 1.0, length: 2.0, height: 3.0 },
            file_id: "f".into(),
            result_id: "r".into(),
        }
    }

    #[test]
    fn test_extension_check() {
        assert!(is_ply_name("scan.ply"));
        assert!(is_ply_name("SCAN.PLY"));
        assert!(is_ply_name("a.b.Ply"));
        assert!(!is_ply_name("scan.ply.zip"));
        assert!(!is_ply_name("scan.obj"));
        assert!(!is_ply_name("ply"));
        assert!(!is_ply_name(""));
    }

    #[tokio::test]
    async fn test_pick_file_rejects_other_extensions() {
        let picker = FixedPicker(Some(SelectedFile::new("mesh.stl", vec![0])));
        let err = pick_file(&picker).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let picker = FixedPicker(Some(SelectedFile::new("Mesh.PLY", vec![0])));
        assert!(pick_file(&picker).await.unwrap().is_some());

        let cancelled = FixedPicker(None);
        assert!(pick_file(&cancelled).await.unwrap().is_none());
    }

    #[cfg(feature = "cli")]
    #[tokio::test]
    async fn test_path_picker_reads_ply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.ply");
        std::fs::write(&path, b"ply\nend_header\n").unwrap();

        let file = pick_file(&PathPicker::new(&path)).await.unwrap().unwrap();
        assert_eq!(file.name, "room.ply");
        assert_eq!(file.size, 15);
        assert_eq!(file.content, b"ply\nend_header\n");
    }

    #[cfg(feature = "cli")]
    #[tokio::test]
    async fn test_path_picker_checks_name_before_reading() {
        let dir = tempfile::tempdir().unwrap();

        // Never created: the extension check fails first.
        let err = pick_file(&PathPicker::new(dir.path().join("notes.txt"))).await.unwrap_err();
        assert_eq!(err, ClientError::InvalidInput("Please select a PLY file".to_string()));

        let err = pick_file(&PathPicker::new(dir.path().join("missing.ply"))).await.unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn test_defaults() {
        let session = Session::new();
        assert_eq!(session.connectivity(), Connectivity::Checking);
        assert_eq!(session.method(), ProcessingMethod::Aabb);
        assert_eq!(session.percent(), 0);
        assert!(!session.can_submit());
    }

    #[test]
    fn test_submit_requires_file_and_connection() {
        let mut session = Session::new();
        session.finish_health_check(Ok(()));
        assert!(matches!(session.begin_submission(), Err(ClientError::InvalidInput(_))));

        let mut session = connected_with_file();
        session.finish_health_check(Err(ClientError::Connectivity("down".into())));
        assert!(!session.can_submit());
        assert!(session.begin_submission().is_err());
        assert_eq!(session.connectivity_error(), Some("down"));

        session.begin_health_check();
        assert_eq!(session.connectivity(), Connectivity::Checking);
        assert!(session.connectivity_error().is_none());
    }

    #[test]
    fn test_single_submission_in_flight() {
        let mut session = connected_with_file();
        let submission = session.begin_submission().unwrap();
        assert_eq!(submission.file.name, "scan.ply");
        assert!(!session.can_submit());
        assert!(session.begin_submission().is_err());

        session.select_method(ProcessingMethod::Pca);
        assert_eq!(session.method(), ProcessingMethod::Aabb);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut session = connected_with_file();
        session.begin_submission().unwrap();
        session.record_progress(Progress::new(40, Stage::RecordCreated));
        session.record_progress(Progress::new(30, Stage::Uploaded));
        assert_eq!(session.percent(), 40);
        assert_eq!(session.submit_label(), "Uploading 40%");

        session.record_progress(Progress::new(100, Stage::Completed));
        assert_eq!(session.submit_label(), "Processing...");
    }

    #[test]
    fn test_failure_resets_in_flight_state() {
        let mut session = connected_with_file();
        session.begin_submission().unwrap();
        session.record_progress(Progress::new(60, Stage::Triggered));
        session.finish_submission(Err(ClientError::Timeout));

        assert!(!session.is_in_flight());
        assert_eq!(session.percent(), 0);
        assert_eq!(session.error(), Some("Processing timeout. Please try again."));
        assert!(session.result().is_none());
        assert_eq!(session.connectivity(), Connectivity::Connected);

        session.dismiss_error();
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_success_shows_result() {
        let mut session = connected_with_file();
        session.begin_submission().unwrap();
        session.finish_submission(Ok(sample_result()));

        assert_eq!(session.result().map(|r| r.dimensions.height), Some(3.0));
        assert!(session.error().is_none());
        assert!(session.can_submit());
    }

    #[test]
    fn test_rejected_pick_keeps_previous_file() {
        let mut session = connected_with_file();
        let err = session
            .apply_pick(Ok(Some(SelectedFile::new("notes.txt", vec![]))))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert_eq!(session.file().map(|f| f.name.as_str()), Some("scan.ply"));

        session.apply_pick(Ok(None)).unwrap();
        assert!(session.file().is_some());
    }

    #[test]
    fn test_new_pick_clears_previous_result() {
        let mut session = connected_with_file();
        session.begin_submission().unwrap();
        session.finish_submission(Ok(sample_result()));

        session
            .apply_pick(Ok(Some(SelectedFile::new("other.ply", vec![9]))))
            .unwrap();
        assert!(session.outcome().is_none());
    }
}
