//! Domain models for the PLY measurement client.
//!
//! - [`ProcessingMethod`] - AABB, OBB or PCA, sent verbatim to the backend
//! - [`SelectedFile`] - a picked file held in memory until upload
//! - [`StoredObject`] - an uploaded object in storage
//! - [`ResultRecord`] - the status record the processing function updates
//! - [`ProcessingResult`] - what a successful submission returns
//!
//! Field names on the wire follow the Appwrite document schema
//! (`fileId`, `$id`, `$createdAt`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Processing Method
// =============================================================================

/// Bounding-box computation requested from the processing function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ProcessingMethod {
    /// Axis-aligned bounding box.
    #[default]
    #[serde(rename = "AABB")]
    Aabb,
    /// Oriented bounding box.
    #[serde(rename = "OBB")]
    Obb,
    /// Box aligned with the principal components.
    #[serde(rename = "PCA")]
    Pca,
}

impl ProcessingMethod {
    /// All methods, in display order.
    pub const ALL: [ProcessingMethod; 3] = [Self::Aabb, Self::Obb, Self::Pca];

    /// Selector value sent to the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aabb => "AABB",
            Self::Obb => "OBB",
            Self::Pca => "PCA",
        }
    }

    /// Long human-readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Aabb => "Axis-Aligned Bounding Box",
            Self::Obb => "Oriented Bounding Box",
            Self::Pca => "Principal Component Analysis",
        }
    }

    /// The method catalogue offered to UIs.
    pub fn catalogue() -> Vec<MethodInfo> {
        Self::ALL
            .iter()
            .map(|m| MethodInfo {
                value: *m,
                label: m.label().to_string(),
            })
            .collect()
    }
}

impl fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ProcessingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AABB" => Ok(Self::Aabb),
            "OBB" => Ok(Self::Obb),
            "PCA" => Ok(Self::Pca),
            other => Err(format!("Unknown processing method: {}", other)),
        }
    }
}

/// Entry of the method catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub value: ProcessingMethod,
    pub label: String,
}

// =============================================================================
// Selected File
// =============================================================================

/// MIME type used when the picker did not report one.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A file chosen by the user, kept in memory until the upload starts.
#[derive(Clone, PartialEq)]
pub struct SelectedFile {
    /// File name as reported by the picker.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// File content.
    pub content: Vec<u8>,
    /// MIME type reported by the picker, if any.
    pub mime_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// MIME type for the upload.
    pub fn upload_mime_type(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// Size in megabytes with two decimals, as shown next to the file name.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size as f64 / 1024.0 / 1024.0)
    }
}

// Content is omitted, point clouds are large.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.size)
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

// =============================================================================
// Storage Types
// =============================================================================

/// An object stored in a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub size_original: u64,
    #[serde(default)]
    pub mime_type: String,
}

// =============================================================================
// Result Record
// =============================================================================

/// Lifecycle of a result record.
///
/// Created as `processing` by the client, moved to `completed` or `failed`
/// by the processing function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Processing,
    Completed,
    Failed,
}

impl RecordStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RecordStatus::Processing)
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordStatus::Processing => "processing",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Fields written when a record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResultRecord {
    pub filename: String,
    pub method: ProcessingMethod,
    pub file_id: String,
    pub status: RecordStatus,
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl NewResultRecord {
    /// A `processing` record with zeroed dimensions.
    pub fn processing(filename: &str, method: ProcessingMethod, file_id: &str) -> Self {
        Self {
            filename: filename.to_string(),
            method,
            file_id: file_id.to_string(),
            status: RecordStatus::Processing,
            width: 0.0,
            length: 0.0,
            height: 0.0,
        }
    }
}

/// A status record as stored in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub filename: String,
    pub method: ProcessingMethod,
    pub file_id: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRecord {
    /// Build the stored form of a new record.
    pub fn from_new(id: impl Into<String>, new: &NewResultRecord) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            filename: new.filename.clone(),
            method: new.method,
            file_id: new.file_id.clone(),
            status: new.status,
            width: new.width,
            length: new.length,
            height: new.height,
            error: None,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            length: self.length,
            height: self.height,
        }
    }
}

// =============================================================================
// Function Execution
// =============================================================================

/// Payload handed to the processing function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingPayload {
    pub file_id: String,
    pub method: ProcessingMethod,
    pub result_id: String,
}

/// Acknowledgement of an accepted execution.
///
/// Only confirms the invocation was accepted, not that processing finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub status: String,
}

// =============================================================================
// Processing Result
// =============================================================================

/// Bounding-box extents in the file's native units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl Dimensions {
    /// `(label, "x.xxx units")` rows for display.
    pub fn format_units(&self) -> [(&'static str, String); 3] {
        [
            ("Width", format!("{:.3} units", self.width)),
            ("Length", format!("{:.3} units", self.length)),
            ("Height", format!("{:.3} units", self.height)),
        ]
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub filename: String,
    pub method: ProcessingMethod,
    pub dimensions: Dimensions,
    pub file_id: String,
    pub result_id: String,
}
