//! Remote orchestration: one submission end to end.
//!
//! ```text
//! idle → uploading → record-created → triggered → polling → succeeded | failed
//! ```
//!
//! Every step is a single remote call awaited in sequence; the poll loop reads
//! the record at most [`PollPolicy::max_attempts`] times, sleeping
//! [`PollPolicy::interval`] before each read. A failed step aborts the whole
//! submission. Objects and records created before a failure are left as they
//! are, and a timed-out record stays `processing`.

pub mod progress;

use crate::backend::{DocumentStore, FunctionRunner, ListQuery, ObjectStorage, ObjectUpload, Sleeper};
use crate::config::{AppwriteConfig, PollPolicy};
use crate::error::{
    BackendError, ClientError, ClientResult, CONNECTIVITY_FAILURE, GENERIC_PROCESSING_FAILURE,
};
use crate::models::{
    MethodInfo, NewResultRecord, ProcessingMethod, ProcessingPayload, ProcessingResult,
    RecordStatus, ResultRecord, SelectedFile,
};

pub use progress::{polling_percent, Progress, Stage};

#[cfg(feature = "cli")]
use crate::{appwrite::AppwriteClient, backend::TokioSleeper};

/// Default page size of [`ProcessingService::list_results`].
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Resource identifiers and polling bounds used by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub bucket_id: String,
    pub database_id: String,
    pub collection_id: String,
    pub function_id: String,
    pub poll: PollPolicy,
}

impl ServiceSettings {
    pub fn from_config(config: &AppwriteConfig, poll: PollPolicy) -> Self {
        Self {
            bucket_id: config.bucket_id.clone(),
            database_id: config.database_id.clone(),
            collection_id: config.collection_id.clone(),
            function_id: config.function_id.clone(),
            poll,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&AppwriteConfig::default(), PollPolicy::default())
    }
}

/// Drives submissions against the three backend collaborators.
pub struct ProcessingService<S, D, F, Z> {
    storage: S,
    documents: D,
    functions: F,
    sleeper: Z,
    settings: ServiceSettings,
    new_id: fn() -> String,
}

#[cfg(feature = "cli")]
impl ProcessingService<AppwriteClient, AppwriteClient, AppwriteClient, TokioSleeper> {
    /// Service talking to Appwrite for all three collaborators.
    pub fn appwrite(client: AppwriteClient, poll: PollPolicy) -> Self {
        let settings = ServiceSettings::from_config(client.config(), poll);
        Self::new(client.clone(), client.clone(), client, TokioSleeper, settings)
    }
}

impl<S, D, F, Z> ProcessingService<S, D, F, Z>
where
    S: ObjectStorage,
    D: DocumentStore,
    F: FunctionRunner,
    Z: Sleeper,
{
    pub fn new(storage: S, documents: D, functions: F, sleeper: Z, settings: ServiceSettings) -> Self {
        Self {
            storage,
            documents,
            functions,
            sleeper,
            settings,
            new_id: crate::appwrite::unique_id,
        }
    }

    /// Replace the id generator used for new objects and records.
    pub fn with_id_generator(mut self, new_id: fn() -> String) -> Self {
        self.new_id = new_id;
        self
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Lightweight read against storage. Succeeds or fails, nothing else.
    pub async fn check_health(&self) -> ClientResult<()> {
        match self.storage.list_objects(&self.settings.bucket_id, 1).await {
            Ok(_) => {
                tracing::info!("Backend reachable");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                Err(ClientError::Connectivity(CONNECTIVITY_FAILURE.to_string()))
            }
        }
    }

    /// The methods the processing function understands.
    pub fn methods(&self) -> Vec<MethodInfo> {
        ProcessingMethod::catalogue()
    }

    /// Upload `file`, start processing with `method` and wait for the result.
    ///
    /// `on_progress` is called inline with non-decreasing percentages, ending
    /// at 100 on success.
    pub async fn submit_for_processing<P>(
        &self,
        file: &SelectedFile,
        method: ProcessingMethod,
        mut on_progress: P,
    ) -> ClientResult<ProcessingResult>
    where
        P: FnMut(Progress),
    {
        let settings = &self.settings;

        // Upload
        on_progress(Progress::new(progress::UPLOAD_STARTED, Stage::Uploading));
        tracing::info!(filename = %file.name, size = file.size, %method, "Uploading file");
        let upload = ObjectUpload {
            name: &file.name,
            content: &file.content,
            mime_type: file.upload_mime_type(),
        };
        let object = self
            .storage
            .create_object(&settings.bucket_id, &(self.new_id)(), upload)
            .await
            .map_err(|e| remote_failure("upload", e))?;
        on_progress(Progress::new(progress::UPLOADED, Stage::Uploaded));

        // Result record
        let fields = NewResultRecord::processing(&file.name, method, &object.id);
        let record = self
            .documents
            .create_record(&settings.database_id, &settings.collection_id, &(self.new_id)(), &fields)
            .await
            .map_err(|e| remote_failure("create record", e))?;
        on_progress(Progress::new(progress::RECORD_CREATED, Stage::RecordCreated));
        tracing::info!(file_id = %object.id, result_id = %record.id, "Result record created");

        // Trigger
        let payload = ProcessingPayload {
            file_id: object.id.clone(),
            method,
            result_id: record.id.clone(),
        };
        let execution = self
            .functions
            .invoke_async(&settings.function_id, &payload)
            .await
            .map_err(|e| remote_failure("trigger", e))?;
        on_progress(Progress::new(progress::TRIGGERED, Stage::Triggered));
        tracing::info!(execution_id = %execution.id, "Processing triggered");

        // Poll
        let max_attempts = settings.poll.max_attempts;
        for attempt in 1..=max_attempts {
            self.sleeper.sleep(settings.poll.interval).await;

            on_progress(Progress::new(
                polling_percent(attempt, max_attempts),
                Stage::Polling { attempt, max_attempts },
            ));

            let current = self
                .documents
                .get_record(&settings.database_id, &settings.collection_id, &record.id)
                .await
                .map_err(|e| remote_failure("poll", e))?;
            tracing::debug!(attempt, status = %current.status, "Polled result record");

            match current.status {
                RecordStatus::Completed => {
                    on_progress(Progress::new(progress::COMPLETED, Stage::Completed));
                    tracing::info!(result_id = %current.id, "Processing completed");
                    return Ok(completed_result(current, &object.id, &record.id));
                }
                RecordStatus::Failed => {
                    let message = current
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| GENERIC_PROCESSING_FAILURE.to_string());
                    tracing::warn!(result_id = %current.id, %message, "Processing failed");
                    return Err(ClientError::ProcessingFailed(message));
                }
                RecordStatus::Processing => {}
            }
        }

        tracing::warn!(result_id = %record.id, max_attempts, "Processing timed out");
        Err(ClientError::Timeout)
    }

    /// Prior result records, newest first.
    pub async fn list_results(&self, limit: u32) -> ClientResult<Vec<ResultRecord>> {
        self.documents
            .list_records(
                &self.settings.database_id,
                &self.settings.collection_id,
                &ListQuery::newest_first(limit),
            )
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to fetch history");
                ClientError::Remote(format!("Failed to fetch history: {}", e.user_message()))
            })
    }

    /// Delete the uploaded object, then its result record.
    ///
    /// There is no compensation: if the record deletion fails the object is
    /// already gone.
    pub async fn delete_result(&self, record_id: &str, file_id: &str) -> ClientResult<()> {
        let delete_failure = |e: BackendError| {
            tracing::warn!(record_id, file_id, error = %e, "Failed to delete result");
            ClientError::Remote(format!("Failed to delete result: {}", e.user_message()))
        };

        self.storage
            .delete_object(&self.settings.bucket_id, file_id)
            .await
            .map_err(delete_failure)?;
        self.documents
            .delete_record(&self.settings.database_id, &self.settings.collection_id, record_id)
            .await
            .map_err(delete_failure)?;

        tracing::info!(record_id, file_id, "Result deleted");
        Ok(())
    }
}

fn remote_failure(step: &str, err: BackendError) -> ClientError {
    tracing::warn!(step, error = %err, "Submission aborted");
    err.into()
}

fn completed_result(record: ResultRecord, file_id: &str, result_id: &str) -> ProcessingResult {
    ProcessingResult {
        dimensions: record.dimensions(),
        filename: record.filename,
        method: record.method,
        file_id: file_id.to_string(),
        result_id: result_id.to_string(),
    }
}
