//! Contracts toward the backend collaborators.
//!
//! The client never implements storage, documents or functions itself; it
//! talks to them through these traits:
//!
//! - [`ObjectStorage`] - opaque blobs addressed by bucket and id
//! - [`DocumentStore`] - result records in a database collection
//! - [`FunctionRunner`] - asynchronous invocation of the processing function
//! - [`Sleeper`] - the wait between two polls
//!
//! [`crate::appwrite::AppwriteClient`] implements the first three over REST.
//! The traits are used through generics only, so their futures need not be
//! `Send` and the same code runs on tokio and in the browser.

#![allow(async_fn_in_trait)]

use std::time::Duration;

use crate::error::BackendResult;
use crate::models::{Execution, NewResultRecord, ProcessingPayload, ResultRecord, StoredObject};

/// Content handed to [`ObjectStorage::create_object`].
#[derive(Debug, Clone, Copy)]
pub struct ObjectUpload<'a> {
    pub name: &'a str,
    pub content: &'a [u8],
    pub mime_type: &'a str,
}

/// Object storage.
pub trait ObjectStorage {
    /// Store `upload` under `object_id` in `bucket`.
    async fn create_object(
        &self,
        bucket: &str,
        object_id: &str,
        upload: ObjectUpload<'_>,
    ) -> BackendResult<StoredObject>;

    async fn delete_object(&self, bucket: &str, object_id: &str) -> BackendResult<()>;

    /// List at most `limit` objects of `bucket`.
    async fn list_objects(&self, bucket: &str, limit: u32) -> BackendResult<Vec<StoredObject>>;
}

/// Order and size of a record listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Newest first when true.
    pub newest_first: bool,
    pub limit: u32,
}

impl ListQuery {
    pub fn newest_first(limit: u32) -> Self {
        Self { newest_first: true, limit }
    }
}

/// Document store holding result records.
pub trait DocumentStore {
    async fn create_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
        fields: &NewResultRecord,
    ) -> BackendResult<ResultRecord>;

    async fn get_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
    ) -> BackendResult<ResultRecord>;

    async fn list_records(
        &self,
        database: &str,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<Vec<ResultRecord>>;

    async fn delete_record(&self, database: &str, collection: &str, record_id: &str) -> BackendResult<()>;
}

/// Serverless function execution.
pub trait FunctionRunner {
    /// Start the function without waiting for it to finish.
    async fn invoke_async(&self, function_id: &str, payload: &ProcessingPayload) -> BackendResult<Execution>;
}

/// Suspends the polling flow between two reads.
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by the tokio timer.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[cfg(feature = "cli")]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

impl<T: ObjectStorage> ObjectStorage for &T {
    async fn create_object(
        &self,
        bucket: &str,
        object_id: &str,
        upload: ObjectUpload<'_>,
    ) -> BackendResult<StoredObject> {
        (**self).create_object(bucket, object_id, upload).await
    }

    async fn delete_object(&self, bucket: &str, object_id: &str) -> BackendResult<()> {
        (**self).delete_object(bucket, object_id).await
    }

    async fn list_objects(&self, bucket: &str, limit: u32) -> BackendResult<Vec<StoredObject>> {
        (**self).list_objects(bucket, limit).await
    }
}

impl<T: DocumentStore> DocumentStore for &T {
    async fn create_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
        fields: &NewResultRecord,
    ) -> BackendResult<ResultRecord> {
        (**self).create_record(database, collection, record_id, fields).await
    }

    async fn get_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
    ) -> BackendResult<ResultRecord> {
        (**self).get_record(database, collection, record_id).await
    }

    async fn list_records(
        &self,
        database: &str,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<Vec<ResultRecord>> {
        (**self).list_records(database, collection, query).await
    }

    async fn delete_record(&self, database: &str, collection: &str, record_id: &str) -> BackendResult<()> {
        (**self).delete_record(database, collection, record_id).await
    }
}

impl<T: FunctionRunner> FunctionRunner for &T {
    async fn invoke_async(&self, function_id: &str, payload: &ProcessingPayload) -> BackendResult<Execution> {
        (**self).invoke_async(function_id, payload).await
    }
}

impl<T: Sleeper> Sleeper for &T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await
    }
}
