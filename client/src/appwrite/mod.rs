//! Appwrite REST client.
//!
//! Implements the collaborator contracts of [`crate::backend`] against the
//! Appwrite HTTP API:
//!
//! | Contract | Method | Path |
//! |----------|--------|------|
//! | create object | POST | `/storage/buckets/{bucket}/files` (multipart) |
//! | list objects | GET | `/storage/buckets/{bucket}/files` |
//! | delete object | DELETE | `/storage/buckets/{bucket}/files/{id}` |
//! | create record | POST | `/databases/{db}/collections/{coll}/documents` |
//! | get record | GET | `/databases/{db}/collections/{coll}/documents/{id}` |
//! | list records | GET | `/databases/{db}/collections/{coll}/documents` |
//! | delete record | DELETE | `/databases/{db}/collections/{coll}/documents/{id}` |
//! | invoke function | POST | `/functions/{id}/executions` |
//!
//! Files above [`CHUNK_SIZE`] are uploaded in chunks, each request carrying a
//! `Content-Range` header and, after the first, the `X-Appwrite-ID` of the
//! object being assembled.

use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::backend::{DocumentStore, FunctionRunner, ListQuery, ObjectStorage, ObjectUpload};
use crate::config::AppwriteConfig;
use crate::error::{BackendError, BackendResult};
use crate::models::{Execution, NewResultRecord, ProcessingPayload, ResultRecord, StoredObject};

/// Largest upload sent in a single request.
pub const CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Response format the models are written against.
const RESPONSE_FORMAT: &str = "1.5.0";

/// Error body returned by Appwrite on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<StoredObject>,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<ResultRecord>,
}

/// REST client for one Appwrite project.
#[derive(Debug, Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    config: AppwriteConfig,
}

impl AppwriteClient {
    pub fn new(config: AppwriteConfig) -> Self {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Use a preconfigured `reqwest` client (proxies, timeouts, ...).
    pub fn with_http_client(http: reqwest::Client, config: AppwriteConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &AppwriteConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    /// Request with the project headers set.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT);

        match &self.config.api_key {
            Some(key) => builder.header("X-Appwrite-Key", key),
            None => builder,
        }
    }

    async fn upload_chunk(
        &self,
        path: &str,
        object_id: &str,
        upload: &ObjectUpload<'_>,
        range: Option<(usize, usize)>,
        assembled_id: Option<&str>,
    ) -> BackendResult<StoredObject> {
        let (start, end) = range.unwrap_or((0, upload.content.len()));
        let part = Part::bytes(upload.content[start..end].to_vec())
            .file_name(upload.name.to_string())
            .mime_str(upload.mime_type)?;
        let form = Form::new().text("fileId", object_id.to_string()).part("file", part);

        let mut request = self.request(Method::POST, path);
        if range.is_some() {
            request = request.header("Content-Range", content_range(start, end, upload.content.len()));
        }
        if let Some(id) = assembled_id {
            request = request.header("X-Appwrite-ID", id);
        }

        let response = request.multipart(form).send().await?;
        read_json(response).await
    }
}

impl ObjectStorage for AppwriteClient {
    async fn create_object(
        &self,
        bucket: &str,
        object_id: &str,
        upload: ObjectUpload<'_>,
    ) -> BackendResult<StoredObject> {
        let path = format!("/storage/buckets/{}/files", bucket);
        let total = upload.content.len();

        if total <= CHUNK_SIZE {
            return self.upload_chunk(&path, object_id, &upload, None, None).await;
        }

        let mut stored: Option<StoredObject> = None;
        let mut start = 0;
        while start < total {
            let end = (start + CHUNK_SIZE).min(total);
            tracing::debug!(object_id, start, end, total, "Uploading chunk");
            let assembled_id = stored.as_ref().map(|s| s.id.clone());
            let chunk = self
                .upload_chunk(&path, object_id, &upload, Some((start, end)), assembled_id.as_deref())
                .await?;
            stored = Some(chunk);
            start = end;
        }

        stored.ok_or_else(|| BackendError::Decode("chunked upload produced no object".to_string()))
    }

    async fn delete_object(&self, bucket: &str, object_id: &str) -> BackendResult<()> {
        let path = format!("/storage/buckets/{}/files/{}", bucket, object_id);
        let response = self.request(Method::DELETE, &path).send().await?;
        read_empty(response).await
    }

    async fn list_objects(&self, bucket: &str, limit: u32) -> BackendResult<Vec<StoredObject>> {
        let path = format!("/storage/buckets/{}/files", bucket);
        let response = self
            .request(Method::GET, &path)
            .query(&[("queries[]", limit_query(limit))])
            .send()
            .await?;
        let list: FileList = read_json(response).await?;
        Ok(list.files)
    }
}

impl DocumentStore for AppwriteClient {
    async fn create_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
        fields: &NewResultRecord,
    ) -> BackendResult<ResultRecord> {
        let path = documents_path(database, collection);
        let body = json!({
            "documentId": record_id,
            "data": fields,
        });
        let response = self.request(Method::POST, &path).json(&body).send().await?;
        read_json(response).await
    }

    async fn get_record(
        &self,
        database: &str,
        collection: &str,
        record_id: &str,
    ) -> BackendResult<ResultRecord> {
        let path = format!("{}/{}", documents_path(database, collection), record_id);
        let response = self.request(Method::GET, &path).send().await?;
        read_json(response).await
    }

    async fn list_records(
        &self,
        database: &str,
        collection: &str,
        query: &ListQuery,
    ) -> BackendResult<Vec<ResultRecord>> {
        let path = documents_path(database, collection);
        let response = self
            .request(Method::GET, &path)
            .query(&[
                ("queries[]", order_query(query.newest_first)),
                ("queries[]", limit_query(query.limit)),
            ])
            .send()
            .await?;
        let list: DocumentList = read_json(response).await?;
        Ok(list.documents)
    }

    async fn delete_record(&self, database: &str, collection: &str, record_id: &str) -> BackendResult<()> {
        let path = format!("{}/{}", documents_path(database, collection), record_id);
        let response = self.request(Method::DELETE, &path).send().await?;
        read_empty(response).await
    }
}

impl FunctionRunner for AppwriteClient {
    async fn invoke_async(&self, function_id: &str, payload: &ProcessingPayload) -> BackendResult<Execution> {
        let path = format!("/functions/{}/executions", function_id);
        let body = json!({
            "body": serde_json::to_string(payload)?,
            "async": true,
        });
        let response = self.request(Method::POST, &path).json(&body).send().await?;
        read_json(response).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Fresh 20-character object id: timestamp in hex followed by random hex.
pub fn unique_id() -> String {
    let now = chrono::Utc::now();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{:08x}{:05x}{}",
        now.timestamp(),
        now.timestamp_subsec_micros(),
        &random[..7]
    )
}

fn documents_path(database: &str, collection: &str) -> String {
    format!("/databases/{}/collections/{}/documents", database, collection)
}

fn content_range(start: usize, end: usize, total: usize) -> String {
    format!("bytes {}-{}/{}", start, end - 1, total)
}

fn limit_query(limit: u32) -> String {
    json!({ "method": "limit", "values": [limit] }).to_string()
}

fn order_query(newest_first: bool) -> String {
    let method = if newest_first { "orderDesc" } else { "orderAsc" };
    json!({ "method": method, "attribute": "$createdAt" }).to_string()
}

/// Server-supplied message of an error body, or the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

async fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let response = check_status(response).await?;
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

async fn read_empty(response: Response) -> BackendResult<()> {
    check_status(response).await.map(|_| ())
}
