//! End-to-end tests of the REST client and the submission flow.
//! An in-process axum server stands in for the Appwrite API.

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use plymeasure::appwrite::CHUNK_SIZE;
use plymeasure::{
    AppwriteClient, AppwriteConfig, ClientError, PollPolicy, ProcessingMethod, ProcessingService,
    SelectedFile, ServiceSettings, Sleeper,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Fake Appwrite
// ---------------------------------------------------------------------------

const BUCKET: &str = "ply-files";
const PROJECT: &str = "test-project";

struct FakeFile {
    id: String,
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct FakeAppwrite {
    files: Vec<FakeFile>,
    documents: Vec<Value>,
    executions: Vec<Value>,
    /// (Content-Range, X-Appwrite-ID) of every upload request.
    upload_headers: Vec<(Option<String>, Option<String>)>,
    record_reads: usize,
    /// Reads after which a triggered record turns `completed`.
    complete_after: Option<usize>,
    dimensions: (f64, f64, f64),
    projects_seen: Vec<String>,
    clock: u32,
}

type Shared = Arc<Mutex<FakeAppwrite>>;

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": message, "code": 404, "type": "not_found", "version": "1.5.7" })),
    )
        .into_response()
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn see_project(state: &mut FakeAppwrite, headers: &HeaderMap) {
    if let Some(project) = header(headers, "x-appwrite-project") {
        state.projects_seen.push(project);
    }
}

fn file_json(file: &FakeFile) -> Value {
    json!({
        "$id": file.id,
        "bucketId": BUCKET,
        "name": file.name,
        "mimeType": file.mime_type,
        "sizeOriginal": file.bytes.len(),
    })
}

async fn list_files(
    State(state): State<Shared>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = state.lock().unwrap();
    see_project(&mut state, &headers);
    if bucket != BUCKET {
        return not_found("Storage bucket with the requested ID could not be found.");
    }
    let files: Vec<Value> = state.files.iter().map(file_json).collect();
    Json(json!({ "total": files.len(), "files": files })).into_response()
}

async fn create_file(
    State(state): State<Shared>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut file_id = String::new();
    let mut name = String::new();
    let mut mime_type = String::new();
    let mut bytes = Vec::new();

    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("fileId") => file_id = field.text().await.unwrap(),
            Some("file") => {
                name = field.file_name().unwrap_or_default().to_string();
                mime_type = field.content_type().unwrap_or_default().to_string();
                bytes = field.bytes().await.unwrap().to_vec();
            }
            _ => {}
        }
    }

    let mut state = state.lock().unwrap();
    see_project(&mut state, &headers);
    if bucket != BUCKET {
        return not_found("Storage bucket with the requested ID could not be found.");
    }

    let range = header(&headers, "content-range");
    let assembled = header(&headers, "x-appwrite-id");
    state.upload_headers.push((range, assembled.clone()));

    let index = match assembled {
        Some(id) => match state.files.iter().position(|f| f.id == id) {
            Some(index) => {
                state.files[index].bytes.extend_from_slice(&bytes);
                index
            }
            None => return not_found("File with the requested ID could not be found."),
        },
        None => {
            state.files.push(FakeFile { id: file_id, name, mime_type, bytes });
            state.files.len() - 1
        }
    };

    (StatusCode::CREATED, Json(file_json(&state.files[index]))).into_response()
}

async fn delete_file(
    State(state): State<Shared>,
    Path((_bucket, file_id)): Path<(String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    match state.files.iter().position(|f| f.id == file_id) {
        Some(index) => {
            state.files.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found("File with the requested ID could not be found."),
    }
}

async fn create_document(
    State(state): State<Shared>,
    Path((_db, _collection)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    see_project(&mut state, &headers);
    state.clock += 1;

    let mut document = body["data"].clone();
    document["$id"] = body["documentId"].clone();
    document["$createdAt"] = json!(format!("2024-05-01T10:00:{:02}.000+00:00", state.clock));
    state.documents.push(document.clone());

    (StatusCode::CREATED, Json(document)).into_response()
}

async fn get_document(
    State(state): State<Shared>,
    Path((_db, _collection, id)): Path<(String, String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    state.record_reads += 1;
    let reads = state.record_reads;

    let triggered = state
        .executions
        .iter()
        .any(|e| e["payload"]["resultId"] == json!(id));
    let complete = triggered && state.complete_after.is_some_and(|n| reads >= n);
    let (width, length, height) = state.dimensions;

    match state.documents.iter_mut().find(|d| d["$id"] == json!(id)) {
        Some(document) => {
            if complete {
                document["status"] = json!("completed");
                document["width"] = json!(width);
                document["length"] = json!(length);
                document["height"] = json!(height);
            }
            Json(document.clone()).into_response()
        }
        None => not_found("Document with the requested ID could not be found."),
    }
}

async fn list_documents(
    State(state): State<Shared>,
    Path((_db, _collection)): Path<(String, String)>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let state = state.lock().unwrap();
    let mut limit = 25;
    let mut newest_first = false;
    for (key, value) in params.iter().filter(|(k, _)| k == "queries[]") {
        let query: Value = serde_json::from_str(value).unwrap();
        match query["method"].as_str() {
            Some("limit") => limit = query["values"][0].as_u64().unwrap() as usize,
            Some("orderDesc") => newest_first = query["attribute"] == "$createdAt",
            Some("orderAsc") => newest_first = false,
            _ => panic!("unexpected query {}: {}", key, value),
        }
    }

    let mut documents = state.documents.clone();
    documents.sort_by(|a, b| a["$createdAt"].as_str().cmp(&b["$createdAt"].as_str()));
    if newest_first {
        documents.reverse();
    }
    documents.truncate(limit);
    Json(json!({ "total": state.documents.len(), "documents": documents })).into_response()
}

async fn delete_document(
    State(state): State<Shared>,
    Path((_db, _collection, id)): Path<(String, String, String)>,
) -> Response {
    let mut state = state.lock().unwrap();
    match state.documents.iter().position(|d| d["$id"] == json!(id)) {
        Some(index) => {
            state.documents.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found("Document with the requested ID could not be found."),
    }
}

async fn create_execution(
    State(state): State<Shared>,
    Path(function_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    let payload: Value = serde_json::from_str(body["body"].as_str().unwrap()).unwrap();
    state.executions.push(json!({
        "functionId": function_id,
        "async": body["async"],
        "payload": payload,
    }));
    (
        StatusCode::ACCEPTED,
        Json(json!({ "$id": format!("exec-{}", state.executions.len()), "status": "waiting" })),
    )
        .into_response()
}

async fn spawn_fake(state: FakeAppwrite) -> (AppwriteClient, Shared) {
    let shared: Shared = Arc::new(Mutex::new(state));
    let app = Router::new()
        .route("/v1/storage/buckets/{bucket}/files", get(list_files).post(create_file))
        .route("/v1/storage/buckets/{bucket}/files/{file_id}", delete(delete_file))
        .route(
            "/v1/databases/{db}/collections/{collection}/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/databases/{db}/collections/{collection}/documents/{id}",
            get(get_document).delete(delete_document),
        )
        .route("/v1/functions/{function_id}/executions", post(create_execution))
        .layer(DefaultBodyLimit::max(4 * CHUNK_SIZE))
        .with_state(shared.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = AppwriteConfig::default()
        .with_endpoint(&format!("http://{}/v1", addr))
        .with_project(PROJECT);
    (AppwriteClient::new(config), shared)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}

type TestService = ProcessingService<AppwriteClient, AppwriteClient, AppwriteClient, InstantSleeper>;

fn service(client: &AppwriteClient) -> TestService {
    service_with(client, ServiceSettings::from_config(client.config(), PollPolicy::default()))
}

fn service_with(client: &AppwriteClient, settings: ServiceSettings) -> TestService {
    ProcessingService::new(client.clone(), client.clone(), client.clone(), InstantSleeper, settings)
}

fn ply_file(size: usize) -> SelectedFile {
    let mut content = b"ply\nformat binary_little_endian 1.0\nend_header\n".to_vec();
    content.resize(size.max(content.len()), 7);
    SelectedFile::new("scan.ply", content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_full_submission_round_trip() {
    let (client, state) = spawn_fake(FakeAppwrite {
        complete_after: Some(3),
        dimensions: (1.5, 2.5, 0.5),
        ..Default::default()
    })
    .await;

    let service = service(&client);
    service.check_health().await.unwrap();

    let mut percents = Vec::new();
    let result = service
        .submit_for_processing(&ply_file(1024), ProcessingMethod::Obb, |p| percents.push(p.percent))
        .await
        .unwrap();

    assert_eq!(result.filename, "scan.ply");
    assert_eq!(result.method, ProcessingMethod::Obb);
    assert_eq!(result.dimensions.width, 1.5);
    assert_eq!(result.dimensions.length, 2.5);
    assert_eq!(result.dimensions.height, 0.5);
    assert_eq!(percents.last(), Some(&100));

    let state = state.lock().unwrap();
    assert_eq!(state.record_reads, 3);
    assert_eq!(state.files.len(), 1);
    assert_eq!(state.files[0].id, result.file_id);
    assert_eq!(state.files[0].mime_type, "application/octet-stream");
    assert_eq!(state.documents.len(), 1);
    assert_eq!(state.documents[0]["fileId"], json!(result.file_id));
    assert_eq!(state.documents[0]["method"], "OBB");

    let execution = &state.executions[0];
    assert_eq!(execution["functionId"], "process-ply");
    assert_eq!(execution["async"], json!(true));
    assert_eq!(execution["payload"]["fileId"], json!(result.file_id));
    assert_eq!(execution["payload"]["resultId"], json!(result.result_id));
    assert_eq!(execution["payload"]["method"], "OBB");

    assert!(state.projects_seen.iter().all(|p| p == PROJECT));
    assert!(!state.projects_seen.is_empty());
}

#[tokio::test]
async fn test_large_file_is_uploaded_in_chunks() {
    let (client, state) = spawn_fake(FakeAppwrite {
        complete_after: Some(1),
        ..Default::default()
    })
    .await;

    let total = 2 * CHUNK_SIZE + 1000;
    let file = ply_file(total);
    let result = service(&client)
        .submit_for_processing(&file, ProcessingMethod::Aabb, |_| {})
        .await
        .unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.files.len(), 1);
    assert_eq!(state.files[0].bytes, file.content);
    assert_eq!(state.files[0].id, result.file_id);

    let ranges: Vec<String> = state
        .upload_headers
        .iter()
        .map(|(range, _)| range.clone().unwrap())
        .collect();
    assert_eq!(
        ranges,
        vec![
            format!("bytes 0-{}/{}", CHUNK_SIZE - 1, total),
            format!("bytes {}-{}/{}", CHUNK_SIZE, 2 * CHUNK_SIZE - 1, total),
            format!("bytes {}-{}/{}", 2 * CHUNK_SIZE, total - 1, total),
        ]
    );
    assert_eq!(state.upload_headers[0].1, None);
    assert_eq!(state.upload_headers[1].1.as_deref(), Some(result.file_id.as_str()));
    assert_eq!(state.upload_headers[2].1.as_deref(), Some(result.file_id.as_str()));
}

#[tokio::test]
async fn test_small_file_has_no_content_range() {
    let (client, state) = spawn_fake(FakeAppwrite {
        complete_after: Some(1),
        ..Default::default()
    })
    .await;

    service(&client)
        .submit_for_processing(&ply_file(64), ProcessingMethod::Pca, |_| {})
        .await
        .unwrap();

    let state = state.lock().unwrap();
    assert_eq!(state.upload_headers, vec![(None, None)]);
}

#[tokio::test]
async fn test_timeout_leaves_record_processing() {
    let (client, state) = spawn_fake(FakeAppwrite::default()).await;
    let settings = ServiceSettings::from_config(
        client.config(),
        PollPolicy { interval: Duration::from_secs(2), max_attempts: 4 },
    );

    let err = service_with(&client, settings)
        .submit_for_processing(&ply_file(64), ProcessingMethod::Aabb, |_| {})
        .await
        .unwrap_err();

    assert_eq!(err, ClientError::Timeout);
    let state = state.lock().unwrap();
    assert_eq!(state.record_reads, 4);
    assert_eq!(state.documents[0]["status"], "processing");
}

#[tokio::test]
async fn test_server_errors_are_mapped() {
    let (client, state) = spawn_fake(FakeAppwrite::default()).await;
    let mut settings = ServiceSettings::from_config(client.config(), PollPolicy::default());
    settings.bucket_id = "missing-bucket".to_string();
    let service = service_with(&client, settings);

    let health = service.check_health().await.unwrap_err();
    assert!(health.is_connectivity());

    let err = service
        .submit_for_processing(&ply_file(64), ProcessingMethod::Aabb, |_| {})
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ClientError::Remote("Storage bucket with the requested ID could not be found.".into())
    );

    // Nothing beyond the failed upload was attempted.
    let state = state.lock().unwrap();
    assert!(state.documents.is_empty());
    assert!(state.executions.is_empty());
}

#[tokio::test]
async fn test_transport_error_uses_transport_message() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AppwriteClient::new(AppwriteConfig::default().with_endpoint(&format!("http://{}/v1", addr)));
    let service = service(&client);

    assert!(service.check_health().await.unwrap_err().is_connectivity());

    let err = service
        .submit_for_processing(&ply_file(64), ProcessingMethod::Aabb, |_| {})
        .await
        .unwrap_err();
    match err {
        ClientError::Remote(message) => assert!(!message.is_empty()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_history_and_delete() {
    let (client, state) = spawn_fake(FakeAppwrite {
        complete_after: Some(1),
        ..Default::default()
    })
    .await;
    let service = service(&client);

    let mut results = Vec::new();
    for name in ["a.ply", "b.ply", "c.ply"] {
        let mut file = ply_file(64);
        file.name = name.to_string();
        results.push(
            service
                .submit_for_processing(&file, ProcessingMethod::Aabb, |_| {})
                .await
                .unwrap(),
        );
    }

    let history = service.list_results(2).await.unwrap();
    let names: Vec<&str> = history.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["c.ply", "b.ply"]);
    assert!(history.iter().all(|r| r.created_at.is_some()));

    let first = &results[0];
    service.delete_result(&first.result_id, &first.file_id).await.unwrap();
    {
        let state = state.lock().unwrap();
        assert_eq!(state.files.len(), 2);
        assert_eq!(state.documents.len(), 2);
        assert!(state.files.iter().all(|f| f.id != first.file_id));
    }

    let err = service.delete_result(&first.result_id, &first.file_id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to delete result: File with the requested ID could not be found."
    );
}
