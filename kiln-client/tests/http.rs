//! HTTP client tests against an in-process fake machine

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::Json;
use kiln_client::{ClientError, JobOrchestrator, MachineClient, PollConfig};
use kiln_core::{Priority, TaskState};
use serde_json::{Value, json};
use tokio::net::TcpListener;

const CLIENT: &str = "client-a";

#[derive(Default)]
struct Machine {
    orders: Vec<Value>,
    /// `{jobId}/{path}` → contents
    files: HashMap<String, Vec<u8>>,
    started: Vec<String>,
    deleted: Vec<String>,
}

type Shared = Arc<Mutex<Machine>>;

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn machine_router(state: Shared) -> Router {
    Router::new()
        .route("/machine", get(machine_info))
        .route("/recipes", get(list_recipes))
        .route("/recipes/{recipe_id}", get(get_recipe))
        .route("/job", post(create_job))
        .route(
            "/clients/{client_id}/jobs/{job_id}",
            get(get_job).delete(delete_job),
        )
        .route("/clients/{client_id}/jobs/{job_id}/report", get(get_report))
        .route("/clients/{client_id}/jobs/{job_id}/run", patch(run_job))
        .route("/{job_id}/{*path}", get(get_file).put(put_file))
        .with_state(state)
}

// =============================================================================
// Fake Machine Handlers
// =============================================================================

async fn machine_info() -> Json<Value> {
    Json(json!({
        "version": "2.4.1",
        "uptime": 3600.5,
        "jobs": { "total": 3, "waiting": 1, "running": 1 },
        "hostname": "scanner-01"
    }))
}

async fn list_recipes() -> Json<Value> {
    Json(json!([
        { "id": "inspect-mesh", "name": "Inspect Mesh", "version": "1.2.0" },
        { "id": "decimate", "name": "Decimate", "description": "Reduce face count" }
    ]))
}

async fn get_recipe(Path(recipe_id): Path<String>) -> Result<Json<Value>, (StatusCode, String)> {
    match recipe_id.as_str() {
        "inspect-mesh" => Ok(Json(json!({
            "id": "inspect-mesh",
            "name": "Inspect Mesh",
            "parameterSchema": {
                "type": "object",
                "properties": {
                    "meshFile": { "type": "string", "format": "file" },
                    "quality": { "type": "integer", "default": 3 }
                },
                "required": ["meshFile"]
            }
        }))),
        "broken" => Ok(Json(json!({
            "id": "broken",
            "name": "Broken",
            "parameterSchema": {
                "type": "object",
                "properties": {},
                "required": ["ghost"]
            }
        }))),
        _ => Err((StatusCode::NOT_FOUND, format!("unknown recipe {recipe_id}"))),
    }
}

async fn create_job(State(state): State<Shared>, Json(order): Json<Value>) -> StatusCode {
    state.lock().unwrap().orders.push(order);
    StatusCode::CREATED
}

async fn get_job(
    State(state): State<Shared>,
    Path((client_id, job_id)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let machine = state.lock().unwrap();
    let known = machine
        .orders
        .iter()
        .any(|order| order["id"] == job_id.as_str() && order["clientId"] == client_id.as_str());
    if !known {
        return Err((StatusCode::NOT_FOUND, format!("no job {job_id}")));
    }

    let state = if machine.started.contains(&job_id) { "done" } else { "created" };
    Ok(Json(json!({
        "id": job_id,
        "name": "Bunny scan",
        "clientId": client_id,
        "recipe": { "id": "inspect-mesh", "name": "Inspect Mesh" },
        "priority": "normal",
        "submission": "2024-05-01T10:00:00Z",
        "start": "",
        "end": "",
        "duration": 0.0,
        "state": state,
        "step": "",
        "error": ""
    })))
}

async fn get_report(Path((_client_id, job_id)): Path<(String, String)>) -> Json<Value> {
    Json(json!({
        "id": job_id,
        "clientId": CLIENT,
        "recipe": { "id": "inspect-mesh", "name": "Inspect Mesh" },
        "state": "done",
        "steps": {
            "inspect": {
                "tool": "Meshlab",
                "state": "done",
                "start": "2024-05-01T10:00:01Z",
                "end": "2024-05-01T10:00:09Z",
                "duration": 8.0,
                "result": { "inspection": { "holes": 0 } }
            },
            "delivery": {
                "tool": "Delivery",
                "state": "done",
                "result": { "files": { "report": "out/report.json" } }
            }
        }
    }))
}

async fn run_job(
    State(state): State<Shared>,
    Path((_client_id, job_id)): Path<(String, String)>,
) -> StatusCode {
    let mut machine = state.lock().unwrap();
    machine.started.push(job_id.clone());
    machine
        .files
        .insert(format!("{job_id}/out/report.json"), br#"{"holes":0}"#.to_vec());
    StatusCode::NO_CONTENT
}

async fn delete_job(
    State(state): State<Shared>,
    Path((_client_id, job_id)): Path<(String, String)>,
) -> StatusCode {
    state.lock().unwrap().deleted.push(job_id);
    StatusCode::NO_CONTENT
}

async fn put_file(
    State(state): State<Shared>,
    Path((job_id, path)): Path<(String, String)>,
    body: Bytes,
) -> StatusCode {
    state
        .lock()
        .unwrap()
        .files
        .insert(format!("{job_id}/{path}"), body.to_vec());
    StatusCode::CREATED
}

async fn get_file(
    State(state): State<Shared>,
    Path((job_id, path)): Path<(String, String)>,
) -> Result<Vec<u8>, StatusCode> {
    state
        .lock()
        .unwrap()
        .files
        .get(&format!("{job_id}/{path}"))
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

async fn start() -> (Shared, MachineClient) {
    let state = Shared::default();
    let url = serve(machine_router(Arc::clone(&state))).await;
    (state, MachineClient::new(url, CLIENT))
}

// =============================================================================
// Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_machine_info() {
    let (_, client) = start().await;

    let info = client.machine_info().await.unwrap();

    assert_eq!(info.version.as_deref(), Some("2.4.1"));
    assert_eq!(info.jobs.unwrap().running, 1);
    assert_eq!(info.extra["hostname"], "scanner-01");
}

#[tokio::test]
async fn test_recipes() {
    let (_, client) = start().await;

    let recipes = client.list_recipes().await.unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[1].description, "Reduce face count");

    let recipe = client.get_recipe("inspect-mesh").await.unwrap();
    let files: Vec<&str> = recipe.parameter_schema.file_properties().collect();
    assert_eq!(files, vec!["meshFile"]);
    assert!(recipe.parameter_schema.is_required("meshFile"));
}

#[tokio::test]
async fn test_recipe_with_inconsistent_schema_fails_to_parse() {
    let (_, client) = start().await;

    let err = client.get_recipe("broken").await.unwrap_err();

    assert!(matches!(err, ClientError::ParseError(_)), "{err:?}");
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let (_, client) = start().await;

    let err = client.get_job("nope").await.unwrap_err();

    assert!(err.is_not_found());
    match err {
        ClientError::ApiError {
            status,
            reason,
            message,
        } => {
            assert_eq!(status, 404);
            assert_eq!(reason, "Not Found");
            assert_eq!(message, "no job nope");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_machine_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = MachineClient::new(format!("http://{addr}"), CLIENT);

    let err = client.get_job("job-1").await.unwrap_err();

    assert!(matches!(err, ClientError::RequestFailed(_)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_create_job_sends_order_and_lookups_are_client_scoped() {
    let (state, client) = start().await;
    let order = kiln_core::JobOrder::new(CLIENT, "inspect-mesh")
        .with_id("job-1")
        .with_name("Bunny scan")
        .with_priority(Priority::High)
        .with_parameter("meshFile", json!("bunny.obj"));

    client.create_job(&order).await.unwrap();

    {
        let machine = state.lock().unwrap();
        let sent = &machine.orders[0];
        assert_eq!(sent["id"], "job-1");
        assert_eq!(sent["clientId"], CLIENT);
        assert_eq!(sent["recipeId"], "inspect-mesh");
        assert_eq!(sent["priority"], "high");
        assert_eq!(sent["parameters"]["meshFile"], "bunny.obj");
        assert!(sent["submission"].is_string());
    }

    let info = client.get_job("job-1").await.unwrap();
    assert_eq!(info.state, TaskState::Created);
    assert_eq!(info.recipe.id, "inspect-mesh");
    assert!(info.start.is_none());
    assert!(info.submission.is_some());

    let stranger = MachineClient::new(client.base_url(), "client-b");
    assert!(stranger.get_job("job-1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_upload_and_download_stream_file_contents() {
    let (state, client) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan.obj");
    std::fs::write(&source, "v 1 2 3\nf 1 1 1\n").unwrap();

    client.upload_file("job-1", "scan.obj", &source).await.unwrap();
    assert_eq!(
        state.lock().unwrap().files["job-1/scan.obj"],
        b"v 1 2 3\nf 1 1 1\n".to_vec()
    );

    let target = dir.path().join("nested/copy/scan.obj");
    client.download_file("job-1", "scan.obj", &target).await.unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "v 1 2 3\nf 1 1 1\n");
}

#[tokio::test]
async fn test_file_names_with_reserved_characters_keep_their_name() {
    let (state, client) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("scan#1.obj");
    std::fs::write(&source, "v 1 2 3\n").unwrap();

    client.upload_file("job-1", "scan#1.obj", &source).await.unwrap();
    client
        .upload_file("job-1", "out/mesh?v=2.obj", &source)
        .await
        .unwrap();

    {
        let machine = state.lock().unwrap();
        let mut stored: Vec<&String> = machine.files.keys().collect();
        stored.sort();
        assert_eq!(stored, vec!["job-1/out/mesh?v=2.obj", "job-1/scan#1.obj"]);
    }

    let target = dir.path().join("copy/scan#1.obj");
    client.download_file("job-1", "scan#1.obj", &target).await.unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "v 1 2 3\n");
}

#[tokio::test]
async fn test_download_of_missing_file_fails() {
    let (_, client) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing.obj");

    let err = client.download_file("job-1", "missing.obj", &target).await.unwrap_err();

    assert!(err.is_not_found());
    assert!(!target.exists());
}

#[tokio::test]
async fn test_upload_of_unreadable_file_is_io_error() {
    let (_, client) = start().await;
    let dir = tempfile::tempdir().unwrap();

    let err = client
        .upload_file("job-1", "scan.obj", &dir.path().join("nope.obj"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Io { .. }));
}

// =============================================================================
// Full Lifecycle
// =============================================================================

#[tokio::test]
async fn test_submit_run_and_fetch_over_http() {
    let (state, client) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let mesh = dir.path().join("bunny.obj");
    std::fs::write(&mesh, "v 0 0 0\n").unwrap();

    let recipe = client.get_recipe("inspect-mesh").await.unwrap();
    let poll = PollConfig {
        create_interval: Duration::from_millis(10),
        create_timeout: Duration::from_millis(500),
        done_interval: Duration::from_millis(10),
    };
    let orchestrator = JobOrchestrator::new(Arc::new(client), poll).unwrap();

    let order = orchestrator
        .new_order(&recipe.id)
        .with_parameter("meshFile", json!(mesh.to_str().unwrap()));
    let submission = orchestrator.submit(&recipe, order).await.unwrap();
    let job_id = submission.job_id.clone();

    assert_eq!(submission.uploaded, vec![mesh]);
    assert!(
        state
            .lock()
            .unwrap()
            .files
            .contains_key(&format!("{job_id}/bunny.obj"))
    );

    orchestrator.run_job(&job_id).await.unwrap();
    let results = dir.path().join("results");
    let files = orchestrator
        .wait_fetch_result_files(&job_id, &results)
        .await
        .unwrap();

    assert_eq!(files, vec![results.join("out/report.json")]);
    assert_eq!(std::fs::read_to_string(&files[0]).unwrap(), r#"{"holes":0}"#);

    orchestrator.delete_job(&job_id).await.unwrap();
    assert_eq!(state.lock().unwrap().deleted, vec![job_id]);
}
