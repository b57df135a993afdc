//! Integration tests for structure fetching against a stub prediction service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use variant_tracker::config::AppConfig;
use variant_tracker::server::{ApiServer, AppState};
use variant_tracker::store::Database;
use variant_tracker::structure::save_upload;

const PDB_CONTENTS: &str = "HEADER    BRCA1\nATOM      1  N   MET A   1\n";

/// Size of the oversized model served for `Q22222`.
const LARGE_MODEL_BYTES: usize = 8 * 1024;

#[derive(Clone)]
struct Stub {
    base: String,
    downloads: Arc<AtomicUsize>,
}

async fn prediction(State(stub): State<Stub>, Path(id): Path<String>) -> impl IntoResponse {
    match id.as_str() {
        "P38398" => (
            StatusCode::OK,
            Json(json!([{"entryId": "AF-P38398-F1", "pdbUrl": format!("{}/files/P38398.pdb", stub.base)}])),
        ),
        "Q00000" => (StatusCode::OK, Json(json!([{"entryId": "AF-Q00000-F1"}]))),
        "Q22222" => (
            StatusCode::OK,
            Json(json!([{"pdbUrl": format!("{}/files/large.pdb", stub.base)}])),
        ),
        "Q11111" => (
            StatusCode::OK,
            Json(json!([{"pdbUrl": format!("{}/files/gone.pdb", stub.base)}])),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"error": "not found"}))),
    }
}

async fn file(State(stub): State<Stub>, Path(name): Path<String>) -> impl IntoResponse {
    match name.as_str() {
        "P38398.pdb" => {
            stub.downloads.fetch_add(1, Ordering::SeqCst);
            (StatusCode::OK, PDB_CONTENTS.to_string())
        }
        "large.pdb" => (StatusCode::OK, "A".repeat(LARGE_MODEL_BYTES)),
        _ => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Start the stub prediction service and return its API base URL.
async fn start_stub(downloads: Arc<AtomicUsize>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let stub = Stub {
        base: base.clone(),
        downloads,
    };
    let app = Router::new()
        .route("/api/prediction/:id", get(prediction))
        .route("/files/:name", get(file))
        .with_state(stub);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("{base}/api")
}

struct Harness {
    base: String,
    db: Database,
    cancel: CancellationToken,
    client: reqwest::Client,
    downloads: Arc<AtomicUsize>,
    storage: tempfile::TempDir,
}

impl Harness {
    async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    async fn start_with(configure: impl FnOnce(&mut AppConfig)) -> Self {
        let downloads = Arc::new(AtomicUsize::new(0));
        let stub_url = start_stub(downloads.clone()).await;

        let storage = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.structures.base_url = stub_url;
        config.structures.storage_dir = storage.path().join("structures");
        config.structures.timeout_secs = 5;
        configure(&mut config);

        let db = Database::open_in_memory().await.unwrap();
        let state = AppState::new(db.clone(), &config).unwrap();
        let server = ApiServer::new(state, config.server.clone());
        let cancel = server.cancel_token();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(server.serve(listener));

        Self {
            base,
            db,
            cancel,
            client: reqwest::Client::new(),
            downloads,
            storage,
        }
    }

    async fn fetch(&self, id: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/api/structures/{id}/fetch", self.base))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[tokio::test]
async fn test_fetch_downloads_then_serves_cache() {
    let harness = Harness::start().await;

    let response = harness.fetch("P38398").await;
    assert_eq!(response.status(), 201);
    let structure: Value = response.json().await.unwrap();
    assert_eq!(structure["uniprotId"], "P38398");
    assert_eq!(structure["source"], "alphafold");
    assert!(structure["modelUrl"]
        .as_str()
        .unwrap()
        .ends_with("/files/P38398.pdb"));

    let path = harness.storage.path().join("structures").join("P38398.pdb");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), PDB_CONTENTS);

    let response = harness.fetch("P38398").await;
    assert_eq!(response.status(), 200);
    assert_eq!(harness.downloads.load(Ordering::SeqCst), 1);

    // One structure_fetched record plus one generic record per successful POST.
    for _ in 0..100 {
        if harness.db.count_audit_records().await.unwrap() >= 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let records = harness.db.list_audit_records(100, 0, None).await.unwrap();
    assert_eq!(
        records
            .iter()
            .filter(|r| r.action == "structure_fetched")
            .count(),
        1
    );
    assert_eq!(
        records
            .iter()
            .filter(|r| r.action == "POST /api/structures/P38398/fetch")
            .count(),
        2
    );
}

#[tokio::test]
async fn test_fetch_missing_model_is_bad_gateway() {
    let harness = Harness::start().await;
    let response = harness.fetch("Q00000").await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_fetch_unknown_accession_is_bad_gateway() {
    let harness = Harness::start().await;
    assert_eq!(harness.fetch("P99999").await.status(), 502);
}

#[tokio::test]
async fn test_fetch_failed_download_caches_nothing() {
    let harness = Harness::start().await;
    assert_eq!(harness.fetch("Q11111").await.status(), 502);
    assert!(harness.db.get_structure("Q11111").await.unwrap().is_none());
    assert!(!harness
        .storage
        .path()
        .join("structures")
        .join("Q11111.pdb")
        .exists());
}

#[tokio::test]
async fn test_fetch_invalid_id_is_rejected() {
    let harness = Harness::start().await;
    assert_eq!(harness.fetch("P38398-1").await.status(), 400);
    assert_eq!(harness.downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_model_is_rejected() {
    let harness = Harness::start_with(|config| {
        config.structures.max_model_bytes = 1024;
    })
    .await;

    let response = harness.fetch("Q22222").await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("exceeds 1024 bytes"));
    assert!(harness.db.get_structure("Q22222").await.unwrap().is_none());
}

#[tokio::test]
async fn test_model_within_limit_is_cached() {
    let harness = Harness::start_with(|config| {
        config.structures.max_model_bytes = LARGE_MODEL_BYTES;
    })
    .await;

    assert_eq!(harness.fetch("Q22222").await.status(), 201);
    let path = harness.storage.path().join("structures").join("Q22222.pdb");
    assert_eq!(std::fs::metadata(path).unwrap().len(), LARGE_MODEL_BYTES as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_of_uncached_accession_succeed() {
    let harness = Arc::new(Harness::start().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let harness = harness.clone();
        handles.push(tokio::spawn(async move {
            harness.fetch("P38398").await.status()
        }));
    }
    for handle in handles {
        let status = handle.await.unwrap();
        assert!(status == 200 || status == 201, "unexpected status {status}");
    }

    let path = harness.storage.path().join("structures").join("P38398.pdb");
    assert_eq!(std::fs::read_to_string(path).unwrap(), PDB_CONTENTS);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_of_same_accession_succeed() {
    let db = Database::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(dir.path().join("structures"));

    for round in 0..10u8 {
        let mut handles = Vec::new();
        for writer in 0..8u8 {
            let db = db.clone();
            let storage = storage.clone();
            let payload = vec![b'A' + writer; 200 * 1024 + usize::from(round)];
            handles.push(tokio::spawn(async move {
                save_upload(&db, &storage, "P38398", &payload).await
            }));
        }

        let mut failures = Vec::new();
        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                failures.push(e.to_string());
            }
        }
        assert!(failures.is_empty(), "round {round}: {failures:?}");

        // The file is one writer's payload in full, never a mix.
        let contents = std::fs::read(storage.join("P38398.pdb")).unwrap();
        assert_eq!(contents.len(), 200 * 1024 + usize::from(round));
        assert!(contents.iter().all(|b| *b == contents[0]));
    }

    let leftovers: Vec<_> = std::fs::read_dir(&*storage)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}
