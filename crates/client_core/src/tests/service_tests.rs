use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::protocol::{ServiceReply, DEFAULT_MAX_RESULTS};
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::results::{canned_script_path, raw_record_path};

#[derive(Clone, Default)]
struct ServerState {
    bodies: Arc<Mutex<Vec<(String, Value)>>>,
}

impl ServerState {
    async fn record(&self, route: &str, body: Value) {
        self.bodies.lock().await.push((route.to_string(), body));
    }
}

async fn handle_search(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.record("search", body).await;
    Json(json!({
        "success": true,
        "count": 1,
        "results": [{
            "PDB_ID": "1ABC",
            "Title": "Lysozyme",
            "Resolution": 1.5,
            "Experimental_Method": "X-RAY DIFFRACTION",
            "Release_Date": "1999-01-01",
            "Organism": "Gallus gallus"
        }]
    }))
}

async fn handle_create_session(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.record("create_alignment_session", body).await;
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": "select at least 2 structures"})),
    )
}

async fn handle_export_script() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>")
}

async fn handle_launch(State(state): State<ServerState>, Json(body): Json<Value>) -> Json<Value> {
    state.record("launch_alignment", body).await;
    Json(json!({"success": true, "message": "started"}))
}

async fn handle_open(Path(id): Path<String>) -> Json<Value> {
    Json(json!({"success": true, "message": format!("opened {id}")}))
}

async fn handle_download(Path(id): Path<String>) -> String {
    format!("HEADER {id}")
}

async fn handle_canned_script(Path(id): Path<String>) -> String {
    format!("fetch {id}")
}

async fn spawn_service_server() -> anyhow::Result<(String, ServerState)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = ServerState::default();
    let app = Router::new()
        .route("/api/search", post(handle_search))
        .route("/api/create_alignment_session", post(handle_create_session))
        .route("/api/align_pymol", post(handle_export_script))
        .route("/api/launch_alignment", post(handle_launch))
        .route("/api/open_pymol/:id", get(handle_open))
        .route("/api/download_pdb/:id", get(handle_download))
        .route("/api/pymol_script/:id", get(handle_canned_script))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/api"), state))
}

#[tokio::test]
async fn search_posts_tagged_query_and_parses_records() {
    let (server_url, state) = spawn_service_server().await.expect("spawn server");
    let service = HttpStructureService::new(&server_url).expect("service");

    let reply = service
        .search(&SearchQuery::Keyword {
            keyword: "lysozyme".into(),
            max_results: DEFAULT_MAX_RESULTS,
        })
        .await
        .expect("search");

    assert!(reply.success);
    assert_eq!(reply.results[0].identifier, Identifier::from("1ABC"));
    let bodies = state.bodies.lock().await;
    assert_eq!(
        bodies[0],
        (
            "search".to_string(),
            json!({"search_type": "keyword", "keyword": "lysozyme", "max_results": 10})
        )
    );
}

#[tokio::test]
async fn error_status_with_json_body_is_an_application_reply() {
    let (server_url, state) = spawn_service_server().await.expect("spawn server");
    let service = HttpStructureService::new(&server_url).expect("service");

    let reply = service
        .create_alignment_session(&AlignmentRequest {
            pdb_ids: vec![Identifier::from("1ABC"), Identifier::from("2xyz")],
        })
        .await
        .expect("well-formed reply");
    let failure = reply.into_result().expect_err("application failure");
    assert_eq!(failure.message, "select at least 2 structures");
    assert_eq!(
        state.bodies.lock().await[0].1,
        json!({"pdb_ids": ["1ABC", "2xyz"]})
    );
}

#[tokio::test]
async fn unparsable_body_is_a_transport_error() {
    let (server_url, _state) = spawn_service_server().await.expect("spawn server");
    let service = HttpStructureService::new(&server_url).expect("service");

    let err = service
        .export_alignment_script(&AlignmentRequest {
            pdb_ids: vec![Identifier::from("1ABC"), Identifier::from("2XYZ")],
        })
        .await
        .expect_err("unparsable");
    assert!(format!("{err:#}").contains("unparsable reply"));
}

#[tokio::test]
async fn record_endpoints_and_file_downloads_use_the_identifier_path() {
    let (server_url, state) = spawn_service_server().await.expect("spawn server");
    let service = HttpStructureService::new(&server_url).expect("service");

    let opened = service
        .open_single_record(&Identifier::from("3PEL"))
        .await
        .expect("open");
    assert_eq!(opened.message.as_deref(), Some("opened 3PEL"));

    let bytes = service.fetch_file("download_pdb/2PGH").await.expect("download");
    assert_eq!(bytes, b"HEADER 2PGH");

    let launched = service
        .launch_prepared_script(&LaunchScriptRequest {
            script_filename: "align.pml".into(),
        })
        .await
        .expect("launch");
    assert!(launched.success);
    assert_eq!(
        state.bodies.lock().await[0].1,
        json!({"script_filename": "align.pml"})
    );
}

#[tokio::test]
async fn record_file_links_keep_the_server_path_prefix() {
    let (server_url, _state) = spawn_service_server().await.expect("spawn server");
    let service = HttpStructureService::new(&server_url).expect("service");
    let id = Identifier::from("4HHB");

    let raw = service
        .fetch_file(&raw_record_path(&id))
        .await
        .expect("raw record");
    assert_eq!(raw, b"HEADER 4HHB");

    let script = service
        .fetch_file(&canned_script_path(&id))
        .await
        .expect("canned script");
    assert_eq!(script, b"fetch 4HHB");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let service = HttpStructureService::new(&format!("http://{addr}")).expect("service");
    let err = service
        .search(&SearchQuery::Id {
            pdb_id: "1ABC".into(),
        })
        .await
        .expect_err("refused");
    assert!(format!("{err:#}").contains("request to"));
}

#[test]
fn base_url_gains_trailing_slash_and_resolves_server_links() {
    let service = HttpStructureService::new("http://localhost:5000/app").expect("service");
    assert_eq!(service.base_url().as_str(), "http://localhost:5000/app/");
    assert_eq!(
        service.resolve("search").expect("join").as_str(),
        "http://localhost:5000/app/search"
    );
    assert_eq!(
        service
            .resolve(&raw_record_path(&Identifier::from("1ABC")))
            .expect("join")
            .as_str(),
        "http://localhost:5000/app/download_pdb/1ABC"
    );
    assert_eq!(
        service.resolve("/download_session/s.pse").expect("join").as_str(),
        "http://localhost:5000/download_session/s.pse"
    );
    assert!(HttpStructureService::new("not a url").is_err());
}
