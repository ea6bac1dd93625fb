//! Report loading over real HTTP against a local canned-response server

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Router;
use footprint::chart::ChartJsRenderer;
use footprint::config::StoreConfig;
use footprint::session::{LoadOutcome, SelectionOutcome, Session};
use footprint::source::{HttpSource, ReportSource};
use footprint::store::ReportStore;
use footprint::{Error, MetricKind};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

const SNAPSHOT: &str = r#"{
    "binary_size": [
        {"language": "go", "arch": "amd64", "version": "1.22", "value": 1800},
        {"language": "go", "arch": "arm64", "version": "1.22", "value": 1700},
        {"language": "rust", "arch": "amd64", "version": "1.78", "value": 900}
    ],
    "memory_usage": [
        {"language": "go", "arch": "amd64", "version": "1.22", "value": 1200},
        {"language": "rust", "arch": "arm64", "version": "1.78", "value": 1100}
    ]
}"#;

struct TestServer {
    base: Url,
    hits: Arc<AtomicUsize>,
}

struct Canned {
    routes: HashMap<&'static str, (u16, String)>,
    hits: Arc<AtomicUsize>,
}

async fn canned(State(canned): State<Arc<Canned>>, uri: Uri) -> (StatusCode, String) {
    canned.hits.fetch_add(1, Ordering::SeqCst);
    match canned.routes.get(uri.path()) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body.clone(),
        ),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Serve `routes` (path -> (status, body)) until the test ends
async fn serve(routes: HashMap<&'static str, (u16, String)>) -> TestServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let state = Arc::new(Canned {
        routes,
        hits: Arc::clone(&hits),
    });
    // Snapshot keys carry ':' so paths are matched in the fallback, not as routes
    let app = Router::new().fallback(canned).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: Url::parse(&format!("http://{}/site/", addr)).unwrap(),
        hits,
    }
}

fn session(server: &TestServer) -> Session<HttpSource, ChartJsRenderer> {
    let source = HttpSource::new(server.base.clone(), None).unwrap();
    Session::new(
        ReportStore::new(source, StoreConfig::default()),
        ChartJsRenderer::default(),
    )
}

#[tokio::test]
async fn test_index_500_leaves_selector_empty() {
    let server = serve(HashMap::from([(
        "/site/reports.json",
        (500, "boom".to_string()),
    )]))
    .await;
    let session = session(&server);

    match session.load().await {
        LoadOutcome::IndexFailed { error } => assert!(error.contains("500")),
        other => panic!("expected index failure, got {:?}", other),
    }
    assert!(session.store().options().is_empty());
    assert!(session.board().is_empty());
}

#[tokio::test]
async fn test_lazy_index_over_http() {
    let server = serve(HashMap::from([
        (
            "/site/reports.json",
            (200, r#"["2024-06-01T00:00:00Z"]"#.to_string()),
        ),
        ("/site/reports/latest.json", (200, SNAPSHOT.to_string())),
        (
            "/site/reports/2024-06-01T00:00:00Z.json",
            (200, SNAPSHOT.to_string()),
        ),
    ]))
    .await;
    let session = session(&server);

    let outcome = session.load().await;
    assert!(matches!(
        outcome,
        LoadOutcome::Loaded {
            selection: SelectionOutcome::Applied { .. },
            ..
        }
    ));
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);

    let labels = session
        .board()
        .chart(MetricKind::BinarySize.chart_target())
        .unwrap()
        .config["data"]["labels"]
        .clone();
    assert_eq!(labels, serde_json::json!([["rust", "1.78"], ["go", "1.22"]]));

    // Reselecting latest is served from cache
    session.select("latest").await;
    assert_eq!(server.hits.load(Ordering::SeqCst), 2);

    session.select("2024-06-01T00:00:00Z").await;
    assert_eq!(server.hits.load(Ordering::SeqCst), 3);
    assert_eq!(
        session.store().cached_keys(),
        vec!["2024-06-01T00:00:00Z", "latest"]
    );
}

#[tokio::test]
async fn test_snapshot_status_error() {
    let server = serve(HashMap::from([(
        "/site/reports.json",
        (200, r#"["2024-06-01"]"#.to_string()),
    )]))
    .await;
    let source = HttpSource::new(server.base.clone(), None).unwrap();

    let err = source.fetch("reports/latest.json").await.unwrap_err();
    match err {
        Error::HttpStatus { url, status } => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/site/reports/latest.json"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
