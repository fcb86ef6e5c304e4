//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use hackeval::adapters::engines::{MockAnalysisEngine, MockResponse};
use hackeval::adapters::http::{EvaluationHttpConfig, EvaluationHttpServer};
use hackeval::services::{EvaluationPipeline, SingleFlightGate};
use hackeval::EvaluationParameters;

struct TestApp {
    router: Router,
    engine: Arc<MockAnalysisEngine>,
    gate: SingleFlightGate,
    _workdir: tempfile::TempDir,
}

fn app_with(engine: MockAnalysisEngine, config: EvaluationHttpConfig) -> TestApp {
    let engine = Arc::new(engine);
    let workdir = common::temp_dir();
    let pipeline = EvaluationPipeline::new(engine.clone(), SingleFlightGate::global())
        .with_workdir(workdir.path());
    let gate = pipeline.gate().clone();
    let router = EvaluationHttpServer::new(
        pipeline,
        Arc::new(EvaluationParameters::standard()),
        config,
    )
    .router();

    TestApp {
        router,
        engine,
        gate,
        _workdir: workdir,
    }
}

fn app() -> TestApp {
    app_with(MockAnalysisEngine::new(), EvaluationHttpConfig::default())
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn evaluate_request(file: Option<(&str, &[u8])>, mode: Option<&str>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/evaluate")
        .header(header::CONTENT_TYPE, common::multipart_content_type())
        .body(Body::from(common::multipart_body(file, mode)))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = app();

    for uri in ["/", "/health"] {
        let response = app.router.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "HackEval Agent API");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}

#[tokio::test]
async fn test_criteria_endpoint() {
    let app = app();
    let response = app.router.oneshot(get("/criteria")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["total_score"], 100);
    assert_eq!(body["criteria"]["Innovation"]["max_score"], 30);
    assert_eq!(body["criteria"]["Impact"]["weight"], 0.2);
    assert!(body["rubric"].as_str().is_some_and(|r| !r.is_empty()));
}

#[tokio::test]
async fn test_evaluate_upload() {
    let app = app();
    let response = app
        .router
        .oneshot(evaluate_request(
            Some(("pitch-deck.pdf", b"%PDF-1.7 slides".as_slice())),
            Some("presentation"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["score"], 50);
    assert_eq!(body["total_score"], 100);
    assert_eq!(body["team_name"], "pitch-deck.pdf");
    assert_eq!(body["message"], "Evaluation completed successfully");
    assert_eq!(body["scores_breakdown"]["Innovation"], 15);
    assert!(body["feedback"].is_object());

    let call = &app.engine.invocations()[0];
    assert_eq!(call.mode, "presentation");
    assert_eq!(call.bytes_seen, 15);
}

#[tokio::test]
async fn test_evaluate_defaults_agent_mode() {
    let app = app();
    let response = app
        .router
        .oneshot(evaluate_request(Some(("report.docx", b"docx".as_slice())), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.engine.invocations()[0].mode, "combined");
}

#[tokio::test]
async fn test_evaluate_without_file_is_rejected() {
    let app = app();
    let response = app
        .router
        .oneshot(evaluate_request(None, Some("combined")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert!(body["detail"].as_str().unwrap().contains("file"));
    assert_eq!(app.engine.call_count(), 0);
}

#[tokio::test]
async fn test_engine_failure_returns_detail() {
    let app = app_with(
        MockAnalysisEngine::with_default_response(MockResponse::Failure(
            "could not extract slides".to_string(),
        )),
        EvaluationHttpConfig::default(),
    );

    let response = app
        .router
        .oneshot(evaluate_request(Some(("deck.pptx", b"broken".as_slice())), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("could not extract slides"));
    assert!(!app.gate.is_busy());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_criteria_is_not_blocked_by_running_evaluation() {
    let app = app_with(
        MockAnalysisEngine::new().with_delay(Duration::from_millis(500)),
        EvaluationHttpConfig::default(),
    );

    let evaluation = tokio::spawn(
        app.router
            .clone()
            .oneshot(evaluate_request(Some(("slow.pdf", b"pdf".as_slice())), None)),
    );

    tokio::time::timeout(Duration::from_secs(5), async {
        while !app.gate.is_busy() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    let criteria = tokio::time::timeout(
        Duration::from_millis(250),
        app.router.clone().oneshot(get("/criteria")),
    )
    .await
    .expect("criteria blocked behind evaluation")
    .unwrap();
    assert_eq!(criteria.status(), StatusCode::OK);
    assert!(!evaluation.is_finished());

    let response = evaluation.await.unwrap().unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let config = EvaluationHttpConfig {
        max_upload_bytes: 64,
        ..Default::default()
    };
    let app = app_with(MockAnalysisEngine::new(), config);

    let big = vec![b'x'; 4096];
    let response = app
        .router
        .oneshot(evaluate_request(Some(("huge.pdf", big.as_slice())), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.engine.call_count(), 0);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = EvaluationHttpConfig {
        allowed_origins: Some(vec!["https://judge.example.com".to_string()]),
        ..Default::default()
    };
    let app = app_with(MockAnalysisEngine::new(), config);

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/evaluate")
        .header(header::ORIGIN, "https://judge.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(preflight).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://judge.example.com"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );

    let foreign = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://elsewhere.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(foreign).await.unwrap();
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_wildcard_by_default() {
    let app = app();
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://anywhere.example.com")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
