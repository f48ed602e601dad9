//! End-to-end: dashboard shell + HTTP transport against in-process mock services.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use survival_lab::client::{ErrorKind, HttpTransport, SimulationError, SimulationTransport};
use survival_lab::config::ClientConfig;
use survival_lab::render::{decision_log_lines, kpi_cards, render_dashboard};
use survival_lab::schema::SimulationRequest;
use survival_lab::shell::Dashboard;

fn fixture() -> Value {
    json!({
        "rounds": 3,
        "leaderboard": [{"agent": "A", "score": 10}],
        "results": [{
            "agent_name": "A",
            "metrics": {"balance": 1000, "burn_rate": 50, "profit_margin": 0.2, "survival_time": 20},
            "kpis": {"door_to_doctor": 1.5, "length_of_stay": 4, "throughput": 12, "error_rate": 0.05},
            "decision_logs": [{"action": "hire", "reason": "low staff", "expected_roi": 1.2}],
            "cost_breakdown": {"staff": 500, "supplies": 200}
        }]
    })
}

/// Serve `app` on an ephemeral port; returns the API base URL.
async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

type Seen = Arc<Mutex<Vec<Value>>>;

async fn echo_fixture(State(seen): State<Seen>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(body);
    Json(fixture())
}

async fn mock_service() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/api/simulate", post(echo_fixture))
        .with_state(seen.clone());
    (serve(app).await, seen)
}

fn transport(base: &str) -> HttpTransport {
    HttpTransport::new(&ClientConfig::new(base).unwrap())
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_three_rounds_renders_latest_agent() {
    let (base, seen) = mock_service().await;
    let mut dash = Dashboard::new(transport(&base));

    assert_eq!(dash.run_rounds(3).await, Ok(()));
    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({"rounds": 3})]);

    let latest = dash.latest().unwrap();
    let balance = kpi_cards(latest).into_iter().find(|c| c.label == "Balance").unwrap();
    assert_eq!(balance.value, "$1000");
    assert_eq!(decision_log_lines(latest), vec!["hire: low staff (ROI 1.2)"]);

    let text = render_dashboard(&dash.view(), 3);
    assert!(text.contains("Run Simulation (3 rounds)"));
    assert!(text.contains("Error Rate"));
    assert!(text.contains("5.0%"));
    assert!(text.contains("\"staff\": 500,"));
    assert!(text.contains("\"supplies\": 200\n"));
    assert!(!dash.is_busy());
}

#[tokio::test]
async fn omitted_request_sends_empty_object() {
    let (base, seen) = mock_service().await;
    let t = transport(&base);
    let resp = t.run_simulation(&SimulationRequest::default()).await.unwrap();
    assert_eq!(resp.rounds, 3);
    assert_eq!(seen.lock().unwrap().as_slice(), &[json!({})]);
}

// ---------------------------------------------------------------------------
// Failures collapse into one kind and keep prior state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn server_error_keeps_previous_data() {
    let (good_base, _) = mock_service().await;
    let mut dash = Dashboard::new(transport(&good_base));
    dash.run_rounds(3).await.unwrap();
    let before = dash.data().clone();

    let failing = Router::new().route(
        "/api/simulate",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let bad_base = serve(failing).await;
    let err = transport(&bad_base)
        .run_simulation(&SimulationRequest::with_rounds(3))
        .await
        .unwrap_err();
    assert!(matches!(err, SimulationError::Status { status: 500 }));
    assert_eq!(err.kind(), ErrorKind::SimulationRequestFailed);

    // Same shell, failing transport.
    let mut failing_dash = Dashboard::new(transport(&bad_base));
    assert_eq!(failing_dash.run_rounds(3).await, Err(ErrorKind::SimulationRequestFailed));
    assert!(failing_dash.latest().is_none());
    assert!(render_dashboard(&failing_dash.view(), 3).contains("! simulation request failed"));

    // The successful dashboard is unaffected by the failure elsewhere.
    assert_eq!(dash.data(), &before);
}

#[tokio::test]
async fn connection_refused_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut dash = Dashboard::new(transport(&format!("http://{}/api", addr)));
    assert_eq!(dash.run_rounds(3).await, Err(ErrorKind::SimulationRequestFailed));
    assert!(matches!(dash.last_error(), Some(SimulationError::Transport(_))));
    assert!(!dash.is_busy());
    assert_eq!(dash.data().results.len(), 0);
}

#[tokio::test]
async fn non_json_body_is_decode_failure() {
    let app = Router::new().route("/api/simulate", post(|| async { "not json" }));
    let base = serve(app).await;
    let err = transport(&base)
        .run_simulation(&SimulationRequest::with_rounds(1))
        .await
        .unwrap_err();
    assert!(matches!(err, SimulationError::Decode(_)));
}
