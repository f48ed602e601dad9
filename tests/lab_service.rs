//! The real simulation service over HTTP, driven by the dashboard client.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use survival_lab::client::{HttpTransport, SimulationTransport};
use survival_lab::config::{ClientConfig, LabConfig};
use survival_lab::lab::SurvivalLab;
use survival_lab::schema::SimulationRequest;
use survival_lab::server::router;
use survival_lab::shell::Dashboard;

async fn spawn_service() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let lab = Arc::new(SurvivalLab::new(LabConfig::default()));
    tokio::spawn(async move {
        axum::serve(listener, router(lab)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_reports_ok() {
    let root = spawn_service().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", root))
        .header("Origin", "http://dashboard.test")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(
        resp.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn browser_preflight_is_allowed() {
    let root = spawn_service().await;
    let resp = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/simulate", root))
        .header("Origin", "http://dashboard.test")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert!(resp.headers().contains_key("access-control-allow-headers"));
    assert!(resp.headers().contains_key("access-control-allow-methods"));
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
}

#[tokio::test]
async fn repeated_agent_name_plays_twice_per_round() {
    let root = spawn_service().await;
    let t = HttpTransport::new(&ClientConfig::new(&format!("{}/api", root)).unwrap());
    let req = SimulationRequest {
        rounds: Some(1),
        agent_names: Some(vec!["A".to_string(), "A".to_string()]),
        seed: Some(-2),
        ..SimulationRequest::default()
    };
    let resp = t.run_simulation(&req).await.unwrap();
    assert_eq!(resp.results.len(), 2);
    assert_eq!(resp.leaderboard.len(), 1);
}

#[tokio::test]
async fn multi_agent_rounds_output_shape() {
    let root = spawn_service().await;
    let t = HttpTransport::new(&ClientConfig::new(&format!("{}/api", root)).unwrap());
    let req = SimulationRequest {
        rounds: Some(2),
        agent_names: Some(vec!["A".to_string(), "B".to_string()]),
        seed: Some(11),
        ..SimulationRequest::default()
    };
    let resp = t.run_simulation(&req).await.unwrap();

    assert_eq!(resp.rounds, 2);
    assert_eq!(resp.leaderboard.len(), 2);
    assert!(resp.results.len() >= 2);
    let mut names: Vec<&str> = resp
        .leaderboard
        .iter()
        .filter_map(|e| e["agent_name"].as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["A", "B"]);
    for r in &resp.results {
        assert!(r.cost_breakdown.contains_key("total_cost"));
        assert!(!r.decision_logs.is_empty());
    }
}

#[tokio::test]
async fn empty_request_uses_service_defaults() {
    let root = spawn_service().await;
    let t = HttpTransport::new(&ClientConfig::new(&format!("{}/api", root)).unwrap());
    let resp = t.run_simulation(&SimulationRequest::default()).await.unwrap();
    assert_eq!(resp.rounds, 1);
    let mut names: Vec<String> = resp.results.iter().map(|r| r.agent_name.clone()).collect();
    names.sort();
    assert_eq!(names, vec!["Flow Marshal", "Triage Optimizer"]);
}

#[tokio::test]
async fn out_of_range_rounds_rejected_with_detail() {
    let root = spawn_service().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/api/simulate", root))
        .json(&json!({"rounds": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("rounds"));
}

#[tokio::test]
async fn dashboard_against_live_service() {
    let root = spawn_service().await;
    let config = ClientConfig::new(&format!("{}/api", root)).unwrap();
    let mut dash = Dashboard::new(HttpTransport::new(&config));
    let req = SimulationRequest {
        rounds: Some(3),
        seed: Some(5),
        ..SimulationRequest::default()
    };
    assert_eq!(dash.run(req).await, Ok(()));
    let latest = dash.latest().unwrap();
    assert_eq!(latest.round, 3);
    assert_eq!(latest.agent_name, "Flow Marshal");
}
