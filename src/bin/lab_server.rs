//! Simulation service.
//! Run with: cargo run --bin lab_server
//!
//! Environment:
//!   LAB_BIND_ADDR    listen address (default 127.0.0.1:8000)
//!   LAB_CONFIG_PATH  economic config JSON (default configs/economic_config.json)

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use survival_lab::config::{LabConfig, ServerConfig};
use survival_lab::lab::SurvivalLab;
use survival_lab::logging::{log, obj, v_str, Domain, Level};
use survival_lab::server::router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = ServerConfig::from_env()?;
    let lab_config = LabConfig::load_or_default(&cfg.lab_config_path)?;
    let lab = Arc::new(SurvivalLab::new(lab_config));

    let listener = TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;
    log(
        Level::Info,
        Domain::System,
        "listening",
        obj(&[
            ("addr", v_str(&cfg.bind_addr.to_string())),
            ("endpoints", json!(["POST /api/simulate", "GET /health"])),
        ]),
    );

    axum::serve(listener, router(lab))
        .await
        .context("simulation service failed")?;
    Ok(())
}
