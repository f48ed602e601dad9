use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{SimulationError, SimulationTransport};
use crate::config::ClientConfig;
use crate::logging::{log, obj, params_hash, v_num, v_str, Domain, Level};
use crate::schema::{SimulationRequest, SimulationResponse};

/// `POST {base}/simulate` with a JSON body.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.simulate_endpoint(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SimulationTransport for HttpTransport {
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResponse, SimulationError> {
        let body = serde_json::to_string(request).map_err(SimulationError::Decode)?;
        let request_hash = params_hash(&body);
        let started = std::time::Instant::now();
        log(
            Level::Debug,
            Domain::Transport,
            "request",
            obj(&[
                ("request_hash", v_str(&request_hash)),
                ("endpoint", v_str(&self.endpoint)),
            ]),
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                log(
                    Level::Warn,
                    Domain::Transport,
                    "transport_error",
                    obj(&[("request_hash", v_str(&request_hash)), ("error", v_str(&err.to_string()))]),
                );
                SimulationError::Transport(err)
            })?;

        let status = resp.status();
        if !status.is_success() {
            log(
                Level::Warn,
                Domain::Transport,
                "status_error",
                obj(&[("request_hash", v_str(&request_hash)), ("status", json!(status.as_u16()))]),
            );
            return Err(SimulationError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(SimulationError::Transport)?;
        let parsed: SimulationResponse = serde_json::from_slice(&bytes).map_err(SimulationError::Decode)?;
        log(
            Level::Info,
            Domain::Transport,
            "response",
            obj(&[
                ("request_hash", v_str(&request_hash)),
                ("results", json!(parsed.results.len())),
                ("elapsed_ms", v_num(started.elapsed().as_secs_f64() * 1000.0)),
            ]),
        );
        Ok(parsed)
    }
}
