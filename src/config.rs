use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use url::Url;

use crate::logging::{log, obj, v_str, Domain, Level};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base url `{input}`: {source}")]
    InvalidBaseUrl {
        input: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base url `{0}` must use http or https")]
    UnsupportedScheme(String),
}

/// Client configuration supplied at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            input: base_url.to_string(),
            source,
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/simulate`
    pub fn simulate_endpoint(&self) -> String {
        format!("{}/simulate", self.base_url())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub lab_config_path: PathBuf,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind = std::env::var("LAB_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
        let bind_addr = bind
            .parse()
            .with_context(|| format!("LAB_BIND_ADDR `{}` is not a socket address", bind))?;
        Ok(Self {
            bind_addr,
            lab_config_path: std::env::var("LAB_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("configs/economic_config.json")),
        })
    }
}

// =============================================================================
// Economic configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentConfig {
    pub skill_upgrade_cost: f64,
    #[serde(default = "default_efficiency_gain")]
    pub efficiency_gain: f64,
}

fn default_efficiency_gain() -> f64 {
    0.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardMultipliers {
    pub door_to_doctor: f64,
    pub length_of_stay: f64,
    pub throughput: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub shift_hours: u32,
    pub patients_per_hour: u32,
    #[serde(default)]
    pub event_probabilities: HashMap<String, f64>,
}

/// Economic and simulation parameters of the lab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabConfig {
    pub initial_capital: f64,
    pub token_cost: f64,
    pub api_call_cost: f64,
    pub simulation_run_cost: f64,
    pub hourly_burn_rate: f64,
    pub impact_factor: f64,
    pub investment: InvestmentConfig,
    pub reward_multipliers: RewardMultipliers,
    pub simulation: SimulationSettings,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10.0,
            token_cost: 0.001,
            api_call_cost: 0.02,
            simulation_run_cost: 0.1,
            hourly_burn_rate: 0.05,
            impact_factor: 2.5,
            investment: InvestmentConfig {
                skill_upgrade_cost: 1.0,
                efficiency_gain: 0.1,
            },
            reward_multipliers: RewardMultipliers {
                door_to_doctor: 1.0,
                length_of_stay: 1.0,
                throughput: 1.0,
                error_rate: 1.0,
            },
            simulation: SimulationSettings {
                shift_hours: 12,
                patients_per_hour: 6,
                event_probabilities: HashMap::from([
                    ("mass_casualty".to_string(), 0.03),
                    ("system_outage".to_string(), 0.02),
                ]),
            },
        }
    }
}

impl LabConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read lab config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid lab config {}", path.display()))
    }

    /// Load from `path`, or fall back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let cfg = Self::from_path(path)?;
            log(
                Level::Info,
                Domain::System,
                "lab_config_loaded",
                obj(&[("path", v_str(&path.to_string_lossy()))]),
            );
            return Ok(cfg);
        }
        log(
            Level::Warn,
            Domain::System,
            "lab_config_missing",
            obj(&[
                ("path", v_str(&path.to_string_lossy())),
                ("fallback", json!("defaults")),
            ]),
        );
        Ok(Self::default())
    }
}
