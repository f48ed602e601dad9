//! JSON shapes exchanged with the simulation service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_ROUNDS: u32 = 1;
pub const MAX_ROUNDS: u32 = 72;
pub const DEFAULT_AGENTS: [&str; 2] = ["Triage Optimizer", "Flow Marshal"];

/// Simulation parameters as sent over the wire.
///
/// Every field is optional: an omitted field takes the service default, so
/// `SimulationRequest::default()` serializes to `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nurses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_calls: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation_runs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl SimulationRequest {
    pub fn with_rounds(rounds: u32) -> Self {
        Self {
            rounds: Some(rounds),
            ..Self::default()
        }
    }

    /// Apply service defaults and bounds.
    pub fn resolve(&self) -> Result<ResolvedRequest, RequestError> {
        let rounds = self.rounds.unwrap_or(DEFAULT_ROUNDS);
        if !(1..=MAX_ROUNDS).contains(&rounds) {
            return Err(RequestError::RoundsOutOfRange(rounds));
        }
        let agent_names = self
            .agent_names
            .clone()
            .unwrap_or_else(|| DEFAULT_AGENTS.iter().map(|s| s.to_string()).collect());
        if agent_names.is_empty() {
            return Err(RequestError::NoAgents);
        }
        let beds = at_least_one("beds", self.beds.unwrap_or(20))?;
        let nurses = at_least_one("nurses", self.nurses.unwrap_or(12))?;
        let doctors = at_least_one("doctors", self.doctors.unwrap_or(6))?;
        let simulation_runs = self.simulation_runs.unwrap_or(1);
        if simulation_runs == 0 {
            return Err(RequestError::BelowMinimum { field: "simulation_runs" });
        }
        Ok(ResolvedRequest {
            rounds,
            agent_names,
            beds,
            nurses,
            doctors,
            tokens_used: self.tokens_used.unwrap_or(1500),
            api_calls: self.api_calls.unwrap_or(15),
            simulation_runs,
            seed: self.seed,
        })
    }
}

fn at_least_one(field: &'static str, value: u32) -> Result<u32, RequestError> {
    if value == 0 {
        Err(RequestError::BelowMinimum { field })
    } else {
        Ok(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("rounds must be between 1 and 72, got {0}")]
    RoundsOutOfRange(u32),
    #[error("agent_names must not be empty")]
    NoAgents,
    #[error("{field} must be at least 1")]
    BelowMinimum { field: &'static str },
}

/// Request with every default applied and every bound checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub rounds: u32,
    pub agent_names: Vec<String>,
    pub beds: u32,
    pub nurses: u32,
    pub doctors: u32,
    pub tokens_used: u64,
    pub api_calls: u64,
    pub simulation_runs: u64,
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub rounds: u32,
    /// Ranking records; their shape belongs to the service.
    pub leaderboard: Vec<Value>,
    pub results: Vec<AgentRoundResult>,
}

impl SimulationResponse {
    /// Last-round-wins view of the results.
    pub fn latest(&self) -> Option<&AgentRoundResult> {
        self.results.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRoundResult {
    #[serde(default)]
    pub round: u32,
    pub agent_name: String,
    #[serde(default)]
    pub decision: String,
    #[serde(default)]
    pub payment: f64,
    pub metrics: Metrics,
    pub kpis: Kpis,
    pub decision_logs: Vec<DecisionLog>,
    /// Printed as received.
    pub cost_breakdown: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub balance: f64,
    pub burn_rate: f64,
    /// Fraction, 0..1
    pub profit_margin: f64,
    /// Hours
    pub survival_time: f64,
    #[serde(default)]
    pub reputation_score: f64,
    #[serde(default)]
    pub bankrupt: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub door_to_doctor: f64,
    pub length_of_stay: f64,
    pub throughput: f64,
    pub error_rate: f64,
    #[serde(default)]
    pub treated_patients: u32,
    #[serde(default)]
    pub untreated_patients: u32,
    #[serde(default)]
    pub event_log: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLog {
    pub action: String,
    pub reason: String,
    pub expected_roi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub agent_name: String,
    pub balance: f64,
    pub reputation_score: f64,
    pub survival_time: f64,
    pub bankrupt: bool,
}
