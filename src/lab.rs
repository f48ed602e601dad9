//! Survival lab service: agents compete round by round for payouts while
//! paying for model usage and the hourly burn of their runway.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::agent::HospitalAgent;
use crate::config::LabConfig;
use crate::economics::{round_to, AgentEconomics, EconomicEngine};
use crate::logging::{log, log_decision, log_round, obj, Domain, Level, ProfileScope};
use crate::schema::{
    AgentRoundResult, Kpis, LeaderboardEntry, Metrics, ResolvedRequest, SimulationResponse,
};
use crate::sim::{ErSimulation, Resources};

pub const BENCHMARK_AGENTS: [&str; 2] = ["Triage Optimizer", "Flow Marshal"];

pub struct SurvivalLab {
    engine: EconomicEngine,
}

impl SurvivalLab {
    pub fn new(config: LabConfig) -> Self {
        Self {
            engine: EconomicEngine::new(config),
        }
    }

    pub fn config(&self) -> &LabConfig {
        self.engine.config()
    }

    /// Run every round for every agent and rank the survivors.
    pub fn run_iteration(&self, request: &ResolvedRequest) -> SimulationResponse {
        let _scope = ProfileScope::with_context(
            "run_iteration",
            &[
                ("rounds", json!(request.rounds)),
                ("agents", json!(request.agent_names.len())),
            ],
        );

        // One agent and ledger per distinct name; a name listed twice plays twice per round.
        let mut ledgers: Vec<(HospitalAgent, AgentEconomics)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let turns: Vec<usize> = request
            .agent_names
            .iter()
            .map(|name| {
                *slots.entry(name.as_str()).or_insert_with(|| {
                    ledgers.push((HospitalAgent::triage_optimizer(name), self.engine.initialize_agent(name)));
                    ledgers.len() - 1
                })
            })
            .collect();

        let mut results = Vec::new();
        for round in 1..=request.rounds {
            for &slot in &turns {
                let (agent, economics) = &mut ledgers[slot];
                if economics.bankrupt() {
                    continue;
                }
                let seed = request.seed.map(|s| (s as u64).wrapping_add(u64::from(round)));
                let staffing = Staffing {
                    beds: request.beds,
                    nurses: request.nurses,
                    doctors: request.doctors,
                };
                let usage = Usage {
                    tokens: request.tokens_used,
                    api_calls: request.api_calls,
                    simulation_runs: request.simulation_runs,
                };
                let outcome = self.play_round(agent, economics, round, staffing, usage, seed);
                results.push(AgentRoundResult {
                    round,
                    agent_name: agent.name.clone(),
                    decision: outcome.decision,
                    payment: round_to(outcome.payment, 3),
                    metrics: Metrics {
                        balance: round_to(economics.balance, 3),
                        burn_rate: economics.burn_rate,
                        profit_margin: round_to(economics.profit_margin, 3),
                        survival_time: economics.survival_time_hours,
                        reputation_score: round_to(economics.reputation_score, 2),
                        bankrupt: economics.bankrupt(),
                    },
                    kpis: outcome.kpis,
                    decision_logs: agent.decision_log.clone(),
                    cost_breakdown: cost_breakdown(economics),
                });
            }
        }

        SimulationResponse {
            rounds: request.rounds,
            leaderboard: leaderboard(ledgers.iter().map(|(_, e)| e))
                .into_iter()
                .map(|entry| serde_json::to_value(entry).unwrap_or(Value::Null))
                .collect(),
            results,
        }
    }

    /// Offline benchmark with fixed staffing and usage; one record per agent-round.
    pub fn run_benchmark(&self, rounds: u32, seed: u64) -> Vec<BenchmarkRecord> {
        let mut ledgers: Vec<(HospitalAgent, AgentEconomics)> = BENCHMARK_AGENTS
            .iter()
            .map(|name| (HospitalAgent::triage_optimizer(name), self.engine.initialize_agent(name)))
            .collect();
        let staffing = Staffing { beds: 24, nurses: 14, doctors: 7 };
        let usage = Usage { tokens: 1200, api_calls: 10, simulation_runs: 1 };

        let mut history = Vec::new();
        for i in 0..rounds {
            for (agent, economics) in ledgers.iter_mut() {
                if economics.bankrupt() {
                    continue;
                }
                let outcome = self.play_round(
                    agent,
                    economics,
                    i + 1,
                    staffing,
                    usage,
                    Some(seed.wrapping_add(u64::from(i))),
                );
                history.push(BenchmarkRecord {
                    round: i + 1,
                    agent: agent.name.clone(),
                    decision: outcome.decision,
                    balance: round_to(economics.balance, 3),
                    throughput: outcome.kpis.throughput,
                    error_rate: outcome.kpis.error_rate,
                    reward: round_to(outcome.payment, 3),
                    bankrupt: economics.bankrupt(),
                });
            }
        }
        history
    }

    fn play_round(
        &self,
        agent: &mut HospitalAgent,
        economics: &mut AgentEconomics,
        round: u32,
        staffing: Staffing,
        usage: Usage,
        seed: Option<u64>,
    ) -> RoundOutcome {
        let cfg = self.engine.config();

        let decision = agent.decide(economics.balance, economics.burn_rate);
        log_decision(&agent.name, round, &decision.action, &decision.reason, decision.expected_roi);
        if decision.action == "invest" && self.engine.invest_in_upgrade(economics, decision.expected_roi) {
            agent.skill_level += cfg.investment.efficiency_gain;
        }

        self.engine
            .charge_usage(economics, usage.tokens, usage.api_calls, usage.simulation_runs);
        self.engine
            .apply_burn_rate(economics, f64::from(cfg.simulation.shift_hours));

        let (beds, nurses, doctors) = agent.allocate_staff(staffing.beds, staffing.nurses, staffing.doctors);
        let mut shift = ErSimulation::new(&cfg.simulation, seed);
        let report = shift.run(
            Resources { beds, nurses, doctors },
            agent.optimize_triage(),
            agent.redesign_workflow(),
        );
        let kpis = Kpis::from(report);
        let quality = self.engine.quality_score_from_kpis(&kpis);
        let payment = self.engine.reward(economics, quality, cfg.impact_factor);

        log_round(&agent.name, round, economics.balance, payment, economics.bankrupt());
        if economics.bankrupt() {
            log(
                Level::Warn,
                Domain::Economy,
                "bankrupt",
                obj(&[("agent_name", json!(agent.name)), ("round", json!(round))]),
            );
        }

        RoundOutcome {
            decision: decision.action,
            payment,
            kpis,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Staffing {
    beds: u32,
    nurses: u32,
    doctors: u32,
}

#[derive(Debug, Clone, Copy)]
struct Usage {
    tokens: u64,
    api_calls: u64,
    simulation_runs: u64,
}

struct RoundOutcome {
    decision: String,
    payment: f64,
    kpis: Kpis,
}

/// One line of the offline benchmark history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub round: u32,
    pub agent: String,
    pub decision: String,
    pub balance: f64,
    pub throughput: f64,
    pub error_rate: f64,
    pub reward: f64,
    pub bankrupt: bool,
}

fn cost_breakdown(economics: &AgentEconomics) -> Map<String, Value> {
    [
        ("token_spend", economics.token_spend),
        ("api_spend", economics.api_spend),
        ("simulation_spend", economics.simulation_spend),
        ("total_cost", economics.total_cost),
        ("rewards_earned", economics.rewards_earned),
    ]
    .into_iter()
    .map(|(key, amount)| (key.to_string(), json!(round_to(amount, 3))))
    .collect()
}

/// Solvent agents first, then by balance and reputation, both descending.
pub fn leaderboard<'a>(ledgers: impl Iterator<Item = &'a AgentEconomics>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = ledgers
        .map(|e| LeaderboardEntry {
            agent_name: e.name.clone(),
            balance: round_to(e.balance, 3),
            reputation_score: round_to(e.reputation_score, 2),
            survival_time: e.survival_time_hours,
            bankrupt: e.bankrupt(),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.bankrupt
            .cmp(&b.bankrupt)
            .then(b.balance.total_cmp(&a.balance))
            .then(b.reputation_score.total_cmp(&a.reputation_score))
    });
    entries
}
