use crate::config::LabConfig;
use crate::schema::Kpis;

/// Running ledger of one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEconomics {
    pub name: String,
    pub balance: f64,
    pub burn_rate: f64,
    pub token_spend: f64,
    pub api_spend: f64,
    pub simulation_spend: f64,
    pub rewards_earned: f64,
    pub total_cost: f64,
    pub profit_margin: f64,
    pub survival_time_hours: f64,
    pub reputation_score: f64,
    pub roi_history: Vec<f64>,
}

impl AgentEconomics {
    pub fn bankrupt(&self) -> bool {
        self.balance <= 0.0
    }
}

pub struct EconomicEngine {
    config: LabConfig,
}

impl EconomicEngine {
    pub fn new(config: LabConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn initialize_agent(&self, name: &str) -> AgentEconomics {
        AgentEconomics {
            name: name.to_string(),
            balance: self.config.initial_capital,
            burn_rate: self.config.hourly_burn_rate,
            token_spend: 0.0,
            api_spend: 0.0,
            simulation_spend: 0.0,
            rewards_earned: 0.0,
            total_cost: 0.0,
            profit_margin: 0.0,
            survival_time_hours: 0.0,
            reputation_score: 50.0,
            roi_history: Vec::new(),
        }
    }

    /// Bill model usage; returns the amount charged.
    pub fn charge_usage(
        &self,
        economics: &mut AgentEconomics,
        tokens: u64,
        api_calls: u64,
        simulation_runs: u64,
    ) -> f64 {
        let token_cost = tokens as f64 * self.config.token_cost;
        let api_cost = api_calls as f64 * self.config.api_call_cost;
        let run_cost = simulation_runs as f64 * self.config.simulation_run_cost;
        let charge = token_cost + api_cost + run_cost;

        economics.token_spend += token_cost;
        economics.api_spend += api_cost;
        economics.simulation_spend += run_cost;
        economics.total_cost += charge;
        economics.balance -= charge;
        charge
    }

    pub fn apply_burn_rate(&self, economics: &mut AgentEconomics, hours: f64) -> f64 {
        let burn_cost = economics.burn_rate * hours;
        economics.total_cost += burn_cost;
        economics.balance -= burn_cost;
        economics.survival_time_hours += hours;
        burn_cost
    }

    pub fn reward(&self, economics: &mut AgentEconomics, quality_score: f64, impact_factor: f64) -> f64 {
        let payment = quality_score * impact_factor;
        economics.rewards_earned += payment;
        economics.balance += payment;
        if economics.total_cost > 0.0 {
            economics.profit_margin =
                (economics.rewards_earned - economics.total_cost) / economics.total_cost;
        }
        payment
    }

    /// Pay for a skill upgrade if the balance covers it.
    pub fn invest_in_upgrade(&self, economics: &mut AgentEconomics, expected_roi: f64) -> bool {
        let cost = self.config.investment.skill_upgrade_cost;
        if economics.balance < cost {
            return false;
        }
        economics.balance -= cost;
        economics.total_cost += cost;
        economics.roi_history.push(expected_roi);
        economics.reputation_score += (expected_roi * 10.0).min(5.0);
        true
    }

    pub fn quality_score_from_kpis(&self, kpis: &Kpis) -> f64 {
        let m = &self.config.reward_multipliers;
        let door = (1.0 - kpis.door_to_doctor / 6.0).max(0.0) * m.door_to_doctor;
        let los = (1.0 - kpis.length_of_stay / 14.0).max(0.0) * m.length_of_stay;
        let throughput = (kpis.throughput / 100.0).min(1.5) * m.throughput;
        let safety = (1.0 - kpis.error_rate).max(0.0) * m.error_rate;
        round_to((door + los + throughput + safety) / 4.0, 4)
    }
}

/// Round to `places` decimal places, halves to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EconomicEngine {
        EconomicEngine::new(LabConfig::default())
    }

    #[test]
    fn test_round_to_halves_to_even() {
        assert_eq!(round_to(9.0 / 72.0, 2), 0.12);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(1.2345678, 3), 1.235);
    }

    #[test]
    fn test_usage_charges_incrementally() {
        let engine = engine();
        let mut econ = engine.initialize_agent("a1");

        let first = engine.charge_usage(&mut econ, 1000, 10, 1);
        let second = engine.charge_usage(&mut econ, 1000, 10, 1);

        assert_eq!(round_to(first, 2), 1.3);
        assert_eq!(round_to(second, 2), 1.3);
        assert_eq!(round_to(econ.total_cost, 2), 2.6);
        assert_eq!(round_to(econ.balance, 2), 7.4);
    }

    #[test]
    fn test_burn_extends_survival() {
        let engine = engine();
        let mut econ = engine.initialize_agent("a1");
        let cost = engine.apply_burn_rate(&mut econ, 12.0);
        assert!((cost - 0.6).abs() < 1e-9);
        assert_eq!(econ.survival_time_hours, 12.0);
        assert!((econ.balance - 9.4).abs() < 1e-9);
    }

    #[test]
    fn test_reward_updates_margin() {
        let engine = engine();
        let mut econ = engine.initialize_agent("a1");
        let payment = engine.reward(&mut econ, 0.5, 2.0);
        assert_eq!(payment, 1.0);
        // No cost yet: margin untouched
        assert_eq!(econ.profit_margin, 0.0);

        engine.apply_burn_rate(&mut econ, 10.0);
        engine.reward(&mut econ, 0.5, 2.0);
        assert!((econ.profit_margin - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_invest_requires_cash() {
        let engine = engine();
        let mut econ = engine.initialize_agent("a1");
        assert!(engine.invest_in_upgrade(&mut econ, 0.12));
        assert!((econ.balance - 9.0).abs() < 1e-9);
        assert!((econ.reputation_score - 51.2).abs() < 1e-9);
        assert_eq!(econ.roi_history, vec![0.12]);

        econ.balance = 0.5;
        assert!(!engine.invest_in_upgrade(&mut econ, 0.12));
        assert_eq!(econ.roi_history.len(), 1);
    }

    #[test]
    fn test_bankrupt_at_zero() {
        let engine = engine();
        let mut econ = engine.initialize_agent("a1");
        assert!(!econ.bankrupt());
        econ.balance = 0.0;
        assert!(econ.bankrupt());
    }

    #[test]
    fn test_quality_score() {
        let engine = engine();
        let kpis = Kpis {
            door_to_doctor: 3.0,
            length_of_stay: 7.0,
            throughput: 50.0,
            error_rate: 0.1,
            treated_patients: 50,
            untreated_patients: 0,
            event_log: vec![],
        };
        // (0.5 + 0.5 + 0.5 + 0.9) / 4
        assert_eq!(engine.quality_score_from_kpis(&kpis), 0.6);
    }
}
