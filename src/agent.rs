//! Hospital AI agents competing in the lab.

use crate::schema::DecisionLog;

/// Cash runway (in hours) below which an agent stops investing.
pub const LOW_RUNWAY_HOURS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentProfile {
    Generalist,
    /// Specialized triage policy with a stronger efficiency gain.
    TriageOptimizer,
}

#[derive(Debug, Clone)]
pub struct HospitalAgent {
    pub name: String,
    pub skill_level: f64,
    pub reputation: f64,
    pub subcontracting_enabled: bool,
    pub decision_log: Vec<DecisionLog>,
    pub profile: AgentProfile,
}

impl HospitalAgent {
    pub fn generalist(name: &str) -> Self {
        Self {
            name: name.to_string(),
            skill_level: 1.0,
            reputation: 50.0,
            subcontracting_enabled: false,
            decision_log: Vec::new(),
            profile: AgentProfile::Generalist,
        }
    }

    pub fn triage_optimizer(name: &str) -> Self {
        Self {
            subcontracting_enabled: true,
            profile: AgentProfile::TriageOptimizer,
            ..Self::generalist(name)
        }
    }

    /// Pick the next action from the current cash position and record it.
    pub fn decide(&mut self, balance: f64, burn_rate: f64) -> DecisionLog {
        let runway = if burn_rate != 0.0 { balance / burn_rate } else { 999.0 };
        let decision = if runway < LOW_RUNWAY_HOURS {
            choice("conserve", "Low runway: reduce experimentation spend", 0.01)
        } else if balance > 7.0 && self.skill_level < 1.5 {
            choice("invest", "Strong cash position and high long-term ROI", 0.12)
        } else {
            choice("work", "Optimize operations for near-term payouts", 0.08)
        };
        self.decision_log.push(decision.clone());
        decision
    }

    pub fn optimize_triage(&self) -> f64 {
        match self.profile {
            AgentProfile::Generalist => 1.0 + (self.skill_level - 1.0) * 0.5,
            AgentProfile::TriageOptimizer => 1.2 + (self.skill_level - 1.0) * 0.6,
        }
    }

    /// Returns (beds, nurses, doctors) after subcontracting.
    pub fn allocate_staff(&self, beds: u32, nurses: u32, doctors: u32) -> (u32, u32, u32) {
        let nurses = if self.subcontracting_enabled && nurses < doctors * 2 {
            nurses + 1
        } else {
            nurses
        };
        (beds, nurses, doctors)
    }

    pub fn redesign_workflow(&self) -> f64 {
        (1.1 - self.reputation / 500.0).max(0.9)
    }
}

fn choice(action: &str, reason: &str, expected_roi: f64) -> DecisionLog {
    DecisionLog {
        action: action.to_string(),
        reason: reason.to_string(),
        expected_roi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_runway_conserves() {
        let mut agent = HospitalAgent::generalist("a");
        // 0.5 / 0.05 = 10h of runway
        let d = agent.decide(0.5, 0.05);
        assert_eq!(d.action, "conserve");
        assert_eq!(agent.decision_log.len(), 1);
    }

    #[test]
    fn test_cash_rich_invests_until_skilled() {
        let mut agent = HospitalAgent::generalist("a");
        assert_eq!(agent.decide(9.0, 0.05).action, "invest");
        agent.skill_level = 1.5;
        assert_eq!(agent.decide(9.0, 0.05).action, "work");
        assert_eq!(agent.decide(5.0, 0.0).action, "work");
        assert_eq!(agent.decision_log.len(), 3);
    }

    #[test]
    fn test_triage_profiles() {
        let mut generalist = HospitalAgent::generalist("g");
        let mut optimizer = HospitalAgent::triage_optimizer("o");
        assert!((generalist.optimize_triage() - 1.0).abs() < 1e-12);
        assert!((optimizer.optimize_triage() - 1.2).abs() < 1e-12);
        generalist.skill_level = 2.0;
        optimizer.skill_level = 2.0;
        assert!((generalist.optimize_triage() - 1.5).abs() < 1e-12);
        assert!((optimizer.optimize_triage() - 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_subcontracting_adds_nurse() {
        let optimizer = HospitalAgent::triage_optimizer("o");
        assert_eq!(optimizer.allocate_staff(20, 11, 6), (20, 12, 6));
        assert_eq!(optimizer.allocate_staff(20, 12, 6), (20, 12, 6));
        let generalist = HospitalAgent::generalist("g");
        assert_eq!(generalist.allocate_staff(20, 11, 6), (20, 11, 6));
    }

    #[test]
    fn test_workflow_floor() {
        let mut agent = HospitalAgent::generalist("a");
        assert!((agent.redesign_workflow() - 1.0).abs() < 1e-12);
        agent.reputation = 400.0;
        assert!((agent.redesign_workflow() - 0.9).abs() < 1e-12);
    }
}
