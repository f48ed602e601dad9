//! Text rendering of the dashboard.

use serde::Serialize;

use crate::schema::AgentRoundResult;
use crate::shell::DashboardView;

pub const TITLE: &str = "Hospital AI Survival Lab";

#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

fn card(label: &'static str, value: String) -> KpiCard {
    KpiCard { label, value }
}

/// The KPI grid for the latest agent result.
pub fn kpi_cards(latest: &AgentRoundResult) -> Vec<KpiCard> {
    let m = &latest.metrics;
    let k = &latest.kpis;
    vec![
        card("Agent", latest.agent_name.clone()),
        card("Balance", format!("${}", format_number(m.balance))),
        card("Burn Rate", format!("${}/hr", format_number(m.burn_rate))),
        card("Profit Margin", format!("{}%", format_fixed(m.profit_margin * 100.0, 2))),
        card("Survival Time", format!("{} hrs", format_number(m.survival_time))),
        card("Door-to-Doctor", format!("{} hrs", format_number(k.door_to_doctor))),
        card("Length of Stay", format!("{} hrs", format_number(k.length_of_stay))),
        card("Throughput", format_number(k.throughput)),
        card("Error Rate", format!("{}%", format_fixed(k.error_rate * 100.0, 1))),
    ]
}

/// `<action>: <reason> (ROI <expected_roi>)`, one per decision.
pub fn decision_log_lines(latest: &AgentRoundResult) -> Vec<String> {
    latest
        .decision_logs
        .iter()
        .map(|log| format!("{}: {} (ROI {})", log.action, log.reason, format_number(log.expected_roi)))
        .collect()
}

/// Two-space indented JSON.
pub fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

pub fn button_label(busy: bool, rounds: u32) -> String {
    if busy {
        "Running...".to_string()
    } else {
        format!("Run Simulation ({} rounds)", rounds)
    }
}

/// Render the whole dashboard. Detail sections appear only when a latest
/// result exists.
pub fn render_dashboard(view: &DashboardView<'_>, rounds: u32) -> String {
    let mut out = String::new();
    out.push_str(TITLE);
    out.push('\n');
    out.push_str(&format!("[ {} ]\n", button_label(view.busy, rounds)));

    if let Some(err) = view.error {
        out.push_str(&format!("\n! {}\n", err));
    }

    let Some(latest) = view.latest else {
        return out;
    };

    out.push('\n');
    let cards = kpi_cards(latest);
    let width = cards.iter().map(|c| c.label.len()).max().unwrap_or(0);
    for c in &cards {
        out.push_str(&format!("{:<width$}  {}\n", c.label, c.value, width = width));
    }

    out.push_str("\n== Leaderboard ==\n");
    out.push_str(&pretty(view.leaderboard));
    out.push('\n');

    out.push_str("\n== Decision Logs (Latest Agent) ==\n");
    for line in decision_log_lines(latest) {
        out.push_str(&format!("- {}\n", line));
    }

    out.push_str("\n== Cost Breakdown ==\n");
    out.push_str(&pretty(&latest.cost_breakdown));
    out.push('\n');
    out
}

/// Shortest decimal form: `1000.0` → `1000`, `1.5` → `1.5`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Drops the sign of -0.0
        return "0".to_string();
    }
    format!("{}", value)
}

/// Every f64 has a terminating binary expansion of at most this many
/// fractional decimal digits.
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Fixed-point rounding of the exact binary value, ties away from zero, the
/// way a browser's `toFixed` does: `12.345` gives `12.35` but `1.005` gives
/// `1.00` at two digits.
pub fn format_fixed(value: f64, digits: usize) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let repr = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut decimal: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .map(|b| b - b'0')
        .collect();
    let round_up = frac_part.as_bytes().get(digits).map_or(false, |&b| b >= b'5');
    if round_up {
        let mut i = decimal.len();
        loop {
            if i == 0 {
                decimal.insert(0, 1);
                break;
            }
            i -= 1;
            if decimal[i] == 9 {
                decimal[i] = 0;
            } else {
                decimal[i] += 1;
                break;
            }
        }
    }

    let split = decimal.len() - digits;
    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
    }
    out.extend(decimal[..split].iter().map(|d| char::from(b'0' + d)));
    if digits > 0 {
        out.push('.');
        out.extend(decimal[split..].iter().map(|d| char::from(b'0' + d)));
    }
    out
}
