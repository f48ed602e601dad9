//! Offline multi-agent benchmark; prints the per-round history as JSON.
//! Usage: simulation_loop [rounds=5] [seed=7]

use std::path::Path;

use anyhow::{Context, Result};
use survival_lab::config::LabConfig;
use survival_lab::lab::SurvivalLab;

fn main() -> Result<()> {
    let rounds: u32 = match std::env::args().nth(1) {
        Some(raw) => raw.parse().with_context(|| format!("bad rounds `{}`", raw))?,
        None => 5,
    };
    let seed: u64 = match std::env::args().nth(2) {
        Some(raw) => raw.parse().with_context(|| format!("bad seed `{}`", raw))?,
        None => 7,
    };
    let config_path = std::env::var("LAB_CONFIG_PATH")
        .unwrap_or_else(|_| "configs/economic_config.json".to_string());

    let lab = SurvivalLab::new(LabConfig::load_or_default(Path::new(&config_path))?);
    let history = lab.run_benchmark(rounds, seed);
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}
