use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use survival_lab::client::HttpTransport;
use survival_lab::config::{ClientConfig, DEFAULT_API_BASE};
use survival_lab::logging::{log, obj, v_str, Domain, Level};
use survival_lab::render::render_dashboard;
use survival_lab::schema::SimulationRequest;
use survival_lab::shell::{Dashboard, DEFAULT_DASHBOARD_ROUNDS};

#[derive(Parser, Debug)]
#[command(
    name = "survival-lab",
    version,
    about = "Run a Hospital AI Survival Lab simulation and show the latest results"
)]
struct Cli {
    /// Base URL of the simulation API; requests go to `{base}/simulate`.
    #[arg(long, env = "SURVIVAL_LAB_API_BASE", default_value = DEFAULT_API_BASE)]
    base_url: String,

    /// Rounds to simulate.
    #[arg(long, default_value_t = DEFAULT_DASHBOARD_ROUNDS)]
    rounds: u32,

    /// Seed for a reproducible run.
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i64>,

    /// Agent to enter; repeat for several. Omit for the service defaults.
    #[arg(long = "agent")]
    agents: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = ClientConfig::new(&cli.base_url).context("invalid --base-url")?;
    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("base_url", v_str(config.base_url()))]),
    );

    let request = SimulationRequest {
        rounds: Some(cli.rounds),
        seed: cli.seed,
        agent_names: if cli.agents.is_empty() { None } else { Some(cli.agents) },
        ..SimulationRequest::default()
    };

    let mut dashboard = Dashboard::new(HttpTransport::new(&config));
    let outcome = dashboard.run(request).await;
    print!("{}", render_dashboard(&dashboard.view(), cli.rounds));

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}
