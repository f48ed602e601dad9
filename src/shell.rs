//! View-state controller for the dashboard.
//!
//! Holds the last successful response, a busy flag, and the outcome of the
//! most recent run. A run replaces the response wholesale on success and
//! leaves it untouched on failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use crate::client::{ErrorKind, SimulationError, SimulationTransport};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::schema::{AgentRoundResult, SimulationRequest, SimulationResponse};

pub const DEFAULT_DASHBOARD_ROUNDS: u32 = 3;

/// Shared "run in flight" indicator. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> BusyGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(self)
    }
}

/// Clears the flag however the run ends.
struct BusyGuard<'a>(&'a BusyFlag);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

pub type RunOutcome = Result<(), ErrorKind>;

pub struct Dashboard<T> {
    transport: T,
    data: SimulationResponse,
    busy: BusyFlag,
    last_error: Option<SimulationError>,
    last_outcome: Option<RunOutcome>,
}

impl<T: SimulationTransport> Dashboard<T> {
    pub fn new(transport: T) -> Self {
        Self::with_busy_flag(transport, BusyFlag::default())
    }

    /// Build around an existing flag, e.g. one a UI polls.
    pub fn with_busy_flag(transport: T, busy: BusyFlag) -> Self {
        Self {
            transport,
            data: SimulationResponse::default(),
            busy,
            last_error: None,
            last_outcome: None,
        }
    }

    /// Issue one simulation call. `&mut self` rules out overlapping runs.
    pub async fn run(&mut self, request: SimulationRequest) -> RunOutcome {
        let _busy = self.busy.raise();
        log(
            Level::Info,
            Domain::Shell,
            "run_started",
            obj(&[("rounds", json!(request.rounds))]),
        );

        let outcome = match self.transport.run_simulation(&request).await {
            Ok(response) => {
                log(
                    Level::Info,
                    Domain::Shell,
                    "run_succeeded",
                    obj(&[("results", json!(response.results.len()))]),
                );
                self.data = response;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log(
                    Level::Error,
                    Domain::Shell,
                    "run_failed",
                    obj(&[("error", v_str(&err.to_string()))]),
                );
                let kind = err.kind();
                self.last_error = Some(err);
                Err(kind)
            }
        };
        self.last_outcome = Some(outcome);
        outcome
    }

    pub async fn run_rounds(&mut self, rounds: u32) -> RunOutcome {
        self.run(SimulationRequest::with_rounds(rounds)).await
    }
}

impl<T> Dashboard<T> {
    pub fn data(&self) -> &SimulationResponse {
        &self.data
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn last_error(&self) -> Option<&SimulationError> {
        self.last_error.as_ref()
    }

    pub fn last_outcome(&self) -> Option<RunOutcome> {
        self.last_outcome
    }

    pub fn latest(&self) -> Option<&AgentRoundResult> {
        self.data.latest()
    }

    pub fn view(&self) -> DashboardView<'_> {
        DashboardView {
            busy: self.is_busy(),
            error: self.last_error.as_ref(),
            leaderboard: &self.data.leaderboard,
            latest: self.latest(),
        }
    }
}

/// Everything the renderer needs, derived from the controller state.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub busy: bool,
    pub error: Option<&'a SimulationError>,
    pub leaderboard: &'a [Value],
    /// Detail sections render only when this is present.
    pub latest: Option<&'a AgentRoundResult>,
}
