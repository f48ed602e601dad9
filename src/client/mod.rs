//! Transport to the simulation service.

mod error;
mod http;

use async_trait::async_trait;

use crate::schema::{SimulationRequest, SimulationResponse};

pub use error::{ErrorKind, SimulationError};
pub use http::HttpTransport;

/// A single-shot simulation call: no retry, no cancellation.
#[async_trait]
pub trait SimulationTransport {
    async fn run_simulation(&self, request: &SimulationRequest) -> Result<SimulationResponse, SimulationError>;
}
