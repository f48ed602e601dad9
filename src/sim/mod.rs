//! Emergency-room shift simulation.
//!
//! One run covers a single shift: patients arrive every hour, wait in an
//! acuity-ordered queue, and are treated as hourly capacity allows.
//! Disruption events (mass casualty, system outage) slow treatment and
//! raise the error probability while they last.

mod engine;
mod entities;

pub use engine::ErSimulation;
pub use entities::{DisruptionEvent, Patient, Resources, ShiftReport};
