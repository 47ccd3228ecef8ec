//! The cart lifecycle engine.
//!
//! Five operations over the [`CartStore`](trolley_core::store::CartStore)
//! abstraction: activity recording, heartbeats, the abandonment sweep, the
//! recovery run, and manual resolution. Each inbound call is a stateless,
//! short-lived unit of work; the sweep and recovery runs are batch jobs
//! invoked by an external time trigger, bounded by explicit limits, and
//! tolerant of per-record failures.

pub mod heartbeat;
pub mod recorder;
pub mod resolve;
pub mod scheduler;
pub mod sweeper;

pub use heartbeat::{HeartbeatOutcome, heartbeat};
pub use recorder::{ActivityInput, RecordOutcome, record};
pub use scheduler::{RecoveryOutcome, RecoverySettings, run_recovery};
pub use sweeper::{SweepOutcome, pending_sweep, sweep};

#[cfg(test)]
mod tests;
