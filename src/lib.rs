//! planq - persistent planning queue and slot estimator
//!
//! planq coordinates access to a scarce, externally rate-limited AI planning
//! service shared with callers it cannot see. It keeps a durable retry queue
//! and infers remaining capacity from its own attempt history plus a
//! best-effort external activity signal.

pub mod cli;
pub mod config;
pub mod error;
pub mod probe;
pub mod slots;
pub mod store;

pub use error::{PlanqError, Result};
