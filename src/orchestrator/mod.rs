//!
//! orchestrator/mod.rs
//! The orchestrator binary's library surface: spawning nodes, collecting
//! REPORTs, and validating the outcome of one or more scenarios.
//!
pub mod listener;
pub mod scenario;
pub mod spawn;
pub mod validate;

pub use scenario::{Scenario, DEFAULT_SWEEP};
pub use validate::ScenarioResult;
