//!
//! Hirschberg-Sinclair bidirectional-doubling leader election over a
//! logical ring of OS processes communicating by loopback TCP.
//!
pub mod message;
pub mod node;
pub mod orchestrator;
pub mod wire;
