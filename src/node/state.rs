//!
//! node/state.rs
//! Shared per-node state: ring topology, phase bookkeeping, and the atomics
//! that cross thread boundaries. One struct holds everything a node's
//! listener, dispatcher and phase-driver threads touch concurrently.
//!
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use atomic_counter::RelaxedCounter;

/// Which ring neighbor a message is associated with. Derived from the
/// sender's advertised ring index; purely informational bookkeeping (the
/// protocol's actual routing decisions are driven by the `dir` field
/// carried on each message, not by this value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Unknown,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AckState {
    pub left: bool,
    pub right: bool,
}

impl AckState {
    pub fn both(&self) -> bool {
        self.left && self.right
    }
}

/// Static per-node configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub n: usize,
    pub index: usize,
    pub uid: i64,
    pub base_port: u16,
    pub orch_port: u16,
    pub left_index: usize,
    pub right_index: usize,
}

impl NodeConfig {
    pub fn new(n: usize, index: usize, uid: i64, base_port: u16, orch_port: u16) -> Self {
        let left_index = (index + n - 1) % n;
        let right_index = (index + 1) % n;
        NodeConfig {
            n,
            index,
            uid,
            base_port,
            orch_port,
            left_index,
            right_index,
        }
    }

    pub fn port_for_index(&self, index: usize) -> u16 {
        self.base_port + index as u16
    }

    pub fn listen_port(&self) -> u16 {
        self.port_for_index(self.index)
    }

    pub fn side_of(&self, sender_index: Option<usize>) -> Side {
        match sender_index {
            Some(i) if i == self.left_index => Side::Left,
            Some(i) if i == self.right_index => Side::Right,
            _ => Side::Unknown,
        }
    }
}

/// Mutable state protected by a single mutex: the phase counter, the
/// active/winner flags, and the per-phase ack table all co-vary, so one
/// lock covers all of them.
#[derive(Debug, Default)]
pub struct NodeShared {
    pub phase: u32,
    pub active: bool,
    pub winner_uid: Option<i64>,
    pub phase_acks: HashMap<u32, AckState>,
    pub rounds_for_report: u32,
}

impl NodeShared {
    pub fn new() -> Self {
        NodeShared {
            phase: 0,
            active: true,
            winner_uid: None,
            phase_acks: HashMap::new(),
            rounds_for_report: 0,
        }
    }
}

/// The full shared context a node's threads operate on.
pub struct Node {
    pub config: NodeConfig,
    pub shared: Mutex<NodeShared>,
    pub messages_sent: RelaxedCounter,
    pub completion_flag: AtomicBool,
    pub shutdown: AtomicBool,
}

impl Node {
    pub fn new(config: NodeConfig) -> Self {
        Node {
            config,
            shared: Mutex::new(NodeShared::new()),
            messages_sent: RelaxedCounter::new(0),
            completion_flag: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn has_completed(&self) -> bool {
        self.completion_flag.load(Ordering::SeqCst)
    }

    /// Single-shot transition into the completed state. Returns true the
    /// first time it is called for this node, false on every call after.
    pub fn mark_completed(&self) -> bool {
        self.completion_flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_neighbors_wrap_around() {
        let cfg = NodeConfig::new(5, 0, 100, 50000, 40000);
        assert_eq!(cfg.left_index, 4);
        assert_eq!(cfg.right_index, 1);

        let cfg = NodeConfig::new(5, 4, 100, 50000, 40000);
        assert_eq!(cfg.left_index, 3);
        assert_eq!(cfg.right_index, 0);
    }

    #[test]
    fn single_node_ring_is_its_own_neighbor() {
        let cfg = NodeConfig::new(1, 0, 100, 50000, 40000);
        assert_eq!(cfg.left_index, 0);
        assert_eq!(cfg.right_index, 0);
    }

    #[test]
    fn side_of_classifies_by_configured_neighbor_index() {
        let cfg = NodeConfig::new(5, 2, 100, 50000, 40000);
        assert_eq!(cfg.side_of(Some(1)), Side::Left);
        assert_eq!(cfg.side_of(Some(3)), Side::Right);
        assert_eq!(cfg.side_of(Some(0)), Side::Unknown);
        assert_eq!(cfg.side_of(None), Side::Unknown);
    }

    #[test]
    fn completion_flag_is_single_shot() {
        let node = Node::new(NodeConfig::new(3, 0, 1, 50000, 40000));
        assert!(node.mark_completed());
        assert!(!node.mark_completed());
        assert!(node.has_completed());
    }

    #[test]
    fn ack_state_both_requires_both_sides() {
        let mut ack = AckState::default();
        assert!(!ack.both());
        ack.left = true;
        assert!(!ack.both());
        ack.right = true;
        assert!(ack.both());
    }
}
