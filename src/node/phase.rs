//!
//! node/phase.rs
//! The phase driver: emits OUT for each successive phase, waits for both
//! acks or a timeout, advances. Runs on its own thread, independent of the
//! dispatcher thread that actually records acks and declares victory.
//!
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{info, trace};

use crate::message::{Dir, Message};
use crate::node::state::{AckState, Node};

/// Grace period before phase 0 begins, giving sibling nodes time to bind
/// their listeners before this node starts probing the ring.
pub const STARTUP_GRACE: Duration = Duration::from_secs(2);
pub const PHASE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub fn run(node: Arc<Node>) {
    std::thread::sleep(STARTUP_GRACE);

    let mut phase: u32 = 0;
    loop {
        if node.has_completed() || node.is_inactive_or_decided() {
            break;
        }

        {
            let mut shared = node.shared.lock().unwrap();
            shared.phase_acks.insert(phase, AckState::default());
        }

        let ttl = 1u64 << phase;
        trace!(
            "node {} entering phase {} with ttl {}",
            node.config.index,
            phase,
            ttl
        );
        emit_probe(&node, phase, ttl);

        if !wait_for_acks(&node, phase) {
            info!(
                "node {} timed out waiting for acks in phase {}, deactivating",
                node.config.index, phase
            );
            node.deactivate();
            break;
        }

        if node.has_completed() || node.is_inactive_or_decided() {
            break;
        }

        {
            let mut shared = node.shared.lock().unwrap();
            shared.phase = phase + 1;
            shared.rounds_for_report = shared.rounds_for_report.max(shared.phase);
        }
        phase += 1;
    }
}

fn emit_probe(node: &Arc<Node>, phase: u32, ttl: u64) {
    let out_left = Message::Out {
        uid: node.config.uid,
        phase,
        ttl,
        dir: Dir::L,
        sender_index: node.config.index,
    };
    let out_right = Message::Out {
        uid: node.config.uid,
        phase,
        ttl,
        dir: Dir::R,
        sender_index: node.config.index,
    };
    node.emit_same_side(Dir::L, &out_left);
    node.emit_same_side(Dir::R, &out_right);
}

/// Blocks until both acks for `phase` arrive, the node completes or is
/// decided, or the phase timeout elapses. Returns false only on timeout.
fn wait_for_acks(node: &Arc<Node>, phase: u32) -> bool {
    let deadline = Instant::now() + PHASE_TIMEOUT;
    loop {
        if node.has_completed() || node.is_inactive_or_decided() {
            return true;
        }
        {
            let shared = node.shared.lock().unwrap();
            if let Some(ack) = shared.phase_acks.get(&phase) {
                if ack.both() {
                    return true;
                }
            }
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::state::NodeConfig;

    #[test]
    fn phase_ttl_doubles_each_round() {
        assert_eq!(1u64 << 0, 1);
        assert_eq!(1u64 << 1, 2);
        assert_eq!(1u64 << 5, 32);
    }

    #[test]
    fn wait_for_acks_returns_true_once_both_recorded() {
        let node = Arc::new(Node::new(NodeConfig::new(3, 0, 10, 50000, 40000)));
        node.record_ack(0, Dir::L);
        node.record_ack(0, Dir::R);
        assert!(wait_for_acks(&node, 0));
    }

    #[test]
    fn wait_for_acks_returns_true_immediately_once_winner_known() {
        let node = Arc::new(Node::new(NodeConfig::new(3, 0, 10, 50000, 40000)));
        node.claim_victory(0, 10);
        assert!(wait_for_acks(&node, 0));
    }
}
