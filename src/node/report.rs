//!
//! node/report.rs
//! The completion transition: fires exactly once per node, sends the
//! single REPORT, then signals the listener/dispatcher threads to unwind.
//!
use std::sync::atomic::Ordering;
use std::sync::Arc;

use atomic_counter::AtomicCounter;
use log::info;

use crate::message::Message;
use crate::node::state::Node;

pub fn complete(node: &Arc<Node>) {
    if !node.mark_completed() {
        return;
    }

    let (winner, rounds) = {
        let shared = node.shared.lock().unwrap();
        (shared.winner_uid.unwrap_or(-1), shared.rounds_for_report)
    };

    let report = Message::Report {
        uid: node.config.uid,
        winner,
        rounds,
        messages: node.messages_sent.get() as u64,
    };

    info!(
        "node {} (uid {}) reporting winner={} rounds={}",
        node.config.index, node.config.uid, winner, rounds
    );
    node.send_report(&report);
    node.shutdown.store(true, Ordering::SeqCst);
}
