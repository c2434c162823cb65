//!
//! node/dispatcher.rs
//! Drains the inbox and applies the HS message-handling rules. One
//! background thread per node, single-consumer, fed by every TCP reader
//! thread this node's listener has spawned.
//!
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use log::trace;

use crate::message::{Dir, Message};
use crate::node::report;
use crate::node::state::{Node, Side};

/// An inbound message paired with the ring side it arrived from. `side` is
/// informational only; all routing decisions below use `dir` on the
/// message itself.
#[derive(Debug)]
pub struct Envelope {
    pub message: Message,
    pub side: Side,
}

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(node: Arc<Node>, rx: Receiver<Envelope>) {
    loop {
        if node.has_completed() {
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(envelope) => handle(&node, envelope),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    trace!("node {} dispatcher exiting", node.config.index);
}

fn handle(node: &Arc<Node>, envelope: Envelope) {
    trace!(
        "node {} handling {:?} from side {:?}",
        node.config.index,
        envelope.message,
        envelope.side
    );
    match envelope.message {
        Message::Out {
            uid,
            phase,
            ttl,
            dir,
            ..
        } => handle_out(node, uid, phase, ttl, dir),
        Message::In { uid, phase, dir, .. } => handle_in(node, uid, phase, dir),
        Message::Announce { uid, winner, dir, .. } => handle_announce(node, uid, winner, dir),
        Message::Report { .. } => {}
    }
}

fn handle_out(node: &Arc<Node>, uid: i64, phase: u32, ttl: u64, dir: Dir) {
    if uid < node.config.uid {
        return;
    }
    if uid == node.config.uid {
        if node.claim_victory(phase, uid) {
            announce_victory(node);
        }
        return;
    }
    if ttl > 1 {
        let forwarded = Message::Out {
            uid,
            phase,
            ttl: ttl - 1,
            dir,
            sender_index: node.config.index,
        };
        node.emit_same_side(dir, &forwarded);
    } else {
        let reflected = Message::In {
            uid,
            phase,
            dir,
            sender_index: node.config.index,
        };
        node.emit_opposite_side(dir, &reflected);
    }
}

fn handle_in(node: &Arc<Node>, uid: i64, phase: u32, dir: Dir) {
    if uid != node.config.uid {
        let forwarded = Message::In {
            uid,
            phase,
            dir,
            sender_index: node.config.index,
        };
        node.emit_opposite_side(dir, &forwarded);
        return;
    }
    node.record_ack(phase, dir);
}

fn handle_announce(node: &Arc<Node>, uid: i64, winner: i64, dir: Dir) {
    node.adopt_announced_winner(winner);
    // uid == self.uid means this announcement has made its full circle back
    // to the node that originated it; stop relaying rather than looping.
    if uid != node.config.uid {
        let relayed = Message::Announce {
            uid,
            winner,
            dir,
            sender_index: node.config.index,
        };
        node.emit_same_side(dir, &relayed);
    }
    report::complete(node);
}

fn announce_victory(node: &Arc<Node>) {
    let announce_left = Message::Announce {
        uid: node.config.uid,
        winner: node.config.uid,
        dir: Dir::L,
        sender_index: node.config.index,
    };
    let announce_right = Message::Announce {
        uid: node.config.uid,
        winner: node.config.uid,
        dir: Dir::R,
        sender_index: node.config.index,
    };
    node.emit_same_side(Dir::L, &announce_left);
    node.emit_same_side(Dir::R, &announce_right);
    report::complete(node);
}
