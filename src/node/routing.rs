//!
//! node/routing.rs
//! Directional send helpers. OUT and ANNOUNCE travel forward (each hop
//! sends to the side matching their `dir` label); IN travels backward
//! (each hop sends to the side opposite its `dir` label, which is why the
//! label itself is never flipped in transit).
//!
use std::net::SocketAddr;

use atomic_counter::AtomicCounter;
use log::trace;

use crate::message::{Dir, Message};
use crate::node::state::Node;
use crate::wire::{self, PEER_RETRY, REPORT_RETRY};

impl Node {
    fn peer_addr(&self, index: usize) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], self.config.port_for_index(index)))
    }

    fn send_to_peer(&self, index: usize, message: &Message) {
        let addr = self.peer_addr(index);
        if wire::send_line(addr, message, &PEER_RETRY) {
            self.messages_sent.inc();
        }
    }

    /// Send to the side named by `dir` (L -> left neighbor, R -> right
    /// neighbor). Used for OUT forwarding/emission and ANNOUNCE relay.
    pub fn emit_same_side(&self, dir: Dir, message: &Message) {
        let index = match dir {
            Dir::L => self.config.left_index,
            Dir::R => self.config.right_index,
        };
        trace!("node {} emit_same_side({:?}) -> index {}", self.config.index, dir, index);
        self.send_to_peer(index, message);
    }

    /// Send to the side opposite `dir`. Used to reflect/forward IN
    /// messages back toward their originator.
    pub fn emit_opposite_side(&self, dir: Dir, message: &Message) {
        self.emit_same_side(dir.opposite(), message)
    }

    /// Send this node's single REPORT to the orchestrator. Not counted in
    /// `messages_sent`, which tracks only ring protocol traffic.
    pub fn send_report(&self, message: &Message) {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.config.orch_port));
        wire::send_line(addr, message, &REPORT_RETRY);
    }

    pub fn record_ack(&self, phase: u32, dir: Dir) {
        let mut shared = self.shared.lock().unwrap();
        let entry = shared.phase_acks.entry(phase).or_default();
        match dir {
            Dir::L => entry.left = true,
            Dir::R => entry.right = true,
        }
    }

    /// Enter the winning state if not already in it. Returns whether this
    /// call performed the transition.
    pub fn claim_victory(&self, phase: u32, winner: i64) -> bool {
        let mut shared = self.shared.lock().unwrap();
        if shared.winner_uid.is_some() {
            return false;
        }
        shared.winner_uid = Some(winner);
        shared.rounds_for_report = shared.rounds_for_report.max(phase + 1);
        true
    }

    pub fn adopt_announced_winner(&self, winner: i64) {
        let mut shared = self.shared.lock().unwrap();
        if shared.winner_uid.is_none() {
            shared.winner_uid = Some(winner);
        }
    }

    pub fn deactivate(&self) {
        let mut shared = self.shared.lock().unwrap();
        shared.active = false;
    }

    pub fn is_inactive_or_decided(&self) -> bool {
        let shared = self.shared.lock().unwrap();
        !shared.active || shared.winner_uid.is_some()
    }
}
