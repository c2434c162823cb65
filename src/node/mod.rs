//!
//! node/mod.rs
//! Wires together the listener, dispatcher and phase driver into a single
//! runnable node process.
//!
pub mod dispatcher;
pub mod listener;
pub mod phase;
pub mod report;
pub mod routing;
pub mod state;

use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use atomic_counter::AtomicCounter;
use log::info;

pub use state::{Node, NodeConfig};

#[derive(Debug, Clone)]
pub struct NodeOptions {
    pub n: usize,
    pub index: usize,
    pub base_port: u16,
    pub orch_port: u16,
}

const MONITOR_INTERVAL: Duration = Duration::from_millis(50);

/// Runs a single ring node to completion: binds its listener, starts the
/// dispatcher and phase driver, waits for the node to either report a
/// winner or time out inactive, then unwinds all threads and returns.
pub fn run(opts: NodeOptions) -> Result<()> {
    if opts.n == 0 {
        bail!("n must be at least 1");
    }
    if opts.index >= opts.n {
        bail!("index {} is out of range for n={}", opts.index, opts.n);
    }

    let uid = std::process::id() as i64;
    let config = NodeConfig::new(opts.n, opts.index, uid, opts.base_port, opts.orch_port);
    info!(
        "node {} starting: uid={} n={} leftIndex={} rightIndex={}",
        config.index, config.uid, config.n, config.left_index, config.right_index
    );

    let node = Arc::new(Node::new(config));
    let bound = listener::bind(&node)
        .with_context(|| format!("node {} failed to bind its listener port", node.config.index))?;

    let (tx, rx) = mpsc::channel();

    let listener_node = Arc::clone(&node);
    let listener_handle = thread::spawn(move || listener::run(listener_node, bound, tx));

    let dispatcher_node = Arc::clone(&node);
    let dispatcher_handle = thread::spawn(move || dispatcher::run(dispatcher_node, rx));

    let phase_node = Arc::clone(&node);
    let phase_handle = thread::spawn(move || phase::run(phase_node));

    // Waits for either outcome: the node completed (a REPORT was sent,
    // normal win path) or the phase driver gave up (active went false,
    // timeout path, no REPORT is ever sent for this node).
    loop {
        if node.has_completed() {
            break;
        }
        let inactive = {
            let shared = node.shared.lock().unwrap();
            !shared.active
        };
        if inactive {
            break;
        }
        thread::sleep(MONITOR_INTERVAL);
    }

    node.shutdown.store(true, Ordering::SeqCst);

    let _ = phase_handle.join();
    let _ = dispatcher_handle.join();
    let _ = listener_handle.join();

    info!(
        "node {} exiting: winner={:?} messagesSent={}",
        node.config.index,
        node.shared.lock().unwrap().winner_uid,
        node.messages_sent.get()
    );
    Ok(())
}
