//!
//! node/listener.rs
//! Accept loop for inbound ring traffic. The listener runs in nonblocking
//! mode and polls a shutdown flag between accepts instead of blocking on
//! `accept()` forever, so it can be cancelled promptly.
//!
use std::net::TcpListener;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{trace, warn};

use crate::node::state::Node;
use crate::wire;

use super::dispatcher::Envelope;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

pub fn bind(node: &Node) -> std::io::Result<TcpListener> {
    let addr = format!("127.0.0.1:{}", node.config.listen_port());
    let listener = TcpListener::bind(&addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

pub fn run(node: Arc<Node>, listener: TcpListener, inbox_tx: Sender<Envelope>) {
    trace!("node {} listener accepting on {:?}", node.config.index, listener.local_addr());
    loop {
        if node.is_shutting_down() {
            break;
        }
        match listener.accept() {
            Ok((stream, _peer)) => {
                let node = Arc::clone(&node);
                let tx = inbox_tx.clone();
                thread::spawn(move || handle_connection(node, stream, tx));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => {
                warn!("node {} accept error: {}", node.config.index, err);
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
    trace!("node {} listener exiting", node.config.index);
}

fn handle_connection(node: Arc<Node>, stream: std::net::TcpStream, tx: Sender<Envelope>) {
    wire::read_lines(stream, |message| {
        let side = node.config.side_of(message.sender_index());
        let _ = tx.send(Envelope { message, side });
    });
}
