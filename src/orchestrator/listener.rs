//!
//! orchestrator/listener.rs
//! Collects REPORT messages from spawned nodes. Bound synchronously by the
//! caller (`scenario::run`) before any node is spawned, so the accept loop
//! itself can run on a background thread without risking a node's REPORT
//! arriving before the port exists.
//!
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::warn;

use crate::message::Message;
use crate::wire;

const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Clone, Copy)]
pub struct ReportRecord {
    pub uid: i64,
    pub winner: i64,
    pub rounds: u32,
    pub messages: u64,
}

pub fn bind(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

pub fn run(listener: TcpListener, tx: Sender<ReportRecord>, shutdown: Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        match listener.accept() {
            Ok((stream, _peer)) => {
                let tx = tx.clone();
                thread::spawn(move || handle_connection(stream, tx));
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => {
                warn!("orchestrator report listener accept error: {}", err);
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
        }
    }
}

fn handle_connection(stream: std::net::TcpStream, tx: Sender<ReportRecord>) {
    wire::read_lines(stream, |message| {
        if let Message::Report {
            uid,
            winner,
            rounds,
            messages,
        } = message
        {
            let _ = tx.send(ReportRecord {
                uid,
                winner,
                rounds,
                messages,
            });
        }
    });
}
