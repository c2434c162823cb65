//!
//! wire.rs
//! TCP framing for the protocol: one JSON object per connection, one
//! connection per message. Sending retries with a fixed backoff so a
//! momentarily-unreachable peer (still starting up, or mid-teardown) does
//! not cost the caller anything beyond the retry window.
//!
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use log::{trace, warn};

use crate::message::Message;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

/// Retry budget for node-to-node protocol traffic (OUT/IN/ANNOUNCE).
pub const PEER_RETRY: RetryPolicy = RetryPolicy {
    max_attempts: 200,
    delay: Duration::from_millis(50),
};

/// Retry budget for a node's single REPORT to the orchestrator.
pub const REPORT_RETRY: RetryPolicy = RetryPolicy {
    max_attempts: 100,
    delay: Duration::from_millis(100),
};

/// Open a fresh connection to `addr`, write `message` as one JSON line, and
/// close. Retries up to `policy.max_attempts` times with a fixed delay
/// between attempts. Returns whether the write ultimately succeeded; a
/// `false` result is never fatal to the caller (an unreachable peer is
/// tolerated for the retry window and then simply given up on).
pub fn send_line(addr: SocketAddr, message: &Message, policy: &RetryPolicy) -> bool {
    let body = match message.to_line() {
        Ok(body) => body,
        Err(err) => {
            warn!("failed to serialize message for {}: {}", addr, err);
            return false;
        }
    };

    for attempt in 0..policy.max_attempts {
        match TcpStream::connect(addr) {
            Ok(mut stream) => {
                let sent = stream
                    .write_all(body.as_bytes())
                    .and_then(|_| stream.write_all(b"\n"))
                    .and_then(|_| stream.flush());
                if sent.is_ok() {
                    trace!("sent to {} on attempt {}: {}", addr, attempt + 1, body);
                    return true;
                }
            }
            Err(_err) => {}
        }
        thread::sleep(policy.delay);
    }

    warn!(
        "giving up on {} after {} attempts: {}",
        addr, policy.max_attempts, body
    );
    false
}

/// Read newline-delimited JSON messages from an already-accepted stream,
/// calling `on_message` for each line that parses. Malformed lines are
/// dropped silently and reading continues; the loop ends when the peer
/// closes the connection (every sender in this protocol writes exactly one
/// message per connection, so this is the normal, expected end).
pub fn read_lines<F: FnMut(Message)>(stream: TcpStream, mut on_message: F) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_err) => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        match Message::from_line(&line) {
            Ok(message) => on_message(message),
            Err(_err) => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Dir;
    use std::net::TcpListener;
    use std::sync::mpsc;

    #[test]
    fn send_line_delivers_one_message_per_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            read_lines(stream, |msg| {
                tx.send(msg).unwrap();
            });
        });

        let msg = Message::Out {
            uid: 9,
            phase: 0,
            ttl: 1,
            dir: Dir::L,
            sender_index: 0,
        };
        assert!(send_line(addr, &msg, &PEER_RETRY));

        let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        match received {
            Message::Out { uid, .. } => assert_eq!(uid, 9),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn send_line_gives_up_when_nothing_is_listening() {
        let policy = RetryPolicy {
            max_attempts: 2,
            delay: Duration::from_millis(1),
        };
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let msg = Message::Report {
            uid: 1,
            winner: 1,
            rounds: 1,
            messages: 0,
        };
        assert!(!send_line(addr, &msg, &policy));
    }
}
