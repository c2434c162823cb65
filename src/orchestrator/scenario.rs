//!
//! orchestrator/scenario.rs
//! Runs one scenario end to end: bind the report listener, spawn N nodes,
//! collect REPORTs within the scenario deadline, wait for child exit, then
//! validate and print the verdict.
//!
use std::net::SocketAddr;
use std::process::ExitStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::orchestrator::listener::{self, ReportRecord};
use crate::orchestrator::spawn::{self, SpawnedNode};
use crate::orchestrator::validate::{self, ScenarioResult};

/// One scenario to run: N nodes, the port block they listen on, and the
/// port the orchestrator collects REPORTs on.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub n: usize,
    pub base_port: u16,
    pub orch_port: u16,
}

/// Default scenario sweep: a handful of ring sizes that exercise small,
/// medium and large rings without any two scenarios colliding on ports.
pub const DEFAULT_SWEEP: &[Scenario] = &[
    Scenario { n: 10, base_port: 51000, orch_port: 41000 },
    Scenario { n: 20, base_port: 52000, orch_port: 42000 },
    Scenario { n: 50, base_port: 53000, orch_port: 43000 },
    Scenario { n: 100, base_port: 54000, orch_port: 44000 },
    Scenario { n: 200, base_port: 55000, orch_port: 45000 },
];

const SCENARIO_DEADLINE: Duration = Duration::from_secs(30);
const CHILD_WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const REPORT_POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn run(scenario: &Scenario) -> Result<ScenarioResult> {
    info!(
        "scenario starting: n={} basePort={} orchPort={}",
        scenario.n, scenario.base_port, scenario.orch_port
    );

    let addr = SocketAddr::from(([127, 0, 0, 1], scenario.orch_port));
    let bound = listener::bind(addr)
        .with_context(|| format!("failed to bind orchestrator report port {}", scenario.orch_port))?;

    let (tx, rx) = mpsc::channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let listener_shutdown = Arc::clone(&shutdown);
    let listener_handle = thread::spawn(move || listener::run(bound, tx, listener_shutdown));

    let mut nodes: Vec<SpawnedNode> =
        spawn::spawn_nodes(scenario.n, scenario.base_port, scenario.orch_port)
            .context("failed to spawn nodes")?;
    let expected_uids: Vec<i64> = nodes.iter().map(|node| node.uid).collect();
    info!("scenario spawned {} nodes, uids={:?}", nodes.len(), expected_uids);

    let reports = collect_reports(&rx, scenario.n);
    shutdown.store(true, Ordering::SeqCst);
    let _ = listener_handle.join();

    let all_exited_cleanly = wait_for_children(&mut nodes);

    let result = validate::validate(&expected_uids, &reports, all_exited_cleanly);
    print_result(scenario, &result);
    Ok(result)
}

fn collect_reports(rx: &mpsc::Receiver<ReportRecord>, n: usize) -> Vec<ReportRecord> {
    let deadline = Instant::now() + SCENARIO_DEADLINE;
    let mut reports = Vec::with_capacity(n);
    while reports.len() < n && Instant::now() < deadline {
        match rx.recv_timeout(REPORT_POLL_INTERVAL) {
            Ok(report) => reports.push(report),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    if reports.len() < n {
        warn!(
            "scenario deadline reached with only {}/{} reports received",
            reports.len(),
            n
        );
    }
    reports
}

fn wait_for_children(nodes: &mut [SpawnedNode]) -> bool {
    let mut all_exited_cleanly = true;
    for node in nodes.iter_mut() {
        match wait_with_timeout(node, CHILD_WAIT_TIMEOUT) {
            Some(status) if status.success() => {}
            Some(_) => all_exited_cleanly = false,
            None => {
                warn!("node {} did not exit within the wait window, killing it", node.index);
                all_exited_cleanly = false;
                let _ = node.child.kill();
                let _ = node.child.wait();
            }
        }
    }
    all_exited_cleanly
}

fn wait_with_timeout(node: &mut SpawnedNode, timeout: Duration) -> Option<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(Some(status)) = node.child.try_wait() {
            return Some(status);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn print_result(scenario: &Scenario, result: &ScenarioResult) {
    println!("N={}", scenario.n);
    println!("UIDs={:?}", result.expected_uids);
    println!(
        "WinnerUID={}",
        result
            .winner
            .map(|uid| uid.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("Rounds={}", result.rounds);
    println!("TotalMessages={}", result.total_messages);
    println!("SelfCheck={}", if result.pass { "PASS" } else { "FAIL" });
}
