//!
//! End-to-end scenarios driving the real compiled binaries over real
//! loopback TCP. Each test picks a disjoint port block so tests can run
//! concurrently.
//!
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn run_orchestrator(n: usize, base_port: u16, orch_port: u16) -> (bool, String) {
    let exe = env!("CARGO_BIN_EXE_hs-orchestrator");
    let mut child = Command::new(exe)
        .arg("--n")
        .arg(n.to_string())
        .arg("--basePort")
        .arg(base_port.to_string())
        .arg("--orchPort")
        .arg(orch_port.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn hs-orchestrator");

    let deadline = Instant::now() + Duration::from_secs(60);
    let status = loop {
        if let Some(status) = child.try_wait().expect("failed to poll child") {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            panic!("orchestrator for n={} did not finish within the test deadline", n);
        }
        std::thread::sleep(Duration::from_millis(100));
    };

    let mut stdout = String::new();
    child
        .stdout
        .take()
        .expect("orchestrator stdout was not captured")
        .read_to_string(&mut stdout)
        .expect("failed to read orchestrator stdout");

    (status.success(), stdout)
}

fn assert_self_check_pass(stdout: &str) {
    assert!(
        stdout.contains("SelfCheck=PASS"),
        "expected SelfCheck=PASS in orchestrator output, got:\n{}",
        stdout
    );
}

#[test]
fn single_node_ring_elects_itself() {
    let (success, stdout) = run_orchestrator(1, 56000, 46000);
    assert!(success, "orchestrator exited non-zero:\n{}", stdout);
    assert!(stdout.contains("Rounds=1"), "expected Rounds=1 for N=1:\n{}", stdout);
    assert_self_check_pass(&stdout);
}

#[test]
fn two_node_ring_agrees_on_a_single_winner() {
    let (success, stdout) = run_orchestrator(2, 56100, 46100);
    assert!(success, "orchestrator exited non-zero:\n{}", stdout);
    assert_self_check_pass(&stdout);
}

#[test]
fn small_ring_elects_the_maximum_uid() {
    let (success, stdout) = run_orchestrator(5, 56200, 46200);
    assert!(success, "orchestrator exited non-zero:\n{}", stdout);
    assert_self_check_pass(&stdout);
}

#[test]
fn medium_ring_completes_within_the_scenario_deadline() {
    let (success, stdout) = run_orchestrator(15, 56300, 46300);
    assert!(success, "orchestrator exited non-zero:\n{}", stdout);
    assert_self_check_pass(&stdout);
}
