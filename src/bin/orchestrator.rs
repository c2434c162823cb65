//!
//! bin/orchestrator.rs
//! Launches and validates one scenario, or the default sweep. A ctrl-c
//! handler flips a shared flag so the sweep stops cleanly between
//! scenarios instead of leaving orphaned node processes behind.
//!
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::warn;

use hs_ring_election::orchestrator::{self, Scenario, DEFAULT_SWEEP};

/// Launches N ring nodes and validates that they agree on a single,
/// correct leader.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct OrchestratorArgs {
    /// Number of nodes to launch. Omit to be prompted; 0 runs the default
    /// scenario sweep instead of a single scenario.
    #[arg(long)]
    n: Option<usize>,

    /// Base port for node listeners, when running a single scenario.
    #[arg(long = "basePort", default_value_t = 50000)]
    base_port: u16,

    /// Port the orchestrator itself listens on, when running a single
    /// scenario.
    #[arg(long = "orchPort", default_value_t = 40000)]
    orch_port: u16,

    /// Increase log verbosity; repeatable.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = OrchestratorArgs::parse();

    stderrlog::new()
        .module(module_path!())
        .module("hs_ring_election")
        .quiet(false)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .verbosity(args.verbose as usize + 2)
        .init()
        .expect("failed to initialize logging");

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        warn!("interrupted, finishing the in-flight scenario and stopping");
        handler_flag.store(false, Ordering::SeqCst);
    })
    .expect("failed to install ctrl-c handler");

    let n = args.n.unwrap_or_else(prompt_for_n);

    let scenarios: Vec<Scenario> = if n == 0 {
        DEFAULT_SWEEP.to_vec()
    } else {
        vec![Scenario {
            n,
            base_port: args.base_port,
            orch_port: args.orch_port,
        }]
    };

    let mut overall_pass = true;
    for scenario in &scenarios {
        if !running.load(Ordering::SeqCst) {
            warn!("sweep interrupted before running all scenarios");
            overall_pass = false;
            break;
        }
        match orchestrator::scenario::run(scenario) {
            Ok(result) => {
                if !result.pass {
                    overall_pass = false;
                }
            }
            Err(err) => {
                eprintln!("scenario n={} failed to run: {:#}", scenario.n, err);
                overall_pass = false;
            }
        }
    }

    println!("OverallSelfCheck={}", if overall_pass { "PASS" } else { "FAIL" });
    std::process::exit(if overall_pass { 0 } else { 1 });
}

fn prompt_for_n() -> usize {
    print!("Enter N (0 for the default scenario sweep): ");
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .expect("failed to read N from stdin");
    line.trim().parse().unwrap_or(0)
}
