//!
//! bin/node.rs
//! Thin CLI shim around `hs_ring_election::node::run`.
//!
use clap::Parser;

use hs_ring_election::node::{self, NodeOptions};

/// One ring node in a Hirschberg-Sinclair leader election scenario.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct NodeArgs {
    /// Number of nodes in the ring.
    #[arg(long)]
    n: usize,

    /// This node's index in the ring, in 0..n.
    #[arg(long)]
    index: usize,

    /// Base port; this node listens on basePort + index.
    #[arg(long = "basePort")]
    base_port: u16,

    /// Port the orchestrator listens on for REPORT messages.
    #[arg(long = "orchPort")]
    orch_port: u16,

    /// Increase log verbosity; repeatable.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = match NodeArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    stderrlog::new()
        .module(module_path!())
        .module("hs_ring_election")
        .quiet(false)
        .timestamp(stderrlog::Timestamp::Millisecond)
        .verbosity(args.verbose as usize + 2)
        .init()
        .expect("failed to initialize logging");

    let opts = NodeOptions {
        n: args.n,
        index: args.index,
        base_port: args.base_port,
        orch_port: args.orch_port,
    };

    match node::run(opts) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("error: {:#}", err);
            std::process::exit(1);
        }
    }
}
