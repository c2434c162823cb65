//!
//! orchestrator/spawn.rs
//! Launches the N node processes for a scenario: one OS process per ring
//! node, each handed its index, ring size, and the two ports it needs.
//!
use std::path::PathBuf;
use std::process::{Child, Command};

use anyhow::{Context, Result};

pub struct SpawnedNode {
    pub index: usize,
    pub uid: i64,
    pub child: Child,
}

pub fn spawn_nodes(n: usize, base_port: u16, orch_port: u16) -> Result<Vec<SpawnedNode>> {
    let exe = node_binary_path();
    let mut nodes = Vec::with_capacity(n);
    for index in 0..n {
        let child = Command::new(&exe)
            .arg("--n")
            .arg(n.to_string())
            .arg("--index")
            .arg(index.to_string())
            .arg("--basePort")
            .arg(base_port.to_string())
            .arg("--orchPort")
            .arg(orch_port.to_string())
            .spawn()
            .with_context(|| format!("failed to spawn node {} ({})", index, exe.display()))?;
        let uid = child.id() as i64;
        nodes.push(SpawnedNode { index, uid, child });
    }
    Ok(nodes)
}

fn node_binary_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_hs-node") {
        return PathBuf::from(path);
    }
    let mut path = std::env::current_exe().expect("failed to locate current executable");
    path.set_file_name(if cfg!(windows) {
        "hs-node.exe"
    } else {
        "hs-node"
    });
    path
}
