//! Shared helpers for spawning the `kickoff` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Path to a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Runs `kickoff` with `args` and closed stdin, and waits for it.
pub fn kickoff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kickoff"))
        .args(args)
        .env_remove("KICKOFF_CONFIG")
        .env_remove("KICKOFF_LOG_LEVEL")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run kickoff")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Parses stdout as one JSON document.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!("stdout is not JSON ({e}):\n{}", stdout(output));
    })
}
