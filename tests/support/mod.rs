//! Test support utilities for opsdeck integration tests.
//!
//! Provides reusable test environment setup and helper commands.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use tempfile::TempDir;

/// Test environment with an isolated temp directory.
///
/// No process-global state is mutated — child processes use
/// `.current_dir()` so tests can safely run in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    ///
    /// Does NOT change the process working directory — child commands
    /// use `.current_dir()` for isolation instead.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with opsdeck initialized.
    pub fn init() -> Self {
        let t = Self::new();
        let output = t.init_cmd();
        assert!(
            output.status.success(),
            "Failed to initialize opsdeck: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        t
    }
}
