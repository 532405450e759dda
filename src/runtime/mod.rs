//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over the host, so the
//! reconciler can be driven against a mock instead of a real package manager.
//!
//! # Structure
//!
//! - `fs` - Reading argument files
//! - `privilege` - Elevation checks
//! - `process` - Running external programs to completion

mod fs;
mod privilege;
mod process;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A fully described external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Render the command line for log messages.
    pub fn display(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;

    // Processes
    /// Run a program and wait for it to exit.
    ///
    /// A non-zero exit is not an error here; callers inspect
    /// [`CommandOutput::code`]. Failing to start the program is an error.
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;

    // Privilege
    fn is_privileged(&self) -> bool;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.run_impl(invocation)
    }

    fn is_privileged(&self) -> bool {
        self.is_privileged_impl()
    }
}
