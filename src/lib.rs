//! winget-state - declarative package state for Windows Package Manager.
//!
//! Given a package identifier and a desired state (`present`, `absent`,
//! `updated`), query winget for what is installed, issue at most one
//! install/uninstall/upgrade command to converge, and report whether
//! anything changed.

pub mod commands;
pub mod error;
pub mod outcome;
pub mod package;
pub mod reconcile;
pub mod runtime;
pub mod winget;

pub use error::ModuleError;
pub use outcome::{Failure, Outcome};
