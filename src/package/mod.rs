//! Package data model
//!
//! This module defines the desired state of a package as declared by the
//! caller, the closed choice sets its parameters draw from, and version
//! matching used when comparing it against what is installed.

mod spec;
mod state;
mod version;

pub use spec::{ModuleArgs, PackageSpec};
pub use state::{Architecture, DesiredState, Scope};
pub use version::VersionMatcher;
