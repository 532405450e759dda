//! Error taxonomy for a single reconciliation.

/// Errors that terminate an invocation.
///
/// Everything else is propagated as a plain [`anyhow::Error`]; these variants
/// exist so callers can tell bad input from a broken host from a failed
/// package-manager command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Missing or out-of-range parameter, caught before any process runs.
    Validation(String),
    /// The package manager could not be started.
    Environment(String),
    /// The package manager ran and reported failure.
    Operation {
        message: String,
        code: Option<i32>,
    },
}

impl ModuleError {
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleError::Validation(_) => "validation",
            ModuleError::Environment(_) => "environment",
            ModuleError::Operation { .. } => "operation",
        }
    }
}

impl std::fmt::Display for ModuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleError::Validation(msg) => write!(f, "Invalid parameters: {}", msg),
            ModuleError::Environment(msg) => write!(f, "{}", msg),
            ModuleError::Operation { message, .. } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ModuleError {}
