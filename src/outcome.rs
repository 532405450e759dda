//! Result documents returned to the automation controller.

use serde::Serialize;

use crate::error::ModuleError;

/// Reconciliation outcome: whether anything changed and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub changed: bool,
    pub msg: String,
}

impl Outcome {
    pub fn changed(msg: impl Into<String>) -> Self {
        Self {
            changed: true,
            msg: msg.into(),
        }
    }

    pub fn unchanged(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            msg: msg.into(),
        }
    }
}

/// Failure document. Never reports a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub changed: bool,
    pub failed: bool,
    pub msg: String,
    /// Package manager exit code, for operation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rc: Option<i32>,
}

impl Failure {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: msg.into(),
            rc: None,
        }
    }

    /// Render an error chain into a failure document.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut failure = Self::new(format!("{:#}", err));
        if let Some(ModuleError::Operation { code, .. }) = err.downcast_ref::<ModuleError>() {
            failure.rc = *code;
        }
        failure
    }
}
