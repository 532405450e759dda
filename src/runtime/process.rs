//! Process execution.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::process::Command;

use super::{CommandOutput, Invocation, RealRuntime};
use crate::error::ModuleError;

impl RealRuntime {
    #[tracing::instrument(skip(self), fields(program = %invocation.program.display()))]
    pub(crate) fn run_impl(&self, invocation: &Invocation) -> Result<CommandOutput> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k, v)))
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ModuleError::Environment(format!(
                    "Package manager '{}' was not found. Is it installed and on PATH?",
                    invocation.program.display()
                ))
                .into());
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(ModuleError::Environment(format!(
                    "Package manager '{}' is not executable: {}",
                    invocation.program.display(),
                    e
                ))
                .into());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to execute {}", invocation.display()));
            }
        };

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ModuleError;
    use crate::runtime::{Invocation, RealRuntime, Runtime};

    #[test]
    fn test_missing_program_is_environment_error() {
        let runtime = RealRuntime;
        let inv = Invocation::new("winget-state-no-such-program").arg("list");

        let err = runtime.run(&inv).unwrap_err();
        match err.downcast_ref::<ModuleError>() {
            Some(ModuleError::Environment(msg)) => {
                assert!(msg.contains("winget-state-no-such-program"));
            }
            other => panic!("Expected environment error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_exit_code_and_streams() {
        let runtime = RealRuntime;
        let inv = Invocation::new("sh")
            .arg("-c")
            .arg("echo out; echo err >&2; echo \"$GREETING\"; exit 3")
            .env("GREETING", "hello");

        let output = runtime.run(&inv).unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout, "out\nhello\n");
        assert_eq!(output.stderr, "err\n");
    }
}
