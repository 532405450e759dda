//! Package manager backends.
//!
//! [`PackageManager`] is the seam the reconciler talks to; [`Winget`] drives
//! the Windows Package Manager CLI through a [`Runtime`].

pub mod args;
pub mod exit_code;
mod table;

use anyhow::Result;
use log::{debug, info};
use std::path::PathBuf;

use crate::error::ModuleError;
use crate::package::PackageSpec;
use crate::runtime::{CommandOutput, Invocation, Runtime};

pub use table::{find_package, parse_list};

/// A package as reported installed by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstalledPackage {
    pub id: String,
    pub name: String,
    pub version: String,
    /// Newer version the package manager offers, if any.
    pub available: Option<String>,
    pub source: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageManager {
    /// Look up the installed package matching `spec`, if any.
    fn query(&self, spec: &PackageSpec) -> Result<Option<InstalledPackage>>;

    /// Install the package. Returns false if it turned out to be installed already.
    fn install(&self, spec: &PackageSpec) -> Result<bool>;

    fn uninstall(&self, spec: &PackageSpec) -> Result<()>;

    /// Upgrade the package. Returns false if there was nothing to upgrade.
    fn upgrade(&self, spec: &PackageSpec) -> Result<bool>;
}

/// The `winget` command-line client.
pub struct Winget<'a, R: Runtime> {
    runtime: &'a R,
    program: PathBuf,
}

impl<'a, R: Runtime> Winget<'a, R> {
    pub fn new(runtime: &'a R, program: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            program: program.into(),
        }
    }

    /// Build an invocation with console decorations and prompts disabled.
    fn invocation(&self, args: Vec<String>) -> Invocation {
        Invocation::new(&self.program)
            .args(args)
            .env("NO_COLOR", "1")
            .env("TERM", "dumb")
            .env("WINGET_DISABLE_INTERACTIVITY", "1")
    }

    fn execute(&self, args: Vec<String>) -> Result<CommandOutput> {
        let invocation = self.invocation(args);
        debug!("Running {}", invocation.display());
        let output = self.runtime.run(&invocation)?;
        debug!(
            "winget exited with {}",
            exit_code::format_code(output.code)
        );
        Ok(output)
    }

    fn operation_error(output: &CommandOutput) -> anyhow::Error {
        ModuleError::Operation {
            message: exit_code::diagnostic(output),
            code: output.code,
        }
        .into()
    }
}

impl<R: Runtime> PackageManager for Winget<'_, R> {
    fn query(&self, spec: &PackageSpec) -> Result<Option<InstalledPackage>> {
        let output = self.execute(args::list(spec))?;

        if !output.success() {
            if exit_code::is_not_installed(&output) {
                debug!("{} is not installed", spec.app_id);
                return Ok(None);
            }
            return Err(Self::operation_error(&output));
        }

        match parse_list(&output.stdout).and_then(|rows| find_package(rows, &spec.app_id)) {
            Some(pkg) => {
                debug!(
                    "{} is installed at version {} (available: {:?})",
                    pkg.id, pkg.version, pkg.available
                );
                Ok(Some(pkg))
            }
            None if exit_code::is_not_installed(&output) => {
                debug!("{} is not installed", spec.app_id);
                Ok(None)
            }
            // A successful list we cannot read must not pass for "not installed".
            None => Err(ModuleError::Operation {
                message: format!(
                    "Could not read the installed state of {} from winget list: {}",
                    spec.app_id,
                    exit_code::diagnostic(&output)
                ),
                code: output.code,
            }
            .into()),
        }
    }

    fn install(&self, spec: &PackageSpec) -> Result<bool> {
        info!("Installing {}", spec);
        let output = self.execute(args::install(spec))?;
        if exit_code::is_already_installed(&output) {
            info!("{} is already installed", spec.app_id);
            return Ok(false);
        }
        if !output.success() {
            return Err(Self::operation_error(&output));
        }
        Ok(true)
    }

    fn uninstall(&self, spec: &PackageSpec) -> Result<()> {
        info!("Uninstalling {}", spec);
        let output = self.execute(args::uninstall(spec))?;
        if !output.success() {
            return Err(Self::operation_error(&output));
        }
        Ok(())
    }

    fn upgrade(&self, spec: &PackageSpec) -> Result<bool> {
        info!("Upgrading {}", spec);
        let output = self.execute(args::upgrade(spec))?;
        if exit_code::is_upgrade_not_applicable(&output) {
            info!("No applicable upgrade for {}", spec.app_id);
            return Ok(false);
        }
        if !output.success() {
            return Err(Self::operation_error(&output));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{DesiredState, Scope};
    use crate::runtime::MockRuntime;

    fn output(code: i32, stdout: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    fn spec() -> PackageSpec {
        PackageSpec::new("VideoLAN.VLC", DesiredState::Present)
    }

    /// Expect exactly one run whose first argument is `subcommand`.
    fn expect_run(runtime: &mut MockRuntime, subcommand: &'static str, result: CommandOutput) {
        runtime
            .expect_run()
            .withf(move |inv| inv.args.first().map(String::as_str) == Some(subcommand))
            .times(1)
            .returning(move |_| Ok(result.clone()));
    }

    #[test]
    fn test_invocation_disables_interactivity() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .withf(|inv| {
                inv.program == PathBuf::from("C:/tools/winget.exe")
                    && inv.envs.contains(&("WINGET_DISABLE_INTERACTIVITY".into(), "1".into()))
                    && inv.envs.contains(&("NO_COLOR".into(), "1".into()))
                    && inv.envs.contains(&("TERM".into(), "dumb".into()))
            })
            .times(1)
            .returning(|_| Ok(output(0, "")));

        let winget = Winget::new(&runtime, "C:/tools/winget.exe");
        winget.uninstall(&spec()).unwrap();
    }

    #[test]
    fn test_query_installed() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(
                0,
                "Name              Id            Version Available Source\n\
                 --------------------------------------------------------\n\
                 VLC media player  VideoLAN.VLC  3.0.18  3.0.20    winget\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        let pkg = winget.query(&spec()).unwrap().unwrap();
        assert_eq!(pkg.version, "3.0.18");
        assert_eq!(pkg.available.as_deref(), Some("3.0.20"));
    }

    #[test]
    fn test_query_reads_header_in_other_case() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(
                0,
                "Name              ID            Version Quelle\n\
                 ----------------------------------------------\n\
                 VLC media player  VideoLAN.VLC  3.0.20  winget\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        let pkg = winget.query(&spec()).unwrap().unwrap();
        assert_eq!(pkg.id, "VideoLAN.VLC");
        assert_eq!(pkg.version, "3.0.20");
    }

    #[test]
    fn test_query_unreadable_success_output_is_error() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(
                0,
                "Nom               Paquet        Révision\n\
                 ----------------------------------------\n\
                 VLC media player  VideoLAN.VLC  3.0.20\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        let err = winget.query(&spec()).unwrap_err();
        match err.downcast_ref::<ModuleError>() {
            Some(ModuleError::Operation { message, code }) => {
                assert_eq!(*code, Some(0));
                assert!(message.contains("Could not read the installed state of VideoLAN.VLC"));
                assert!(message.contains("VLC media player"));
            }
            other => panic!("Expected operation error, got {:?}", other),
        }
    }

    #[test]
    fn test_query_table_without_matching_row_is_error() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(
                0,
                "Name       Id            Version Source\n\
                 ---------------------------------------\n\
                 Other App  Vendor.Other  1.0     winget\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        assert!(winget.query(&spec()).is_err());
    }

    #[test]
    fn test_query_not_installed_text_on_success() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(0, "No installed package found matching input criteria.\n"),
        );

        let winget = Winget::new(&runtime, "winget");
        assert_eq!(winget.query(&spec()).unwrap(), None);
    }

    #[test]
    fn test_query_passes_scope() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .withf(|inv| inv.args.ends_with(&["--scope".to_string(), "machine".to_string()]))
            .times(1)
            .returning(|_| Ok(output(exit_code::NO_APPLICATIONS_FOUND, "")));

        let winget = Winget::new(&runtime, "winget");
        let spec = spec().with_scope(Scope::Machine);
        assert_eq!(winget.query(&spec).unwrap(), None);
    }

    #[test]
    fn test_query_not_installed_by_code() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(
                exit_code::NO_APPLICATIONS_FOUND,
                "No installed package found matching input criteria.\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        assert_eq!(winget.query(&spec()).unwrap(), None);
    }

    #[test]
    fn test_query_failure_is_operation_error() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "list",
            output(1, "Failed when searching source: winget\n"),
        );

        let winget = Winget::new(&runtime, "winget");
        let err = winget.query(&spec()).unwrap_err();
        match err.downcast_ref::<ModuleError>() {
            Some(ModuleError::Operation { message, code }) => {
                assert_eq!(*code, Some(1));
                assert!(message.contains("Failed when searching source"));
            }
            other => panic!("Expected operation error, got {:?}", other),
        }
    }

    #[test]
    fn test_query_propagates_environment_error() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Err(ModuleError::Environment("winget was not found".into()).into()));

        let winget = Winget::new(&runtime, "winget");
        let err = winget.query(&spec()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModuleError>(),
            Some(ModuleError::Environment(_))
        ));
    }

    #[test]
    fn test_install_success() {
        let mut runtime = MockRuntime::new();
        expect_run(&mut runtime, "install", output(0, "Successfully installed\n"));

        let winget = Winget::new(&runtime, "winget");
        assert!(winget.install(&spec()).unwrap());
    }

    #[test]
    fn test_install_unknown_package_surfaces_diagnostic() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "install",
            output(
                exit_code::NO_APPLICATIONS_FOUND,
                "No package found matching input criteria.\n",
            ),
        );

        let winget = Winget::new(&runtime, "winget");
        let err = winget
            .install(&PackageSpec::new("Nonexistent.Package", DesiredState::Present))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No package found matching input criteria. (exit code 0x8A150014)"
        );
    }

    #[test]
    fn test_install_already_installed_is_not_a_change() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "install",
            output(exit_code::PACKAGE_ALREADY_INSTALLED, ""),
        );

        let winget = Winget::new(&runtime, "winget");
        assert!(!winget.install(&spec()).unwrap());
    }

    #[test]
    fn test_uninstall_failure() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run().times(1).returning(|_| {
            Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "Access is denied.".into(),
            })
        });

        let winget = Winget::new(&runtime, "winget");
        let err = winget.uninstall(&spec()).unwrap_err();
        assert_eq!(err.to_string(), "Access is denied. (exit code 1)");
    }

    #[test]
    fn test_upgrade_performed() {
        let mut runtime = MockRuntime::new();
        expect_run(&mut runtime, "upgrade", output(0, "Successfully installed\n"));

        let winget = Winget::new(&runtime, "winget");
        assert!(winget.upgrade(&spec()).unwrap());
    }

    #[test]
    fn test_upgrade_not_applicable() {
        let mut runtime = MockRuntime::new();
        expect_run(
            &mut runtime,
            "upgrade",
            output(exit_code::UPDATE_NOT_APPLICABLE, "No available upgrade found.\n"),
        );

        let winget = Winget::new(&runtime, "winget");
        assert!(!winget.upgrade(&spec()).unwrap());
    }
}
