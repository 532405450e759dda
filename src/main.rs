use clap::Parser;
use clap::error::ErrorKind;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

use winget_state::commands::{self, ArgsSource, config::Config};
use winget_state::package::ModuleArgs;
use winget_state::runtime::RealRuntime;
use winget_state::{Failure, ModuleError, Outcome};

/// winget-state - ensure a package is present, absent or updated via winget
///
/// Prints a JSON result document on stdout: {"changed": bool, "msg": string}.
/// On failure "failed": true is added and the exit code is 1.
///
/// Examples:
///   winget-state --app-id VideoLAN.VLC --state present --scope user
///   winget-state --args-file /tmp/args.json
#[derive(Parser, Debug)]
#[command(author, version = env!("WINGET_STATE_VERSION"), about)]
struct Cli {
    #[command(flatten)]
    params: ParamArgs,

    /// JSON file holding the module parameters (appID, state, ...)
    #[arg(
        long = "args-file",
        value_name = "PATH",
        conflicts_with_all = ["app_id", "state", "architecture", "scope", "app_version"]
    )]
    args_file: Option<PathBuf>,

    /// Report what would change without changing anything
    #[arg(long = "check", env = "WINGET_STATE_CHECK_MODE")]
    check: bool,

    /// Package manager executable (defaults to `winget` on PATH)
    #[arg(long = "winget", env = "WINGET_STATE_WINGET", value_name = "PATH")]
    winget: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct ParamArgs {
    /// Package identifier, e.g. VideoLAN.VLC
    #[arg(long = "app-id", alias = "appID", value_name = "ID")]
    app_id: Option<String>,

    /// Desired state: present, absent or updated
    #[arg(long = "state", value_name = "STATE")]
    state: Option<String>,

    /// Target architecture: x64, x86 or arm64
    #[arg(long = "architecture", value_name = "ARCH")]
    architecture: Option<String>,

    /// Installation scope: user or machine
    #[arg(long = "scope", value_name = "SCOPE")]
    scope: Option<String>,

    /// Exact package version
    #[arg(long = "app-version", value_name = "VERSION")]
    app_version: Option<String>,
}

impl From<ParamArgs> for ModuleArgs {
    fn from(p: ParamArgs) -> Self {
        ModuleArgs {
            app_id: p.app_id,
            state: p.state,
            architecture: p.architecture,
            scope: p.scope,
            version: p.app_version,
        }
    }
}

fn emit<T: Serialize>(document: &T) {
    match serde_json::to_string(document) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize result: {}", e),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            emit(&Failure::new(e.to_string().trim_end()));
            return ExitCode::FAILURE;
        }
    };
    let runtime = RealRuntime;

    let source = match cli.args_file {
        Some(path) => ArgsSource::File(path),
        None => ArgsSource::Inline(cli.params.into()),
    };
    let config = Config::new(cli.winget, cli.check);

    match commands::run(&runtime, source, config) {
        Ok(outcome) => {
            emit::<Outcome>(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let kind = err
                .downcast_ref::<ModuleError>()
                .map_or("internal", ModuleError::kind);
            log::debug!("Reconciliation failed ({} error): {:?}", kind, err);
            emit(&Failure::from_error(&err));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_flag_parsing() {
        let cli = Cli::try_parse_from([
            "winget-state",
            "--app-id",
            "VideoLAN.VLC",
            "--state",
            "present",
            "--architecture",
            "x64",
            "--scope",
            "user",
            "--app-version",
            "3.0.20",
        ])
        .unwrap();
        assert_eq!(cli.args_file, None);
        assert!(!cli.check);

        let args: ModuleArgs = cli.params.into();
        assert_eq!(args.app_id.as_deref(), Some("VideoLAN.VLC"));
        assert_eq!(args.state.as_deref(), Some("present"));
        assert_eq!(args.architecture.as_deref(), Some("x64"));
        assert_eq!(args.scope.as_deref(), Some("user"));
        assert_eq!(args.version.as_deref(), Some("3.0.20"));
    }

    #[test]
    fn test_cli_app_id_alias() {
        let cli = Cli::try_parse_from(["winget-state", "--appID", "Git.Git", "--state", "absent"])
            .unwrap();
        assert_eq!(cli.params.app_id.as_deref(), Some("Git.Git"));
    }

    #[test]
    fn test_cli_args_file_parsing() {
        let cli = Cli::try_parse_from(["winget-state", "--args-file", "/tmp/args.json", "--check"])
            .unwrap();
        assert_eq!(cli.args_file, Some(PathBuf::from("/tmp/args.json")));
        assert!(cli.check);
    }

    #[test]
    fn test_cli_args_file_conflicts_with_flags() {
        let result = Cli::try_parse_from([
            "winget-state",
            "--args-file",
            "/tmp/args.json",
            "--state",
            "present",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_winget_path() {
        let cli = Cli::try_parse_from(["winget-state", "--winget", r"C:\winget.exe"]).unwrap();
        assert_eq!(cli.winget, Some(PathBuf::from(r"C:\winget.exe")));
    }
}
