//! Command-line construction for winget subcommands.

use crate::package::PackageSpec;

const SOURCE_AGREEMENTS: &str = "--accept-source-agreements";
const PACKAGE_AGREEMENTS: &str = "--accept-package-agreements";
const NO_INTERACTIVITY: &str = "--disable-interactivity";

fn target(subcommand: &str, spec: &PackageSpec) -> Vec<String> {
    vec![
        subcommand.to_string(),
        "--id".to_string(),
        spec.app_id.clone(),
        "--exact".to_string(),
    ]
}

fn push_architecture(args: &mut Vec<String>, spec: &PackageSpec) {
    if let Some(arch) = spec.architecture {
        args.push("--architecture".to_string());
        args.push(arch.to_string());
    }
}

fn push_scope(args: &mut Vec<String>, spec: &PackageSpec) {
    if let Some(scope) = spec.scope {
        args.push("--scope".to_string());
        args.push(scope.to_string());
    }
}

fn push_version(args: &mut Vec<String>, spec: &PackageSpec) {
    if let Some(version) = &spec.version {
        args.push("--version".to_string());
        args.push(version.clone());
    }
}

/// `winget list` for the one package. Version is not passed so the installed
/// version is always reported.
pub fn list(spec: &PackageSpec) -> Vec<String> {
    let mut args = target("list", spec);
    args.push(SOURCE_AGREEMENTS.to_string());
    args.push(NO_INTERACTIVITY.to_string());
    push_scope(&mut args, spec);
    args
}

pub fn install(spec: &PackageSpec) -> Vec<String> {
    mutating("install", spec, true)
}

pub fn upgrade(spec: &PackageSpec) -> Vec<String> {
    mutating("upgrade", spec, true)
}

/// `winget uninstall` takes no architecture and has no package agreements.
pub fn uninstall(spec: &PackageSpec) -> Vec<String> {
    mutating("uninstall", spec, false)
}

fn mutating(subcommand: &str, spec: &PackageSpec, installs: bool) -> Vec<String> {
    let mut args = target(subcommand, spec);
    args.push("--silent".to_string());
    args.push(SOURCE_AGREEMENTS.to_string());
    if installs {
        args.push(PACKAGE_AGREEMENTS.to_string());
    }
    args.push(NO_INTERACTIVITY.to_string());
    if installs {
        push_architecture(&mut args, spec);
    }
    push_scope(&mut args, spec);
    push_version(&mut args, spec);
    args
}
