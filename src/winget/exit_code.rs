//! Exit-code and diagnostic interpretation for winget.
//!
//! winget reports failures as `HRESULT`s, which surface as negative `i32`
//! process exit codes on Windows. Elsewhere (and in scripted stand-ins) only
//! the low byte survives, so the printed text is checked as well.

use crate::runtime::CommandOutput;

use super::table::is_noise;

/// `APPINSTALLER_CLI_ERROR_NO_APPLICATIONS_FOUND`
pub const NO_APPLICATIONS_FOUND: i32 = 0x8A15_0014_u32 as i32;
/// `APPINSTALLER_CLI_ERROR_UPDATE_NOT_APPLICABLE`
pub const UPDATE_NOT_APPLICABLE: i32 = 0x8A15_002B_u32 as i32;
/// `APPINSTALLER_CLI_ERROR_PACKAGE_ALREADY_INSTALLED`
pub const PACKAGE_ALREADY_INSTALLED: i32 = 0x8A15_0061_u32 as i32;

const NOT_INSTALLED_MARKERS: [&str; 2] = [
    "no installed package found",
    "no installed packages found",
];

const NO_UPGRADE_MARKERS: [&str; 3] = [
    "no available upgrade found",
    "no applicable upgrade found",
    "no newer package versions are available",
];

const ALREADY_INSTALLED_MARKERS: [&str; 1] = ["found an existing package already installed"];

fn mentions(output: &CommandOutput, markers: &[&str]) -> bool {
    let stdout = output.stdout.to_lowercase();
    let stderr = output.stderr.to_lowercase();
    markers
        .iter()
        .any(|m| stdout.contains(m) || stderr.contains(m))
}

/// A `list` that found nothing.
pub fn is_not_installed(output: &CommandOutput) -> bool {
    output.code == Some(NO_APPLICATIONS_FOUND) || mentions(output, &NOT_INSTALLED_MARKERS)
}

/// An `upgrade` that had nothing to do.
pub fn is_upgrade_not_applicable(output: &CommandOutput) -> bool {
    output.code == Some(UPDATE_NOT_APPLICABLE) || mentions(output, &NO_UPGRADE_MARKERS)
}

/// An `install` that found the package already there.
pub fn is_already_installed(output: &CommandOutput) -> bool {
    output.code == Some(PACKAGE_ALREADY_INSTALLED)
        || (mentions(output, &ALREADY_INSTALLED_MARKERS) && is_upgrade_not_applicable(output))
}

/// Render an exit code the way winget documents it.
pub fn format_code(code: Option<i32>) -> String {
    match code {
        Some(c) if c < 0 => format!("0x{:08X}", c as u32),
        Some(c) => c.to_string(),
        None => "signal".to_string(),
    }
}

/// Extract the human-readable reason a winget command failed.
///
/// Prefers stderr; winget itself writes most errors to stdout, so fall back
/// to the last meaningful stdout lines.
pub fn diagnostic(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    let text = if !stderr.is_empty() {
        stderr.to_string()
    } else {
        let lines: Vec<&str> = output
            .stdout
            .lines()
            .map(|l| l.rsplit('\r').next().unwrap_or(l).trim())
            .filter(|l| !l.is_empty() && !is_noise(l))
            .collect();
        let start = lines.len().saturating_sub(3);
        lines[start..].join(" ")
    };

    let code = format_code(output.code);
    if text.is_empty() {
        format!("winget exited with code {}", code)
    } else {
        format!("{} (exit code {})", text, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn test_hresult_constants() {
        assert_eq!(NO_APPLICATIONS_FOUND, -1978335212);
        assert_eq!(UPDATE_NOT_APPLICABLE, -1978335189);
    }

    #[test]
    fn test_not_installed_by_code_or_text() {
        assert!(is_not_installed(&output(NO_APPLICATIONS_FOUND, "", "")));
        assert!(is_not_installed(&output(
            1,
            "No installed package found matching input criteria.\n",
            ""
        )));
        assert!(!is_not_installed(&output(1, "Access is denied.", "")));
    }

    #[test]
    fn test_upgrade_not_applicable_by_code_or_text() {
        assert!(is_upgrade_not_applicable(&output(UPDATE_NOT_APPLICABLE, "", "")));
        assert!(is_upgrade_not_applicable(&output(
            1,
            "No available upgrade found.\nNo newer package versions are available from the configured sources.\n",
            ""
        )));
        assert!(!is_upgrade_not_applicable(&output(0, "Successfully installed", "")));
    }

    #[test]
    fn test_already_installed() {
        assert!(is_already_installed(&output(PACKAGE_ALREADY_INSTALLED, "", "")));
        assert!(is_already_installed(&output(
            0,
            "Found an existing package already installed. Trying to upgrade the installed package...\nNo available upgrade found.\n",
            ""
        )));
        assert!(!is_already_installed(&output(0, "Successfully installed", "")));
    }

    #[test]
    fn test_format_code() {
        assert_eq!(format_code(Some(NO_APPLICATIONS_FOUND)), "0x8A150014");
        assert_eq!(format_code(Some(1)), "1");
        assert_eq!(format_code(None), "signal");
    }

    #[test]
    fn test_diagnostic_prefers_stderr() {
        let out = output(1, "Found VLC [VideoLAN.VLC]", "Installer failed with exit code: 1603\n");
        assert_eq!(
            diagnostic(&out),
            "Installer failed with exit code: 1603 (exit code 1)"
        );
    }

    #[test]
    fn test_diagnostic_falls_back_to_stdout_without_progress() {
        let out = output(
            NO_APPLICATIONS_FOUND,
            "   - \r   \\ \r\n  ██████████████▒▒▒▒  50%\nNo package found matching input criteria.\n",
            "",
        );
        assert_eq!(
            diagnostic(&out),
            "No package found matching input criteria. (exit code 0x8A150014)"
        );
    }

    #[test]
    fn test_diagnostic_without_any_text() {
        let out = output(5, "", "");
        assert_eq!(diagnostic(&out), "winget exited with code 5");
    }
}
