use std::path::PathBuf;

/// Default package manager executable, resolved through `PATH`.
pub const DEFAULT_WINGET: &str = "winget";

/// Settings that shape how a reconciliation runs, independent of which
/// package it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Package manager executable.
    pub winget: PathBuf,
    /// Report changes without applying them.
    pub check_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            winget: PathBuf::from(DEFAULT_WINGET),
            check_mode: false,
        }
    }
}

impl Config {
    pub fn new(winget: Option<PathBuf>, check_mode: bool) -> Self {
        Self {
            winget: winget.unwrap_or_else(|| PathBuf::from(DEFAULT_WINGET)),
            check_mode,
        }
    }
}
