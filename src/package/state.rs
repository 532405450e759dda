//! Closed choice sets for module parameters.

use std::fmt;
use std::str::FromStr;

use crate::error::ModuleError;

/// Parse `value` against a fixed list of choices, case-insensitively.
fn parse_choice<T: Copy>(field: &str, value: &str, choices: &[(&str, T)]) -> Result<T, ModuleError> {
    let wanted = value.trim();
    choices
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            let names: Vec<&str> = choices.iter().map(|(name, _)| *name).collect();
            ModuleError::Validation(format!(
                "value of {} must be one of: {}, got: {}",
                field,
                names.join(", "),
                value
            ))
        })
}

/// Target condition of a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Present,
    Absent,
    Updated,
}

impl DesiredState {
    const CHOICES: [(&'static str, DesiredState); 3] = [
        ("absent", DesiredState::Absent),
        ("present", DesiredState::Present),
        ("updated", DesiredState::Updated),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DesiredState::Present => "present",
            DesiredState::Absent => "absent",
            DesiredState::Updated => "updated",
        }
    }
}

impl FromStr for DesiredState {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("state", s, &Self::CHOICES)
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    X64,
    X86,
    Arm64,
}

impl Architecture {
    const CHOICES: [(&'static str, Architecture); 3] = [
        ("x64", Architecture::X64),
        ("x86", Architecture::X86),
        ("arm64", Architecture::Arm64),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X64 => "x64",
            Architecture::X86 => "x86",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl FromStr for Architecture {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("architecture", s, &Self::CHOICES)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installation visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    User,
    Machine,
}

impl Scope {
    const CHOICES: [(&'static str, Scope); 2] = [("user", Scope::User), ("machine", Scope::Machine)];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Machine => "machine",
        }
    }
}

impl FromStr for Scope {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("scope", s, &Self::CHOICES)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
