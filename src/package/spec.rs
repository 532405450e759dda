//! Desired package state: raw module arguments and their validated form.

use serde::Deserialize;
use std::fmt;

use super::state::{Architecture, DesiredState, Scope};
use crate::error::ModuleError;

/// Characters that never appear in a package identifier.
const FORBIDDEN_ID_CHARS: [char; 7] = ['&', '|', ';', '$', '`', '<', '>'];

/// Module arguments exactly as the caller supplied them.
///
/// Every field is an unvalidated string so that missing and malformed values
/// are reported uniformly by [`PackageSpec::try_from`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleArgs {
    #[serde(rename = "appID", alias = "app_id", default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// A validated desired package state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub app_id: String,
    pub state: DesiredState,
    pub architecture: Option<Architecture>,
    pub scope: Option<Scope>,
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn new(app_id: impl Into<String>, state: DesiredState) -> Self {
        Self {
            app_id: app_id.into(),
            state,
            architecture: None,
            scope: None,
            version: None,
        }
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = Some(architecture);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.app_id)?;
        if let Some(v) = &self.version {
            write!(f, "@{}", v)?;
        }
        write!(f, " ({})", self.state)
    }
}

fn validate_app_id(raw: Option<String>, errors: &mut Vec<String>) -> String {
    let Some(raw) = raw else {
        errors.push("missing required parameter: appID".to_string());
        return String::new();
    };
    let id = raw.trim();
    if id.is_empty() {
        errors.push("appID cannot be empty".to_string());
    } else if id.chars().any(char::is_whitespace) {
        errors.push(format!("appID cannot contain whitespace, got: {}", raw));
    } else if id.contains(FORBIDDEN_ID_CHARS) {
        errors.push(format!("appID contains forbidden characters, got: {}", raw));
    }
    id.to_string()
}

fn parse_optional<T>(raw: Option<String>, errors: &mut Vec<String>) -> Option<T>
where
    T: std::str::FromStr<Err = ModuleError>,
{
    raw.and_then(|value| match value.parse::<T>() {
        Ok(v) => Some(v),
        Err(ModuleError::Validation(msg)) => {
            errors.push(msg);
            None
        }
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    })
}

impl TryFrom<ModuleArgs> for PackageSpec {
    type Error = ModuleError;

    /// Validate every field, reporting all problems at once.
    fn try_from(args: ModuleArgs) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let app_id = validate_app_id(args.app_id, &mut errors);

        let state = match args.state {
            Some(s) => parse_optional::<DesiredState>(Some(s), &mut errors),
            None => {
                errors.push("missing required parameter: state".to_string());
                None
            }
        };

        let architecture = parse_optional::<Architecture>(args.architecture, &mut errors);
        let scope = parse_optional::<Scope>(args.scope, &mut errors);

        let version = match args.version {
            Some(v) if v.trim().is_empty() => {
                errors.push("version cannot be empty".to_string());
                None
            }
            Some(v) => Some(v.trim().to_string()),
            None => None,
        };

        match state {
            Some(state) if errors.is_empty() => Ok(PackageSpec {
                app_id,
                state,
                architecture,
                scope,
                version,
            }),
            _ => Err(ModuleError::Validation(errors.join("; "))),
        }
    }
}
