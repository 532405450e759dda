//! Loading module arguments handed over by an automation controller.
//!
//! The controller writes a JSON object with the module parameters, plus its
//! own bookkeeping keys prefixed with `_ansible_`. Of those only the
//! check-mode flag matters here; the rest are dropped before validation.

use anyhow::{Context, Result};
use log::debug;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::ModuleError;
use crate::package::ModuleArgs;
use crate::runtime::Runtime;

const CONTROLLER_PREFIX: &str = "_ansible_";
const CHECK_MODE_KEY: &str = "_ansible_check_mode";

/// Module arguments plus the controller flags that accompany them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedArgs {
    pub args: ModuleArgs,
    pub check_mode: bool,
}

/// Parse an argument document.
pub fn parse_args(json: &str) -> Result<LoadedArgs, ModuleError> {
    let mut map: Map<String, Value> = serde_json::from_str(json).map_err(|e| {
        ModuleError::Validation(format!("module arguments are not a JSON object: {}", e))
    })?;

    let check_mode = match map.get(CHECK_MODE_KEY) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(ModuleError::Validation(format!(
                "{} must be a boolean, got: {}",
                CHECK_MODE_KEY, other
            )));
        }
    };

    map.retain(|key, _| {
        let internal = key.starts_with(CONTROLLER_PREFIX);
        if internal {
            debug!("Ignoring controller key {}", key);
        }
        !internal
    });

    let args: ModuleArgs = serde_json::from_value(Value::Object(map))
        .map_err(|e| ModuleError::Validation(e.to_string()))?;

    Ok(LoadedArgs { args, check_mode })
}

/// Read and parse an argument file.
pub fn load_args<R: Runtime>(runtime: &R, path: &Path) -> Result<LoadedArgs> {
    debug!("Loading module arguments from {:?}", path);
    let content = runtime
        .read_to_string(path)
        .context("Failed to read module arguments")?;
    Ok(parse_args(&content)?)
}
