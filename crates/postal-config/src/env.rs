//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only apply to fields that
//! the config file did not set.

use std::collections::HashMap;
use std::hash::BuildHasher;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::has_path;

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `POSTAL_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "POSTAL_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "POSTAL_LOG_FORMAT",
        field_path: "logging.format",
    },
];

/// Apply env var fallbacks to `merged` for every field `file_layer` did not
/// set. `file_layer` is `None` when no config file was loaded.
///
/// Returns the number of env vars applied.
///
/// # Errors
///
/// Returns [`ConfigError::BlankEnvVar`] if a mapped variable is set but blank.
pub fn apply_env_fallbacks<S: BuildHasher>(
    merged: &mut toml::Value,
    file_layer: Option<&toml::Value>,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if file_layer.is_some_and(|file| has_path(file, mapping.field_path)) {
            continue;
        }

        let Some(val) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let val = val.trim();
        if val.is_empty() {
            return Err(ConfigError::BlankEnvVar {
                var_name: mapping.var_name,
            });
        }

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, toml::Value::String(val.to_owned()));
        count = count.saturating_add(1);
    }

    Ok(count)
}

/// Collect the process environment, skipping variables that are not valid
/// unicode.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// Set a dotted `path` in `root`, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let Some((parents, leaf)) = path.rsplit_once('.') else {
        if let Some(table) = root.as_table_mut() {
            table.insert(path.to_owned(), value);
        }
        return;
    };

    let mut current = root;
    for segment in parents.split('.') {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        current = table
            .entry(segment.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    if let Some(table) = current.as_table_mut() {
        table.insert(leaf.to_owned(), value);
    }
}
