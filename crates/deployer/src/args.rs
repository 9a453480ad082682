//! The merged argument set handed to deployer plugins
//!
//! The framework folds three layers into one flat map per invocation:
//! built-in defaults registered by the plugin, the matching config file
//! scope, and the actual command line (highest precedence). Plugins receive
//! the result as a [`ResolvedArgs`]: mutable in `post_validate`, read-only
//! in `deploy`.

use crate::error::{DeployerError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// One flat, ordered map of option name to merged value.
///
/// Values keep the shape of the layer they came from: command-line options
/// arrive as strings, flags as booleans, counters as numbers, and config
/// file entries as whatever JSON value the file held.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedArgs {
    values: BTreeMap<String, Value>,
}

impl ResolvedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. `post_validate` hooks may use this to
    /// derive computed fields for their own `deploy` to pick up.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The value for `key` as a string slice, if present and string-valued.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// The value for `key` as a boolean, if present and boolean-valued.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// The value for `key` as a counter. Absent or non-numeric values count
    /// as zero.
    pub fn get_count(&self, key: &str) -> u64 {
        self.values.get(key).and_then(Value::as_u64).unwrap_or(0)
    }

    /// Like [`get_str`](Self::get_str) but fails with
    /// [`DeployerError::MissingArgument`] when the key is absent or empty.
    ///
    /// This is the hook for "required, but allowed to come from the config
    /// file": register the argument as optional and enforce presence here
    /// from `post_validate`.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.get_str(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(DeployerError::MissingArgument(key.to_string())),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for ResolvedArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
