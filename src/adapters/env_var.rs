// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment variable overlay source adapter.
//!
//! This module provides an adapter that builds a layer overlay from
//! environment variables.

use crate::domain::Result;
use crate::ports::OverlaySource;
use parking_lot::RwLock;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;
use std::env;

/// Maximum length for environment variable keys
const MAX_ENV_KEY_LEN: usize = 512;

/// Maximum length for environment variable values
const MAX_ENV_VALUE_LEN: usize = 1048576; // 1MB

/// Default separator between nesting levels in a variable name
const DEFAULT_SEPARATOR: &str = "__";

/// Overlay source adapter for environment variables.
///
/// Variable names map onto the nested document an overlay is decoded from:
/// the prefix is stripped, the rest is split on the separator (`__` by
/// default) and each segment is lowercased. With the prefix `APP_`,
///
/// ```text
/// APP_PORT=9090
/// APP_DATABASE__HOST=db.internal
/// ```
///
/// becomes the document `{port: 9090, database: {host: db.internal}}`.
///
/// Values are resolved like YAML plain scalars, so `9090` is a number and
/// `true` a boolean; anything else stays a string. Quote a value (`'9090'`)
/// to force a string. When one variable names a mapping that another names
/// as a scalar (`APP_DATABASE` next to `APP_DATABASE__HOST`), the mapping
/// wins.
///
/// # Examples
///
/// ```rust
/// use layerbroker::adapters::EnvVarAdapter;
/// use layerbroker::ports::OverlaySource;
/// use std::collections::HashMap;
///
/// let mut values = HashMap::new();
/// values.insert("DATABASE__PORT".to_string(), "5433".to_string());
///
/// let adapter = EnvVarAdapter::with_values(values);
/// let doc = adapter.document().unwrap();
/// assert_eq!(doc["database"]["port"].as_u64(), Some(5433));
/// ```
#[derive(Debug)]
pub struct EnvVarAdapter {
    /// Optional prefix to filter environment variables
    prefix: Option<String>,
    /// Whether to convert keys to lowercase
    lowercase_keys: bool,
    separator: String,
    /// Variables with the prefix already stripped, loaded on first use
    cache: RwLock<Option<HashMap<String, String>>>,
}

impl EnvVarAdapter {
    /// Creates a new environment variable adapter without prefix filtering.
    ///
    /// This will read all environment variables available to the process.
    pub fn new() -> Self {
        Self {
            prefix: None,
            lowercase_keys: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            cache: RwLock::new(None),
        }
    }

    /// Creates a new environment variable adapter with prefix filtering.
    ///
    /// Only environment variables starting with the given prefix will be read.
    /// The prefix is stripped before the name is mapped to a key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layerbroker::adapters::EnvVarAdapter;
    ///
    /// let adapter = EnvVarAdapter::with_prefix("MYAPP_");
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::new()
        }
    }

    /// Sets whether to convert keys to lowercase (default: enabled).
    pub fn lowercase_keys(mut self, enabled: bool) -> Self {
        self.lowercase_keys = enabled;
        self
    }

    /// Sets the separator between nesting levels (default: `__`).
    ///
    /// An empty separator disables nesting.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Creates an adapter with pre-populated values for testing.
    ///
    /// Keys are variable names without any prefix; they are mapped to the
    /// document exactly like real variables.
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self {
            cache: RwLock::new(Some(values)),
            ..Self::new()
        }
    }

    /// Loads matching environment variables with the prefix stripped.
    fn load(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();

        for (key, value) in env::vars() {
            if key.len() > MAX_ENV_KEY_LEN || value.len() > MAX_ENV_VALUE_LEN {
                tracing::debug!(
                    "Skipping oversized environment variable: key_len={}, value_len={} (max key={}, max value={})",
                    key.len(),
                    value.len(),
                    MAX_ENV_KEY_LEN,
                    MAX_ENV_VALUE_LEN
                );
                continue;
            }

            let key = match &self.prefix {
                Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(stripped) => stripped.to_string(),
                    None => continue,
                },
                None => key,
            };
            vars.insert(key, value);
        }

        tracing::debug!(
            "Loaded {} environment variables (prefix={:?}, lowercase={}, separator={:?})",
            vars.len(),
            self.prefix,
            self.lowercase_keys,
            self.separator
        );

        vars
    }

    /// Returns the cached variables, loading them on first use.
    fn vars(&self) -> HashMap<String, String> {
        if let Some(vars) = self.cache.read().as_ref() {
            return vars.clone();
        }

        let vars = self.load();
        *self.cache.write() = Some(vars.clone());
        vars
    }

    /// Splits a variable name into document keys.
    fn segments(&self, key: &str) -> Option<Vec<String>> {
        let key = if self.lowercase_keys {
            key.to_lowercase()
        } else {
            key.to_string()
        };

        let segments: Vec<String> = if self.separator.is_empty() {
            vec![key]
        } else {
            key.split(self.separator.as_str()).map(str::to_string).collect()
        };

        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(segments)
    }
}

impl Default for EnvVarAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves a raw variable value the way a YAML plain scalar would be.
fn parse_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// Inserts `value` under the nested `segments`; returns false if it was dropped.
fn insert(map: &mut Mapping, segments: &[String], value: Value) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        return false;
    };

    if rest.is_empty() {
        if matches!(map.get(first.as_str()), Some(Value::Mapping(_))) {
            return false;
        }
        map.insert(Value::String(first.clone()), value);
        return true;
    }

    if !matches!(map.get(first.as_str()), Some(Value::Mapping(_))) {
        map.insert(Value::String(first.clone()), Value::Mapping(Mapping::new()));
    }
    match map.get_mut(first.as_str()) {
        Some(Value::Mapping(inner)) => insert(inner, rest, value),
        _ => false,
    }
}

impl OverlaySource for EnvVarAdapter {
    fn name(&self) -> &str {
        "env"
    }

    fn document(&self) -> Result<Value> {
        let mut vars: Vec<(String, String)> = self.vars().into_iter().collect();
        vars.sort();

        let mut root = Mapping::new();
        for (key, raw) in vars {
            let Some(segments) = self.segments(&key) else {
                tracing::debug!("Skipping environment variable with empty segment: {}", key);
                continue;
            };
            if !insert(&mut root, &segments, parse_value(&raw)) {
                tracing::debug!(
                    "Skipping environment variable {}: a nested key already uses that name",
                    key
                );
            }
        }

        if root.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::Mapping(root))
    }

    fn reload(&mut self) -> Result<()> {
        *self.cache.write() = None;
        Ok(())
    }
}
