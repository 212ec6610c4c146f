//! Configuration Sources
//!
//! The calculator is configured through a flat, key-indexed namespace of text values
//! (`option-1`, `range-1-2-max`, `package-3-coverage`, ...). A page renders them as hidden
//! markup; here they come from anything implementing [`ConfigSource`], typically a
//! [`KeyValueSource`] loaded from a YAML document:
//!
//! ```yaml
//! values:
//!   unit: m2
//!   option-1: Interior
//!   multiplier-1: 0.125
//! ```

use std::{
    collections::HashMap,
    fs,
    hash::BuildHasher,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_norway::Value;
use thiserror::Error;
use tracing::warn;

/// Errors loading a configuration source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// IO error reading a source file
    #[error("Failed to read configuration source: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// A read-only, key-indexed source of configuration text.
pub trait ConfigSource {
    /// The value stored under `key`, if the key is present.
    fn value(&self, key: &str) -> Option<&str>;

    /// Whether `key` is present.
    fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }
}

impl<S: BuildHasher> ConfigSource for HashMap<String, String, S> {
    fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// An owned key-value configuration source. Values are stored trimmed.
#[derive(Debug, Clone, Default)]
pub struct KeyValueSource {
    values: FxHashMap<String, String>,
}

/// YAML document shape
#[derive(Debug, Deserialize)]
struct SourceFixture {
    #[serde(default)]
    values: FxHashMap<String, Value>,
}

impl KeyValueSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, trimming surrounding whitespace.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, trimming surrounding whitespace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.values
            .insert(key.into(), value.as_ref().trim().to_string());
    }

    /// Number of keys in the source.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the source has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a YAML document of the shape `values: { key: scalar }`.
    ///
    /// Strings, numbers and booleans are accepted; any other node is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Yaml`] if the document is not valid YAML of that shape.
    pub fn from_yaml_str(contents: &str) -> Result<Self, SourceError> {
        let fixture: SourceFixture = serde_norway::from_str(contents)?;
        let mut source = Self::new();

        for (key, value) in fixture.values {
            match scalar_text(&value) {
                Some(text) => source.insert(key, text),
                None => warn!(key = %key, "skipping non-scalar configuration value"),
            }
        }

        Ok(source)
    }

    /// Load a YAML source from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Load the named set `<base>/<name>.yml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, SourceError> {
        let path = base_path.into().join(format!("{name}.yml"));

        Self::from_yaml_file(path)
    }
}

impl ConfigSource for KeyValueSource {
    fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for KeyValueSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();

        for (key, value) in iter {
            source.insert(key, value);
        }

        source
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
