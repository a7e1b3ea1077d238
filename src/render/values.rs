//! Value sources and their precedence.
//!
//! A run has one built-in values file (`default_values.yaml` from the generator
//! source) and any number of user files given with `--values`. They form an
//! ordered list where each later entry overrides the ones before it:
//!
//! ```text
//! Values_default  <  Values_0  <  Values_1  <  ...
//! ```
//!
//! The renderer receives the list as named data sources plus one merge
//! expression, which names the highest-precedence source first. [`ValueSources::merge`]
//! applies the same precedence in-process as an explicit fold, which is used to
//! reject unparsable values files before anything is rendered.

use crate::utils::fs::read_yaml_file;
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Name of the data source holding the generator's default values.
pub const DEFAULT_VALUES_SOURCE: &str = "Values_default";

/// Name under which the merged values are visible to templates.
pub const VALUES_CONTEXT: &str = "Values";

/// One named values file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSource {
    /// Data source name (`Values_default`, `Values_0`, ...)
    pub name: String,
    /// The YAML file
    pub path: PathBuf,
}

/// Values files in increasing order of precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSources {
    sources: Vec<ValueSource>,
}

impl ValueSources {
    /// The generator defaults followed by the user's files, in the order given.
    pub fn new(default_values: &Path, user_values: &[PathBuf]) -> Self {
        let mut sources = Vec::with_capacity(user_values.len() + 1);
        sources.push(ValueSource {
            name: DEFAULT_VALUES_SOURCE.to_string(),
            path: default_values.to_path_buf(),
        });
        sources.extend(user_values.iter().enumerate().map(|(i, path)| ValueSource {
            name: format!("Values_{i}"),
            path: path.clone(),
        }));

        Self {
            sources,
        }
    }

    /// Sources from lowest to highest precedence.
    #[must_use]
    pub fn sources(&self) -> &[ValueSource] {
        &self.sources
    }

    /// `name=path` data source definitions, one per file.
    #[must_use]
    pub fn data_sources(&self) -> Vec<String> {
        self.sources.iter().map(|s| format!("{}={}", s.name, s.path.display())).collect()
    }

    /// The merge context definition, highest precedence first.
    ///
    /// For two user files this is `Values=merge:Values_1|Values_0|Values_default`.
    #[must_use]
    pub fn merge_expression(&self) -> String {
        let names: Vec<&str> = self.sources.iter().rev().map(|s| s.name.as_str()).collect();
        format!("{VALUES_CONTEXT}=merge:{}", names.join("|"))
    }

    /// Parses every file and folds them into one document.
    ///
    /// Mappings merge key by key, recursively; for any other value the later
    /// source replaces the earlier one. Empty files contribute nothing.
    pub fn merge(&self) -> Result<Value> {
        self.sources.iter().try_fold(Value::Mapping(Mapping::new()), |merged, source| {
            let value: Value = read_yaml_file(&source.path)
                .with_context(|| format!("Invalid values file for {}", source.name))?;
            Ok(merge_values(merged, value))
        })
    }
}

/// Merges `overlay` onto `base`, with `overlay` winning on conflicts.
#[must_use]
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (base, Value::Null) => base,
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}
