// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Template storage and per-class template loading.

Recognition templates are named kernel matrices kept outside the compiler.
[`TemplateStore`] is the seam: anything that can hand back the rows of a
named matrix can feed [`load_template`].
*/

use super::Kernel;
use crate::types::{ConnectivityError, ConnectivityResult};
use ahash::AHashMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Source of named template matrices
pub trait TemplateStore {
    /// Rows of the matrix stored under `name`, or `None` if absent
    fn fetch(&self, name: &str) -> ConnectivityResult<Option<Vec<Vec<f64>>>>;
}

/// Templates held in memory, keyed by class name
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateStore {
    templates: AHashMap<String, Vec<Vec<f64>>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<Vec<f64>>) {
        self.templates.insert(name.into(), rows);
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<Vec<f64>>)> for InMemoryTemplateStore {
    fn from_iter<I: IntoIterator<Item = (S, Vec<Vec<f64>>)>>(iter: I) -> Self {
        Self {
            templates: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn fetch(&self, name: &str) -> ConnectivityResult<Option<Vec<Vec<f64>>>> {
        Ok(self.templates.get(name).cloned())
    }
}

/// Templates read from a JSON object mapping class name to a row-major matrix:
///
/// ```json
/// { "fist": [[0.1, -0.2], [0.0, 0.4]], "hand": [[...]] }
/// ```
///
/// Each matrix is kept as raw JSON and converted when fetched, so one
/// malformed class does not hide the others.
#[derive(Debug, Clone)]
pub struct JsonTemplateStore {
    path: Option<PathBuf>,
    templates: AHashMap<String, serde_json::Value>,
}

impl JsonTemplateStore {
    /// Read and parse the whole file once.
    ///
    /// # Errors
    /// `Storage` if the file cannot be read or is not a JSON object. Matrix
    /// contents are checked per class when fetched.
    pub fn open(path: impl AsRef<Path>) -> ConnectivityResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|e| {
            ConnectivityError::Storage(format!("failed to read {}: {}", path.display(), e))
        })?;
        let mut store = Self::parse(&content)?;
        debug!(
            target: "spikeconv-connectivity",
            "Loaded {} templates from {}",
            store.len(),
            path.display()
        );
        store.path = Some(path);
        Ok(store)
    }

    /// Parse templates from a JSON string
    pub fn parse(content: &str) -> ConnectivityResult<Self> {
        let templates: AHashMap<String, serde_json::Value> = serde_json::from_str(content)?;
        Ok(Self {
            path: None,
            templates,
        })
    }

    /// File the store was opened from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl TemplateStore for JsonTemplateStore {
    /// # Errors
    /// `MalformedData` if the stored value is not an array of numeric rows
    fn fetch(&self, name: &str) -> ConnectivityResult<Option<Vec<Vec<f64>>>> {
        let Some(value) = self.templates.get(name) else {
            return Ok(None);
        };
        Vec::<Vec<f64>>::deserialize(value)
            .map(Some)
            .map_err(|e| ConnectivityError::MalformedData(format!("template '{}': {}", name, e)))
    }
}

/// Load the template kernel for recognition class `class_index`.
///
/// `names` declares the class range and the storage key of each class.
///
/// # Errors
/// - `NotFound` if `class_index` is outside `names`
/// - `MalformedData` if the store has no matrix for the class, or the matrix
///   is empty, ragged or non-finite
/// - `Storage` if the store itself fails
pub fn load_template<S, T>(class_index: usize, names: &[S], store: &T) -> ConnectivityResult<Kernel>
where
    S: AsRef<str>,
    T: TemplateStore + ?Sized,
{
    let name: &str = names.get(class_index).map(AsRef::as_ref).ok_or_else(|| {
        ConnectivityError::NotFound(format!(
            "template class {} outside declared range 0..{}",
            class_index,
            names.len()
        ))
    })?;

    let rows = store.fetch(name)?.ok_or_else(|| {
        ConnectivityError::MalformedData(format!("no template matrix stored for '{}'", name))
    })?;

    Kernel::from_rows(rows).map_err(|e| match e {
        ConnectivityError::MalformedData(msg) => {
            ConnectivityError::MalformedData(format!("template '{}': {}", name, msg))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> InMemoryTemplateStore {
        [
            ("fist", vec![vec![1.0, -1.0], vec![0.5, 0.0]]),
            ("one", vec![vec![1.0, 2.0], vec![3.0]]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_load_template_by_index() {
        let names = ["fist", "one"];
        let k = load_template(0, &names, &store()).unwrap();
        assert_eq!(k.to_rows(), vec![vec![1.0, -1.0], vec![0.5, 0.0]]);
    }

    #[test]
    fn test_class_index_out_of_range() {
        let names = ["fist", "one"];
        let err = load_template(2, &names, &store()).unwrap_err();
        assert!(matches!(err, ConnectivityError::NotFound(_)));
    }

    #[test]
    fn test_ragged_template_is_malformed() {
        let names = ["fist", "one"];
        let err = load_template(1, &names, &store()).unwrap_err();
        match err {
            ConnectivityError::MalformedData(msg) => assert!(msg.contains("'one'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_matrix_is_malformed() {
        let names = ["fist", "thumb"];
        let err = load_template(1, &names, &store()).unwrap_err();
        assert!(matches!(err, ConnectivityError::MalformedData(_)));
    }

    #[test]
    fn test_json_parse() {
        let parsed = JsonTemplateStore::parse(r#"{"hand": [[0.25, -0.5], [1, 0]]}"#).unwrap();
        assert_eq!(parsed.len(), 1);
        let k = load_template(0, &["hand"], &parsed).unwrap();
        assert_eq!(k.get(0, 1), Some(-0.5));
        assert!(JsonTemplateStore::parse("[1, 2]").is_err());
        assert!(parsed.path().is_none());
    }

    #[test]
    fn test_json_bad_class_leaves_others_loadable() {
        let parsed =
            JsonTemplateStore::parse(r#"{"fist": [[1.0, 2.0]], "hand": [[1.0, null]]}"#).unwrap();
        let names = ["fist", "hand"];

        let fist = load_template(0, &names, &parsed).unwrap();
        assert_eq!(fist.to_rows(), vec![vec![1.0, 2.0]]);

        match load_template(1, &names, &parsed).unwrap_err() {
            ConnectivityError::MalformedData(msg) => assert!(msg.starts_with("template 'hand'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_syntax_error_is_storage() {
        let err = JsonTemplateStore::parse(r#"{"fist": [[1.0, 2.0]"#).unwrap_err();
        assert!(matches!(err, ConnectivityError::Storage(_)));

        let parsed = JsonTemplateStore::parse(r#"{"thumb": "not a matrix"}"#).unwrap();
        let err = parsed.fetch("thumb").unwrap_err();
        assert!(matches!(err, ConnectivityError::MalformedData(_)));
    }
}
