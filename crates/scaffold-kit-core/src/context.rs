//! Variable context for one scaffold invocation.
//!
//! A [`Context`] maps variable names (`project_name`, `description`, ...) to string
//! values. It is assembled by the caller from several sources, later sources
//! overriding earlier ones, and then handed to the renderer read-only.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScaffoldError};

/// Named string values that template expressions resolve against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context {
    values: BTreeMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Insert only if `name` has no value yet.
    pub fn insert_default(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Overlay every value from `other` onto this context.
    pub fn extend(&mut self, other: Context) {
        self.values.extend(other.values);
    }

    /// Parse a `NAME=VALUE` assignment as given on the command line.
    ///
    /// The value may be empty and may itself contain `=`; the name may not be empty.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| ScaffoldError::InvalidAssignment(assignment.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ScaffoldError::InvalidAssignment(assignment.to_string()));
        }
        Ok((name.to_string(), value.to_string()))
    }

    /// Load a context from a JSON object file.
    ///
    /// String values are taken as-is; numbers and booleans are converted with their
    /// JSON spelling. Nested arrays/objects and `null` are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ScaffoldError::io(path))?;
        let value: Value =
            serde_json::from_str(&contents).map_err(|e| ScaffoldError::JsonParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let Value::Object(map) = value else {
            return Err(anyhow::anyhow!(
                "context file {} must contain a JSON object",
                path.display()
            )
            .into());
        };

        let mut context = Self::new();
        for (name, value) in map {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(anyhow::anyhow!(
                        "context value '{name}' in {} must be a string, got {other}",
                        path.display()
                    )
                    .into())
                }
            };
            context.insert(name, value);
        }
        Ok(context)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (k, v) = Context::parse_assignment("project_name=Widget").unwrap();
        assert_eq!(k, "project_name");
        assert_eq!(v, "Widget");
    }

    #[test]
    fn test_parse_assignment_value_with_equals() {
        let (k, v) = Context::parse_assignment("description=a=b").unwrap();
        assert_eq!(k, "description");
        assert_eq!(v, "a=b");
    }

    #[test]
    fn test_parse_assignment_empty_value() {
        let (_, v) = Context::parse_assignment("description=").unwrap();
        assert_eq!(v, "");
    }

    #[test]
    fn test_parse_assignment_invalid() {
        assert!(Context::parse_assignment("no_equals").is_err());
        assert!(Context::parse_assignment("=value").is_err());
    }

    #[test]
    fn test_insert_default_keeps_existing() {
        let mut ctx = Context::new().with("description", "explicit");
        ctx.insert_default("description", "fallback");
        ctx.insert_default("author", "someone");
        assert_eq!(ctx.get("description"), Some("explicit"));
        assert_eq!(ctx.get("author"), Some("someone"));
    }

    #[test]
    fn test_load_json_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(
            &path,
            r#"{"project_name": "Widget", "year": 2024, "private": true}"#,
        )
        .unwrap();

        let ctx = Context::load(&path).unwrap();
        assert_eq!(ctx.get("project_name"), Some("Widget"));
        assert_eq!(ctx.get("year"), Some("2024"));
        assert_eq!(ctx.get("private"), Some("true"));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, r#"["a", "b"]"#).unwrap();
        assert!(Context::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_nested_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, r#"{"authors": ["a"]}"#).unwrap();
        assert!(Context::load(&path).is_err());
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ctx.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Context::load(&path),
            Err(ScaffoldError::JsonParse { .. })
        ));
    }
}
