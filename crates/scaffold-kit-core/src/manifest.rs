//! Template manifest (`template.json`).
//!
//! Every library template carries a manifest next to its `files/` tree:
//!
//! ```json
//! {
//!   "name": "python-basic",
//!   "description": "Minimal Python package",
//!   "variables": {
//!     "project_name": { "description": "Project name" },
//!     "description": { "default": "A new Python project." }
//!   },
//!   "hooks": { "post_create": ["git init -q"] },
//!   "requires": ["python3"]
//! }
//! ```
//!
//! All fields are optional.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{Result, ScaffoldError};

/// File name of the manifest inside a template directory.
pub const MANIFEST_FILE: &str = "template.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Declared variables. Templates may reference undeclared ones too.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableSpec>,
    #[serde(default)]
    pub hooks: Hooks,
    /// External tools the generated project expects on `PATH`.
    #[serde(default)]
    pub requires: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hooks {
    /// Shell commands run in the destination after rendering. Each command is
    /// itself a template string.
    #[serde(default, alias = "post-create")]
    pub post_create: Vec<String>,
}

impl TemplateManifest {
    /// An empty manifest carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(ScaffoldError::io(path))?;
        Self::from_json(&contents).map_err(|e| ScaffoldError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ScaffoldError::JsonParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(ScaffoldError::io(path))
    }

    /// Fill every declared default the context does not already provide.
    pub fn apply_defaults(&self, context: &mut Context) {
        for (name, spec) in &self.variables {
            if let Some(default) = &spec.default {
                context.insert_default(name, default);
            }
        }
    }
}
