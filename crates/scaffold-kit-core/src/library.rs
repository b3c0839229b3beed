//! Named template discovery.
//!
//! A template library is a directory of templates, each laid out as:
//!
//! ```text
//! <templates_dir>/
//! └── <name>/
//!     ├── template.json    # TemplateManifest
//!     └── files/           # the template tree
//! ```
//!
//! Built-in templates are always available; a library template with the same
//! name shadows the built-in one.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::context::Context;
use crate::error::{Result, ScaffoldError};
use crate::manifest::{TemplateManifest, MANIFEST_FILE};
use crate::templates::embedded;
use crate::templates::tree::TemplateTree;

/// Sub-directory of a library template holding its tree.
pub const FILES_DIR: &str = "files";

/// Where a template was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "path")]
pub enum TemplateSource {
    Builtin,
    Directory(PathBuf),
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    pub description: String,
    pub source: TemplateSource,
}

/// A variable a template needs, merged from the manifest and the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableInfo {
    pub name: String,
    pub description: Option<String>,
    pub default: Option<String>,
    /// Listed in the manifest.
    pub declared: bool,
    /// Used by at least one name or `.j2` body.
    pub referenced: bool,
}

impl VariableInfo {
    /// Referenced without a default: the caller must supply it.
    pub fn required(&self) -> bool {
        self.referenced && self.default.is_none()
    }
}

/// A template ready to render.
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    pub name: String,
    pub manifest: TemplateManifest,
    pub tree: TemplateTree,
    pub source: TemplateSource,
}

impl ResolvedTemplate {
    /// Load a template from a directory.
    ///
    /// A directory containing `template.json` is a library template whose tree
    /// lives in `files/`. Any other directory is used as a bare tree.
    pub fn from_dir(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(ScaffoldError::TemplateDirNotFound(path.to_path_buf()));
        }

        let dir_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "template".to_string());

        let manifest_path = path.join(MANIFEST_FILE);
        let (manifest, tree) = if manifest_path.is_file() {
            let mut manifest = TemplateManifest::load(&manifest_path)?;
            if manifest.name.is_empty() {
                manifest.name = dir_name;
            }
            let tree = TemplateTree::load(&path.join(FILES_DIR))?;
            (manifest, tree)
        } else {
            (TemplateManifest::named(dir_name), TemplateTree::load(path)?)
        };

        tracing::debug!("loaded template '{}' from {}", manifest.name, path.display());
        Ok(Self {
            name: manifest.name.clone(),
            manifest,
            tree,
            source: TemplateSource::Directory(path.to_path_buf()),
        })
    }

    pub fn builtin(name: &str) -> Option<Self> {
        let (manifest, tree) = embedded::builtin(name)?;
        Some(Self {
            name: name.to_string(),
            manifest,
            tree,
            source: TemplateSource::Builtin,
        })
    }

    /// Declared and referenced variables, sorted by name.
    pub fn variables(&self) -> Result<Vec<VariableInfo>> {
        let referenced = self.tree.referenced_variables()?;
        let mut vars: BTreeMap<String, VariableInfo> = BTreeMap::new();

        for (name, spec) in &self.manifest.variables {
            vars.insert(
                name.clone(),
                VariableInfo {
                    name: name.clone(),
                    description: spec.description.clone(),
                    default: spec.default.clone(),
                    declared: true,
                    referenced: referenced.contains(name),
                },
            );
        }
        for name in referenced {
            vars.entry(name.clone()).or_insert(VariableInfo {
                name,
                description: None,
                default: None,
                declared: false,
                referenced: true,
            });
        }

        Ok(vars.into_values().collect())
    }

    /// Referenced variables the context does not supply.
    pub fn missing_variables(&self, context: &Context) -> Result<Vec<String>> {
        Ok(self
            .tree
            .referenced_variables()?
            .into_iter()
            .filter(|name| !context.contains(name))
            .collect())
    }
}

/// Resolves template names against an optional library directory and the built-ins.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    root: Option<PathBuf>,
}

impl TemplateLibrary {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn entry_dir(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return None;
        }
        let dir = self.root.as_ref()?.join(name);
        dir.join(MANIFEST_FILE).is_file().then_some(dir)
    }

    /// Every available template, sorted by name.
    ///
    /// Library entries whose manifest fails to parse are skipped with a warning.
    pub fn list(&self) -> Result<Vec<TemplateSummary>> {
        let mut templates: BTreeMap<String, TemplateSummary> = BTreeMap::new();

        for name in embedded::BUILTIN_NAMES {
            if let Some(t) = ResolvedTemplate::builtin(name) {
                templates.insert(
                    t.name.clone(),
                    TemplateSummary {
                        name: t.name,
                        description: t.manifest.description,
                        source: TemplateSource::Builtin,
                    },
                );
            }
        }

        if let Some(root) = self.root.as_deref().filter(|r| r.is_dir()) {
            let entries = std::fs::read_dir(root).map_err(ScaffoldError::io(root))?;
            for entry in entries {
                let entry = entry.map_err(ScaffoldError::io(root))?;
                let dir = entry.path();
                let manifest_path = dir.join(MANIFEST_FILE);
                if !manifest_path.is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                match TemplateManifest::load(&manifest_path) {
                    Ok(manifest) => {
                        templates.insert(
                            name.clone(),
                            TemplateSummary {
                                name,
                                description: manifest.description,
                                source: TemplateSource::Directory(dir),
                            },
                        );
                    }
                    Err(e) => tracing::warn!("skipping template {}: {e}", dir.display()),
                }
            }
        } else if let Some(root) = &self.root {
            tracing::debug!("template directory {} does not exist", root.display());
        }

        Ok(templates.into_values().collect())
    }

    /// Resolve `name`, preferring the library directory over built-ins.
    pub fn resolve(&self, name: &str) -> Result<ResolvedTemplate> {
        if let Some(dir) = self.entry_dir(name) {
            let mut template = ResolvedTemplate::from_dir(&dir)?;
            template.name = name.to_string();
            return Ok(template);
        }
        ResolvedTemplate::builtin(name).ok_or_else(|| ScaffoldError::TemplateNotFound(name.to_string()))
    }
}
