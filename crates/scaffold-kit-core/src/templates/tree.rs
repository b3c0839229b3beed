//! In-memory template trees.
//!
//! A [`TemplateTree`] is the read-only input of a scaffold run: an ordered tree
//! of directories and files whose names (and, for `.j2` files, contents) may
//! contain `{{ ... }}` expressions. Trees are loaded from disk with
//! [`TemplateTree::load`] or assembled in code for built-in templates.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, ScaffoldError};
use crate::templates::renderer::Template;

/// File-name suffix marking a file whose content is a template.
pub const TEMPLATE_SUFFIX: &str = ".j2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    Directory {
        name: String,
        children: Vec<TemplateNode>,
    },
    File {
        name: String,
        content: Vec<u8>,
        /// Unix permission bits of the source file, when loaded from disk.
        mode: Option<u32>,
    },
}

impl TemplateNode {
    pub fn dir(name: impl Into<String>, children: Vec<TemplateNode>) -> Self {
        Self::Directory {
            name: name.into(),
            children,
        }
    }

    pub fn file(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::File {
            name: name.into(),
            content: content.into(),
            mode: None,
        }
    }

    /// Set the permission bits the rendered copy of a file gets.
    pub fn with_mode(self, mode: u32) -> Self {
        match self {
            Self::File { name, content, .. } => Self::File {
                name,
                content,
                mode: Some(mode),
            },
            dir => dir,
        }
    }

    pub fn mode(&self) -> Option<u32> {
        match self {
            Self::File { mode, .. } => *mode,
            Self::Directory { .. } => None,
        }
    }

    /// The raw (unrendered) entry name.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// True for files carrying the `.j2` marker.
    pub fn is_template(&self) -> bool {
        matches!(self, Self::File { name, .. } if name.ends_with(TEMPLATE_SUFFIX))
    }
}

/// Decode a template file's content as UTF-8.
pub(crate) fn template_source<'a>(content: &'a [u8], path: &Path) -> Result<&'a str> {
    std::str::from_utf8(content).map_err(|e| ScaffoldError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
    })
}

/// A template tree plus the origin used to locate errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateTree {
    origin: PathBuf,
    nodes: Vec<TemplateNode>,
}

impl TemplateTree {
    pub fn new(origin: impl Into<PathBuf>, nodes: Vec<TemplateNode>) -> Self {
        Self {
            origin: origin.into(),
            nodes,
        }
    }

    /// Load every entry under `root`, children sorted by file name.
    ///
    /// Symlinks are followed; a symlink loop is an I/O error.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(ScaffoldError::TemplateDirNotFound(root.to_path_buf()));
        }

        // stack[d] holds the children collected so far for the open directory at depth d
        let mut stack: Vec<(String, Vec<TemplateNode>)> = vec![(String::new(), Vec::new())];

        for entry in WalkDir::new(root)
            .min_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                ScaffoldError::Io {
                    path,
                    source: e.into(),
                }
            })?;

            close_dirs(&mut stack, entry.depth());

            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| {
                    anyhow::anyhow!("template entry {} has a non UTF-8 name", entry.path().display())
                })?
                .to_string();

            if entry.file_type().is_dir() {
                stack.push((name, Vec::new()));
            } else {
                let content =
                    std::fs::read(entry.path()).map_err(ScaffoldError::io(entry.path()))?;
                let mode = file_mode(&entry)?;
                if let Some((_, children)) = stack.last_mut() {
                    children.push(TemplateNode::File {
                        name,
                        content,
                        mode,
                    });
                }
            }
        }

        close_dirs(&mut stack, 1);
        let nodes = stack.pop().map(|(_, nodes)| nodes).unwrap_or_default();

        let tree = Self::new(root, nodes);
        tracing::debug!(
            "loaded template tree from {} ({} entries)",
            root.display(),
            tree.len()
        );
        Ok(tree)
    }

    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    /// Total number of entries at every depth.
    pub fn len(&self) -> usize {
        fn count(nodes: &[TemplateNode]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    TemplateNode::Directory { children, .. } => 1 + count(children),
                    TemplateNode::File { .. } => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every variable referenced by any entry name or `.j2` content.
    ///
    /// Parses the whole tree, so syntax errors and unsupported transforms
    /// surface here too.
    pub fn referenced_variables(&self) -> Result<BTreeSet<String>> {
        let mut vars = BTreeSet::new();
        collect_variables(&self.nodes, &self.origin, &mut vars)?;
        Ok(vars)
    }
}

#[cfg(unix)]
fn file_mode(entry: &walkdir::DirEntry) -> Result<Option<u32>> {
    use std::os::unix::fs::PermissionsExt;

    let meta = entry.metadata().map_err(|e| ScaffoldError::Io {
        path: entry.path().to_path_buf(),
        source: e.into(),
    })?;
    Ok(Some(meta.permissions().mode() & 0o7777))
}

#[cfg(not(unix))]
fn file_mode(_entry: &walkdir::DirEntry) -> Result<Option<u32>> {
    Ok(None)
}

/// Pop finished directories until the stack is `depth` deep.
fn close_dirs(stack: &mut Vec<(String, Vec<TemplateNode>)>, depth: usize) {
    while stack.len() > depth {
        let Some((name, children)) = stack.pop() else {
            return;
        };
        if let Some((_, parent)) = stack.last_mut() {
            parent.push(TemplateNode::Directory { name, children });
        }
    }
}

fn collect_variables(
    nodes: &[TemplateNode],
    parent: &Path,
    vars: &mut BTreeSet<String>,
) -> Result<()> {
    for node in nodes {
        let path = parent.join(node.name());
        let name = Template::parse(node.name(), &path)?;
        vars.extend(name.variables().into_iter().map(str::to_string));

        match node {
            TemplateNode::Directory { children, .. } => collect_variables(children, &path, vars)?,
            TemplateNode::File { content, .. } if node.is_template() => {
                let body = Template::parse(template_source(content, &path)?, &path)?;
                vars.extend(body.variables().into_iter().map(str::to_string));
            }
            TemplateNode::File { .. } => {}
        }
    }
    Ok(())
}
