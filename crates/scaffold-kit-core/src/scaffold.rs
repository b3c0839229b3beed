//! Materialize a [`TemplateTree`] into a destination directory.
//!
//! Rendering runs in three phases:
//!
//! 1. **Plan**: every entry name and `.j2` body is rendered in memory. Any
//!    expression error aborts here, before the filesystem is touched.
//! 2. **Stage**: the plan is written into a hidden `.scaffold-kit-*` temporary
//!    directory on the destination's filesystem: next to a fresh destination,
//!    inside an existing one. File permission bits recorded on the template
//!    are applied here.
//! 3. **Commit**: a fresh destination is produced by a single rename of the
//!    staging directory. An existing destination directory is checked for
//!    conflicts up front, then the staged entries are moved into it; a new
//!    subdirectory moves as a whole.
//!
//! ## Conflict policy
//!
//! | planned   | existing target | `overwrite = false` | `overwrite = true` |
//! |-----------|-----------------|---------------------|--------------------|
//! | directory | directory       | merged              | merged             |
//! | file      | file            | conflict            | replaced           |
//! | directory | file            | conflict            | conflict           |
//! | file      | directory       | conflict            | conflict           |

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::context::Context;
use crate::error::{Result, ScaffoldError};
use crate::templates::renderer::Template;
use crate::templates::tree::{template_source, TemplateNode, TemplateTree, TEMPLATE_SUFFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One entry of the rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEntry {
    /// Path relative to the destination root.
    pub path: PathBuf,
    pub kind: EntryKind,
    /// True when the content came from a `.j2` template rather than a verbatim copy.
    pub templated: bool,
    pub size: u64,
    /// Hex SHA-256 of the file content (files only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Report of a completed render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTree {
    pub root: PathBuf,
    pub entries: Vec<RenderedEntry>,
}

impl RenderedTree {
    pub fn files(&self) -> impl Iterator<Item = &RenderedEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::File)
    }

    pub fn directories(&self) -> impl Iterator<Item = &RenderedEntry> {
        self.entries.iter().filter(|e| e.kind == EntryKind::Directory)
    }

    /// Digest over every entry's kind, `/`-separated path and content hash.
    ///
    /// Equal digests mean byte-identical trees, independent of the root.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for entry in &self.entries {
            let tag: &[u8] = match entry.kind {
                EntryKind::Directory => b"d ",
                EntryKind::File => b"f ",
            };
            hasher.update(tag);
            hasher.update(portable_path(&entry.path).as_bytes());
            hasher.update([0u8]);
            if let Some(sha) = &entry.sha256 {
                hasher.update(sha.as_bytes());
            }
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

fn portable_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug)]
enum Planned {
    Directory,
    File {
        content: Vec<u8>,
        templated: bool,
        mode: Option<u32>,
    },
}

#[derive(Debug)]
struct PlannedEntry {
    path: PathBuf,
    planned: Planned,
}

impl PlannedEntry {
    fn report(&self) -> RenderedEntry {
        match &self.planned {
            Planned::Directory => RenderedEntry {
                path: self.path.clone(),
                kind: EntryKind::Directory,
                templated: false,
                size: 0,
                sha256: None,
            },
            Planned::File {
                content, templated, ..
            } => RenderedEntry {
                path: self.path.clone(),
                kind: EntryKind::File,
                templated: *templated,
                size: content.len() as u64,
                sha256: Some(hex::encode(Sha256::digest(content))),
            },
        }
    }
}

/// Renders template trees against one context.
pub struct Scaffolder<'a> {
    context: &'a Context,
    overwrite: bool,
}

impl<'a> Scaffolder<'a> {
    pub fn new(context: &'a Context) -> Self {
        Self {
            context,
            overwrite: false,
        }
    }

    /// Allow replacing existing files in the destination.
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Render the tree in memory and report what [`Scaffolder::render`] would write.
    pub fn preview(&self, tree: &TemplateTree) -> Result<Vec<RenderedEntry>> {
        Ok(self.plan(tree)?.iter().map(PlannedEntry::report).collect())
    }

    /// Render `tree` into `destination`.
    ///
    /// On error nothing is written to a destination that did not exist. When
    /// merging into an existing directory, conflicts are detected before the
    /// first write; an I/O error mid-merge names the failing path.
    pub fn render(&self, tree: &TemplateTree, destination: &Path) -> Result<RenderedTree> {
        tracing::info!(
            "rendering {} into {}",
            tree.origin().display(),
            destination.display()
        );

        let plan = self.plan(tree)?;

        let merge = match std::fs::metadata(destination) {
            Ok(meta) if meta.is_dir() => {
                self.check_conflicts(&plan, destination)?;
                true
            }
            Ok(_) => return Err(ScaffoldError::DestinationConflict(destination.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(ScaffoldError::io(destination)(e)),
        };

        if merge {
            let staging = stage(&plan, destination)?;
            self.merge(&plan, staging.path(), destination)?;
        } else {
            let parent = match destination.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let created = create_missing_dirs(parent)?;
            let committed = stage(&plan, parent).and_then(|staging| {
                // after the rename the staging guard's cleanup finds nothing to remove
                std::fs::rename(staging.path(), destination).map_err(ScaffoldError::io(destination))
            });
            if let Err(e) = committed {
                remove_created_dirs(&created);
                return Err(e);
            }
        }

        let entries: Vec<RenderedEntry> = plan.iter().map(PlannedEntry::report).collect();
        tracing::info!(
            "rendered {} entries into {}",
            entries.len(),
            destination.display()
        );
        Ok(RenderedTree {
            root: destination.to_path_buf(),
            entries,
        })
    }

    fn plan(&self, tree: &TemplateTree) -> Result<Vec<PlannedEntry>> {
        let mut plan = Vec::with_capacity(tree.len());
        self.plan_nodes(tree.nodes(), tree.origin(), Path::new(""), &mut plan)?;
        Ok(plan)
    }

    fn plan_nodes(
        &self,
        nodes: &[TemplateNode],
        template_parent: &Path,
        out_parent: &Path,
        plan: &mut Vec<PlannedEntry>,
    ) -> Result<()> {
        let mut siblings = BTreeSet::new();

        for node in nodes {
            let template_path = template_parent.join(node.name());

            let raw_name = if node.is_template() {
                &node.name()[..node.name().len() - TEMPLATE_SUFFIX.len()]
            } else {
                node.name()
            };
            let name = Template::parse(raw_name, &template_path)?.render(self.context)?;
            validate_name(&name, &template_path)?;

            let path = out_parent.join(&name);
            if !siblings.insert(name) {
                return Err(ScaffoldError::NameCollision(path));
            }

            match node {
                TemplateNode::Directory { children, .. } => {
                    tracing::debug!("dir  {}", path.display());
                    plan.push(PlannedEntry {
                        path: path.clone(),
                        planned: Planned::Directory,
                    });
                    self.plan_nodes(children, &template_path, &path, plan)?;
                }
                TemplateNode::File { content, mode, .. } => {
                    let templated = node.is_template();
                    let content = if templated {
                        let source = template_source(content, &template_path)?;
                        Template::parse(source, &template_path)?
                            .render(self.context)?
                            .into_bytes()
                    } else {
                        content.clone()
                    };
                    tracing::debug!(
                        "file {} ({} bytes{})",
                        path.display(),
                        content.len(),
                        if templated { ", rendered" } else { "" }
                    );
                    plan.push(PlannedEntry {
                        path,
                        planned: Planned::File {
                            content,
                            templated,
                            mode: *mode,
                        },
                    });
                }
            }
        }
        Ok(())
    }

    fn check_conflicts(&self, plan: &[PlannedEntry], destination: &Path) -> Result<()> {
        for entry in plan {
            let target = destination.join(&entry.path);
            let meta = match std::fs::metadata(&target) {
                Ok(meta) => meta,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(ScaffoldError::io(&target)(e)),
            };
            let conflict = match entry.planned {
                Planned::Directory => !meta.is_dir(),
                Planned::File { .. } => meta.is_dir() || !self.overwrite,
            };
            if conflict {
                return Err(ScaffoldError::DestinationConflict(target));
            }
        }
        Ok(())
    }

    fn merge(&self, plan: &[PlannedEntry], staging: &Path, destination: &Path) -> Result<()> {
        let mut moved: Vec<&Path> = Vec::new();
        for entry in plan {
            if moved.iter().any(|dir| entry.path.starts_with(dir)) {
                continue;
            }
            let target = destination.join(&entry.path);
            match entry.planned {
                Planned::Directory => {
                    if !target.is_dir() {
                        std::fs::rename(staging.join(&entry.path), &target)
                            .map_err(ScaffoldError::io(&target))?;
                        moved.push(&entry.path);
                    }
                }
                Planned::File { .. } => {
                    if self.overwrite && target.is_file() {
                        tracing::debug!("overwriting {}", target.display());
                        std::fs::remove_file(&target).map_err(ScaffoldError::io(&target))?;
                    }
                    std::fs::rename(staging.join(&entry.path), &target)
                        .map_err(ScaffoldError::io(&target))?;
                }
            }
        }
        Ok(())
    }
}

/// Reject names that would escape or alias their parent directory.
fn validate_name(name: &str, template_path: &Path) -> Result<()> {
    let invalid = name.is_empty()
        || name.contains(['/', '\\', '\0'])
        || !matches!(
            Path::new(name).components().next(),
            Some(Component::Normal(_))
        );
    if invalid {
        return Err(ScaffoldError::InvalidName {
            name: name.to_string(),
            template_path: template_path.to_path_buf(),
        });
    }
    Ok(())
}

/// Write the plan into a fresh `.scaffold-kit-*` directory under `dir`.
fn stage(plan: &[PlannedEntry], dir: &Path) -> Result<tempfile::TempDir> {
    let staging = tempfile::Builder::new()
        .prefix(".scaffold-kit-")
        .tempdir_in(dir)
        .map_err(ScaffoldError::io(dir))?;
    tracing::debug!("staging in {}", staging.path().display());
    write_plan(plan, staging.path())?;
    Ok(staging)
}

/// Create `dir` and any missing ancestors, returning the created ones outermost first.
fn create_missing_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut missing: Vec<&Path> = dir
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .take_while(|p| !p.exists())
        .collect();
    missing.reverse();

    let mut created = Vec::with_capacity(missing.len());
    for path in missing {
        match std::fs::create_dir(path) {
            Ok(()) => created.push(path.to_path_buf()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) => {
                remove_created_dirs(&created);
                return Err(ScaffoldError::io(path)(e));
            }
        }
    }
    Ok(created)
}

/// Best-effort removal of directories made by [`create_missing_dirs`].
fn remove_created_dirs(created: &[PathBuf]) {
    for dir in created.iter().rev() {
        if let Err(e) = std::fs::remove_dir(dir) {
            tracing::warn!("could not remove {}: {e}", dir.display());
        }
    }
}

fn write_plan(plan: &[PlannedEntry], root: &Path) -> Result<()> {
    for entry in plan {
        let target = root.join(&entry.path);
        match &entry.planned {
            Planned::Directory => {
                std::fs::create_dir(&target).map_err(ScaffoldError::io(&target))?;
            }
            Planned::File { content, mode, .. } => {
                std::fs::write(&target, content).map_err(ScaffoldError::io(&target))?;
                if let Some(mode) = mode {
                    set_mode(&target, *mode)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .map_err(ScaffoldError::io(path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::embedded;

    fn python_basic() -> TemplateTree {
        embedded::builtin("python-basic").unwrap().1
    }

    fn widget() -> Context {
        Context::new()
            .with("project_name", "Widget")
            .with("description", "A widget.")
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_end_to_end_python_basic() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        let ctx = widget();

        let rendered = Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap();
        assert_eq!(rendered.root, dest);

        let readme = read(&dest.join("README.md"));
        assert!(readme.starts_with("# Widget\n\nA widget.\n"));
        assert!(readme.contains("pip install -e ."));

        let pyproject = read(&dest.join("pyproject.toml"));
        assert!(pyproject.contains("name = \"Widget\""));
        assert!(pyproject.contains("description = \"A widget.\""));
        assert!(pyproject.contains("packages = [\"src/widget\"]"));

        let init = read(&dest.join("src/widget/__init__.py"));
        assert!(init.contains("\"\"\"Widget package.\"\"\""));
        assert!(init.contains("__version__ = \"0.1.0\""));

        assert_eq!(read(&dest.join("tests/__init__.py")), "");

        let files: Vec<_> = rendered.files().map(|e| portable_path(&e.path)).collect();
        assert_eq!(
            files,
            vec![
                "README.md",
                "pyproject.toml",
                "src/widget/__init__.py",
                "tests/__init__.py"
            ]
        );
        assert_eq!(rendered.directories().count(), 3);
    }

    #[test]
    fn test_derived_identifier_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app");
        let ctx = Context::new()
            .with("project_name", "My-Cool-App")
            .with("description", "demo");

        Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap();
        assert!(dest.join("src/my_cool_app").is_dir());
        assert!(dest.join("src/my_cool_app/__init__.py").is_file());
    }

    #[test]
    fn test_suffix_stripping_and_verbatim_copy() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        let raw = vec![0xff, 0xfe, b'{', b'{', b'x', b'}', b'}'];
        let tree = TemplateTree::new(
            "t",
            vec![
                TemplateNode::file("{{name}}.txt.j2", "hello {{name}}"),
                TemplateNode::file("data.bin", raw.clone()),
                TemplateNode::file("notes.md", "{{ left alone }}"),
            ],
        );
        let ctx = Context::new().with("name", "bob");

        let rendered = Scaffolder::new(&ctx).render(&tree, &dest).unwrap();
        assert_eq!(read(&dest.join("bob.txt")), "hello bob");
        assert_eq!(std::fs::read(dest.join("data.bin")).unwrap(), raw);
        assert_eq!(read(&dest.join("notes.md")), "{{ left alone }}");

        let templated: Vec<_> = rendered.entries.iter().map(|e| e.templated).collect();
        assert_eq!(templated, vec![true, false, false]);
    }

    #[test]
    fn test_name_content_symmetry() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        let expr = "{{project_name.lower().replace('-', '_')}}";
        let tree = TemplateTree::new(
            "t",
            vec![TemplateNode::dir(
                expr,
                vec![TemplateNode::file("name.txt.j2", expr)],
            )],
        );
        let ctx = Context::new().with("project_name", "Foo-Bar");

        Scaffolder::new(&ctx).render(&tree, &dest).unwrap();
        assert_eq!(read(&dest.join("foo_bar/name.txt")), "foo_bar");
    }

    #[test]
    fn test_missing_variable_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        let ctx = Context::new().with("project_name", "Widget");

        let err = Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap_err();
        match err {
            ScaffoldError::UnresolvedVariable { name, location, .. } => {
                assert_eq!(name, "description");
                assert_eq!(location.path, Path::new("<builtin>/python-basic/README.md.j2"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_staging_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        Scaffolder::new(&widget()).render(&python_basic(), &dest).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("widget")]);
    }

    #[test]
    fn test_deterministic_output() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = widget();
        let scaffolder = Scaffolder::new(&ctx);

        let a = scaffolder.render(&python_basic(), &dir.path().join("a")).unwrap();
        let b = scaffolder.render(&python_basic(), &dir.path().join("b")).unwrap();
        assert_eq!(a.entries, b.entries);
        assert_eq!(a.digest(), b.digest());

        for entry in a.files() {
            assert_eq!(
                std::fs::read(dir.path().join("a").join(&entry.path)).unwrap(),
                std::fs::read(dir.path().join("b").join(&entry.path)).unwrap()
            );
        }
    }

    #[test]
    fn test_digest_changes_with_context() {
        let ctx = widget();
        let other = widget().with("description", "Another widget.");
        let tree = python_basic();
        let digest = |ctx: &Context| {
            RenderedTree {
                root: PathBuf::new(),
                entries: Scaffolder::new(ctx).preview(&tree).unwrap(),
            }
            .digest()
        };
        assert_ne!(digest(&ctx), digest(&other));
    }

    #[test]
    fn test_conflict_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        let ctx = widget();
        Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap();
        std::fs::write(dest.join("README.md"), "edited").unwrap();

        let err = Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap_err();
        match err {
            ScaffoldError::DestinationConflict(path) => assert_eq!(path, dest.join("README.md")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(read(&dest.join("README.md")), "edited");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_overwrite_replaces_files() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        let ctx = widget();
        Scaffolder::new(&ctx).render(&python_basic(), &dest).unwrap();
        std::fs::write(dest.join("README.md"), "edited").unwrap();
        std::fs::write(dest.join("extra.txt"), "keep me").unwrap();

        Scaffolder::new(&ctx)
            .overwrite(true)
            .render(&python_basic(), &dest)
            .unwrap();
        assert!(read(&dest.join("README.md")).starts_with("# Widget"));
        assert_eq!(read(&dest.join("extra.txt")), "keep me");
    }

    #[test]
    fn test_merge_into_existing_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        std::fs::create_dir(&dest).unwrap();

        Scaffolder::new(&widget()).render(&python_basic(), &dest).unwrap();
        assert!(dest.join("src/widget/__init__.py").is_file());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_kind_mismatch_conflicts_even_with_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("src"), "not a directory").unwrap();

        let err = Scaffolder::new(&widget())
            .overwrite(true)
            .render(&python_basic(), &dest)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::DestinationConflict(p) if p == dest.join("src")));
        assert!(!dest.join("README.md").exists());
    }

    #[test]
    fn test_destination_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        std::fs::write(&dest, "").unwrap();
        let err = Scaffolder::new(&widget())
            .render(&python_basic(), &dest)
            .unwrap_err();
        assert!(matches!(err, ScaffoldError::DestinationConflict(_)));
    }

    #[test]
    fn test_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/widget");
        Scaffolder::new(&widget()).render(&python_basic(), &dest).unwrap();
        assert!(dest.join("README.md").is_file());
    }

    #[test]
    fn test_invalid_rendered_name() {
        let tree = TemplateTree::new("t", vec![TemplateNode::file("{{x}}", "")]);
        for value in ["", "..", ".", "a/b", "..\\x"] {
            let ctx = Context::new().with("x", value);
            let err = Scaffolder::new(&ctx).preview(&tree).unwrap_err();
            assert!(
                matches!(err, ScaffoldError::InvalidName { .. }),
                "expected invalid name for {value:?}, got {err}"
            );
        }
    }

    #[test]
    fn test_sibling_name_collision() {
        let tree = TemplateTree::new(
            "t",
            vec![
                TemplateNode::file("a", "plain"),
                TemplateNode::file("a.j2", "templated"),
            ],
        );
        let err = Scaffolder::new(&Context::new()).preview(&tree).unwrap_err();
        assert!(matches!(err, ScaffoldError::NameCollision(p) if p == Path::new("a")));
    }

    #[test]
    fn test_unsupported_transform_in_name() {
        let tree = TemplateTree::new(
            "t",
            vec![TemplateNode::dir("{{name.reverse()}}", vec![])],
        );
        let ctx = Context::new().with("name", "x");
        let err = Scaffolder::new(&ctx).preview(&tree).unwrap_err();
        match err {
            ScaffoldError::UnsupportedTransform { transform, location, .. } => {
                assert_eq!(transform, "reverse");
                assert_eq!(location.path, Path::new("t/{{name.reverse()}}"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_preview_matches_render() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = widget();
        let scaffolder = Scaffolder::new(&ctx);
        let preview = scaffolder.preview(&python_basic()).unwrap();
        let rendered = scaffolder
            .render(&python_basic(), &dir.path().join("w"))
            .unwrap();
        assert_eq!(preview, rendered.entries);
        for entry in rendered.files() {
            let len = std::fs::metadata(dir.path().join("w").join(&entry.path))
                .unwrap()
                .len();
            assert_eq!(len, entry.size);
        }
    }

    #[test]
    fn test_merge_stages_inside_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        std::fs::create_dir_all(dest.join("tests")).unwrap();
        std::fs::write(dest.join("tests/conftest.py"), "").unwrap();
        std::fs::write(dest.join("notes.txt"), "mine").unwrap();

        Scaffolder::new(&widget()).render(&python_basic(), &dest).unwrap();
        assert!(dest.join("src/widget/__init__.py").is_file());
        assert!(dest.join("tests/__init__.py").is_file());
        assert!(dest.join("tests/conftest.py").is_file());
        assert_eq!(read(&dest.join("notes.txt")), "mine");

        let leftovers: Vec<_> = std::fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".scaffold-kit-"))
            .collect();
        assert!(leftovers.is_empty(), "staging left behind: {leftovers:?}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_modes_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let template = tempfile::tempdir().unwrap();
        let script = template.path().join("setup.sh");
        std::fs::write(&script, "#!/bin/sh\necho hi\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        let runner = template.path().join("run-{{project_name}}.sh.j2");
        std::fs::write(&runner, "#!/bin/sh\necho {{project_name}}\n").unwrap();
        std::fs::set_permissions(&runner, std::fs::Permissions::from_mode(0o750)).unwrap();

        let tree = TemplateTree::load(template.path()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        Scaffolder::new(&widget()).render(&tree, &dest).unwrap();

        let mode = |name: &str| {
            std::fs::metadata(dest.join(name)).unwrap().permissions().mode() & 0o777
        };
        assert_eq!(mode("setup.sh"), 0o755);
        assert_eq!(mode("run-Widget.sh"), 0o750);
        assert_eq!(read(&dest.join("run-Widget.sh")), "#!/bin/sh\necho Widget\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_render_removes_created_parents() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a/b/widget");
        let too_long = "x".repeat(300);
        let tree = TemplateTree::new("t", vec![TemplateNode::file(too_long, "")]);

        let err = Scaffolder::new(&widget()).render(&tree, &dest).unwrap_err();
        assert!(matches!(err, ScaffoldError::Io { .. }));
        assert!(!dir.path().join("a").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
