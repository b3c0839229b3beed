//! Compile-time embedded built-in templates.
//!
//! Each constant loads a file from the repository's `templates/` directory via
//! [`include_str!`]. The paths are relative to this source file
//! (`crates/scaffold-kit-core/src/templates/embedded.rs`).
//!
//! ## Adding a built-in template
//!
//! 1. Create `templates/<name>/template.json` and `templates/<name>/files/`
//! 2. Add `pub const`s here with `include_str!("../../../../templates/<name>/...")`
//! 3. Assemble the tree in a function and register it in [`builtin`] and [`BUILTIN_NAMES`]
//!
//! Do NOT rename or move template files without updating the paths here.

use crate::manifest::TemplateManifest;
use crate::templates::tree::{TemplateNode, TemplateTree};

// -------------------------------------------------------
// python-basic
// -------------------------------------------------------

pub const PYTHON_BASIC_MANIFEST: &str =
    include_str!("../../../../templates/python-basic/template.json");
pub const PYTHON_BASIC_README: &str =
    include_str!("../../../../templates/python-basic/files/README.md.j2");
pub const PYTHON_BASIC_PYPROJECT: &str =
    include_str!("../../../../templates/python-basic/files/pyproject.toml.j2");
pub const PYTHON_BASIC_PACKAGE_INIT: &str = include_str!(
    "../../../../templates/python-basic/files/src/{{project_name.lower().replace('-', '_')}}/__init__.py.j2"
);
pub const PYTHON_BASIC_TESTS_INIT: &str =
    include_str!("../../../../templates/python-basic/files/tests/__init__.py");

/// Name of the template used when none is requested.
pub const DEFAULT_TEMPLATE: &str = "python-basic";

/// Every template compiled into the binary.
pub const BUILTIN_NAMES: &[&str] = &["python-basic"];

/// Look up a built-in template by name.
pub fn builtin(name: &str) -> Option<(TemplateManifest, TemplateTree)> {
    match name {
        "python-basic" => Some(python_basic()),
        _ => None,
    }
}

fn python_basic() -> (TemplateManifest, TemplateTree) {
    let manifest = TemplateManifest::from_json(PYTHON_BASIC_MANIFEST).unwrap_or_else(|e| {
        tracing::warn!("embedded python-basic manifest is invalid: {e}");
        TemplateManifest::named("python-basic")
    });

    let tree = TemplateTree::new(
        "<builtin>/python-basic",
        vec![
            TemplateNode::file("README.md.j2", PYTHON_BASIC_README),
            TemplateNode::file("pyproject.toml.j2", PYTHON_BASIC_PYPROJECT),
            TemplateNode::dir(
                "src",
                vec![TemplateNode::dir(
                    "{{project_name.lower().replace('-', '_')}}",
                    vec![TemplateNode::file("__init__.py.j2", PYTHON_BASIC_PACKAGE_INIT)],
                )],
            ),
            TemplateNode::dir(
                "tests",
                vec![TemplateNode::file("__init__.py", PYTHON_BASIC_TESTS_INIT)],
            ),
        ],
    );

    (manifest, tree)
}
