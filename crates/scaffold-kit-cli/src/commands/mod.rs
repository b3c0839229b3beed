//! CLI command implementations for scaffold-kit.
//!
//! Each module corresponds to a subcommand (`scaffold-kit <command>`).

pub mod list;
pub mod new;
pub mod vars;

use std::path::Path;

use anyhow::Result;
use scaffold_kit_core::library::{ResolvedTemplate, TemplateLibrary};

/// Resolve a template argument: an existing directory path wins over a library name.
pub fn resolve_template(spec: &str, templates_dir: Option<&Path>) -> Result<ResolvedTemplate> {
    let path = Path::new(spec);
    if path.is_dir() {
        return Ok(ResolvedTemplate::from_dir(path)?);
    }
    let library = TemplateLibrary::new(templates_dir.map(Path::to_path_buf));
    Ok(library.resolve(spec)?)
}
