//! Tool presence checks for a template's `requires` list.
//!
//! Missing tools are reported, never treated as errors: the scaffold itself
//! does not need them, only the generated project's workflow does.

use std::path::PathBuf;

/// A required tool that could not be found on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    pub tool_name: String,
}

/// Look up every tool on `PATH`.
pub fn check_tools(tools: &[String]) -> std::result::Result<Vec<PathBuf>, Vec<MissingTool>> {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for tool in tools {
        match which::which(tool) {
            Ok(path) => {
                tracing::debug!("found {tool} at {}", path.display());
                found.push(path);
            }
            Err(_) => missing.push(MissingTool {
                tool_name: tool.clone(),
            }),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(missing)
    }
}
