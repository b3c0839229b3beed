//! Post-create hooks declared in a template manifest.
//!
//! Each hook is a template string rendered with the same context as the tree,
//! then executed through the platform shell inside the destination directory.
//! All commands are rendered before the first one runs, so an unresolved
//! variable in the last hook stops the whole sequence.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::context::Context;
use crate::error::{Result, ScaffoldError};
use crate::manifest::MANIFEST_FILE;
use crate::templates::renderer::TemplateRenderer;

/// Render every hook command against `context`.
pub fn render_hooks(commands: &[String], context: &Context) -> Result<Vec<String>> {
    let renderer = TemplateRenderer::new(context);
    commands
        .iter()
        .enumerate()
        .map(|(i, command)| {
            let origin = PathBuf::from(format!("{MANIFEST_FILE}#hooks.post_create[{i}]"));
            renderer.render(command, &origin)
        })
        .collect()
}

/// Render and run `commands` in order inside `dir`.
///
/// Returns the rendered commands that were executed. Stops at the first
/// command exiting unsuccessfully.
pub async fn run_hooks(commands: &[String], context: &Context, dir: &Path) -> Result<Vec<String>> {
    let rendered = render_hooks(commands, context)?;

    for command in &rendered {
        tracing::info!("running hook: {command}");
        let output = shell(command)
            .current_dir(dir)
            .output()
            .await
            .map_err(ScaffoldError::io(dir))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("hook output: {}", stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let status = match stderr.trim() {
                "" => output.status.to_string(),
                msg => format!("{}: {msg}", output.status),
            };
            return Err(ScaffoldError::HookFailed {
                command: command.clone(),
                status,
            });
        }
    }

    Ok(rendered)
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
