use std::path::Path;

use anyhow::Result;
use console::style;

use scaffold_kit_core::library::VariableInfo;

use crate::commands::resolve_template;
use crate::output;

/// Show every variable a template declares or references.
pub fn run(template: &str, templates_dir: Option<&Path>, json: bool) -> Result<()> {
    let template = resolve_template(template, templates_dir)?;
    let vars = template.variables()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&vars)?);
        return Ok(());
    }

    output::print_header(&format!("Variables for '{}'", template.name));
    output::print_key_value("source", &template.source.to_string());
    println!();

    if vars.is_empty() {
        println!("  (none)");
    }
    for var in &vars {
        let label = style(status(var));
        let status = if !var.referenced {
            label.dim()
        } else if var.required() {
            label.yellow()
        } else {
            label.green()
        };
        let description = var.description.as_deref().unwrap_or("");
        println!("  {}  {}  {}", style(&var.name).bold(), status, description);
    }
    println!();

    Ok(())
}

fn status(var: &VariableInfo) -> String {
    match (&var.default, var.referenced) {
        (_, false) => "unused".to_string(),
        (Some(default), true) => format!("default: {default}"),
        (None, true) => "required".to_string(),
    }
}
