use std::path::Path;

use anyhow::Result;
use console::style;

use scaffold_kit_core::library::TemplateLibrary;

use crate::output;

/// List the library's templates followed by the built-ins they do not shadow.
pub fn run(templates_dir: Option<&Path>, json: bool) -> Result<()> {
    let library = TemplateLibrary::new(templates_dir.map(Path::to_path_buf));
    let templates = library.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    output::print_header("Available templates");
    if let Some(root) = library.root() {
        output::print_key_value("library", &root.display().to_string());
    }
    println!();

    let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for template in &templates {
        println!(
            "  {}  {}  {}",
            style(format!("{:width$}", template.name)).bold(),
            template.description,
            style(format!("[{}]", template.source)).dim(),
        );
    }
    println!();

    Ok(())
}
