//! Terminal output formatting for the scaffold-kit CLI.
//!
//! Provides consistent, colored output using the [`console`] crate.

use console::style;

use scaffold_kit_core::scaffold::{EntryKind, RenderedEntry};

/// Print a bold cyan header with an underline separator.
pub fn print_header(text: &str) {
    println!("\n{}", style(text).bold().cyan());
    println!("{}", style("=".repeat(text.chars().count())).dim());
}

/// Print a success message prefixed with green `[OK]`.
pub fn print_success(text: &str) {
    println!("{} {}", style("[OK]").green().bold(), text);
}

/// Print a warning message prefixed with yellow `[WARN]`.
pub fn print_warning(text: &str) {
    println!("{} {}", style("[WARN]").yellow().bold(), text);
}

/// Print an error message prefixed with red `[ERROR]` to stderr.
pub fn print_error(text: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), text);
}

/// Print a progress step indicator like `[1/4] Collecting variables...`.
pub fn print_step(step: u32, total: u32, text: &str) {
    println!("{} {}", style(format!("[{step}/{total}]")).dim(), text);
}

/// Print a key-value pair with dimmed key formatting.
pub fn print_key_value(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print rendered entries as an indented tree, followed by a count line.
///
/// Entries arrive in pre-order, so indenting each by its depth is enough to
/// show the nesting. Files that came from a `.j2` template are marked.
pub fn print_tree(entries: &[RenderedEntry]) {
    for entry in entries {
        let depth = entry.path.components().count();
        let indent = "  ".repeat(depth);
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match entry.kind {
            EntryKind::Directory => println!("{indent}{}/", style(name).blue()),
            EntryKind::File if entry.templated => {
                println!("{indent}{name} {}", style("(rendered)").dim())
            }
            EntryKind::File => println!("{indent}{name}"),
        }
    }

    let files = entries.iter().filter(|e| e.kind == EntryKind::File).count();
    let templated = entries.iter().filter(|e| e.templated).count();
    println!(
        "  {}",
        style(format!(
            "{} directories, {files} files ({templated} rendered)",
            entries.len() - files
        ))
        .dim()
    );
}
