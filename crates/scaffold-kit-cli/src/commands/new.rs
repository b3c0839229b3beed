use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use console::Term;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use scaffold_kit_core::context::Context;
use scaffold_kit_core::hooks;
use scaffold_kit_core::library::{ResolvedTemplate, TemplateLibrary};
use scaffold_kit_core::prerequisites;
use scaffold_kit_core::scaffold::{RenderedEntry, RenderedTree, Scaffolder};
use scaffold_kit_core::templates::embedded;

use crate::output;

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Destination directory (its name becomes the default `project_name`)
    pub destination: PathBuf,

    /// Template name from the library or the built-ins
    #[arg(long, short, conflicts_with = "template_dir")]
    pub template: Option<String>,

    /// Render a template directory directly instead of a named template
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Set a variable (repeatable)
    #[arg(long = "var", short = 'D', value_name = "NAME=VALUE")]
    pub vars: Vec<String>,

    /// JSON file of variables
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Overwrite files that already exist in the destination
    #[arg(long, short)]
    pub force: bool,

    /// Skip the template's post-create hooks
    #[arg(long)]
    pub no_hooks: bool,

    /// Never prompt; fail on missing variables instead
    #[arg(long)]
    pub no_input: bool,

    /// Render in memory and list what would be written
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    template: &'a str,
    digest: String,
    #[serde(flatten)]
    tree: &'a RenderedTree,
    hooks: Vec<String>,
    missing_tools: Vec<String>,
}

/// Create a new project from a template.
///
/// Resolves the template, assembles the context, renders the tree, runs the
/// post-create hooks, and checks the template's required tools. Missing
/// variables are prompted for when attached to a terminal.
pub async fn run(args: NewArgs, templates_dir: Option<&Path>) -> Result<()> {
    let template = match &args.template_dir {
        Some(dir) => ResolvedTemplate::from_dir(dir)?,
        None => {
            let library = TemplateLibrary::new(templates_dir.map(Path::to_path_buf));
            library.resolve(args.template.as_deref().unwrap_or(embedded::DEFAULT_TEMPLATE))?
        }
    };

    let verbose = !args.json;
    let step = |n: u32, text: &str| {
        if verbose {
            output::print_step(n, 4, text);
        }
    };

    if verbose {
        output::print_header(&format!("scaffold-kit new: {}", args.destination.display()));
    }

    step(1, &format!("Collecting variables for template '{}'", template.name));
    let context = build_context(&template, &args)?;

    if args.dry_run {
        let entries = Scaffolder::new(&context).preview(&template.tree)?;
        print_entries(&entries, args.json)?;
        return Ok(());
    }

    step(2, &format!("Rendering into {}", args.destination.display()));
    let rendered = Scaffolder::new(&context)
        .overwrite(args.force)
        .render(&template.tree, &args.destination)?;

    step(3, "Running post-create hooks");
    let commands = &template.manifest.hooks.post_create;
    let ran = if commands.is_empty() {
        Vec::new()
    } else if args.no_hooks {
        if verbose {
            output::print_warning(&format!("Skipped {} post-create hook(s)", commands.len()));
        }
        Vec::new()
    } else {
        let spinner = if verbose {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("  {spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };
        spinner.set_message(format!("{} hook(s)", commands.len()));
        let result = hooks::run_hooks(commands, &context, &args.destination).await;
        spinner.finish_and_clear();
        result?
    };

    step(4, "Checking prerequisites");
    let missing_tools = match prerequisites::check_tools(&template.manifest.requires) {
        Ok(_) => Vec::new(),
        Err(missing) => missing.into_iter().map(|m| m.tool_name).collect(),
    };

    if args.json {
        let report = Report {
            template: &template.name,
            digest: rendered.digest(),
            tree: &rendered,
            hooks: ran,
            missing_tools,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for tool in &missing_tools {
        output::print_warning(&format!("Missing: {tool} (the generated project expects it on PATH)"));
    }
    if missing_tools.is_empty() && !template.manifest.requires.is_empty() {
        output::print_success("All required tools found");
    }
    for command in &ran {
        output::print_key_value("hook", command);
    }

    println!();
    output::print_tree(&rendered.entries);
    println!();

    output::print_success(&format!(
        "Created {} from '{}' ({} files)",
        args.destination.display(),
        template.name,
        rendered.files().count()
    ));
    output::print_key_value("digest", &rendered.digest());
    println!();

    Ok(())
}

/// Assemble the context in precedence order: manifest defaults, destination
/// name as `project_name`, context file, `--var` flags, then prompts.
fn build_context(template: &ResolvedTemplate, args: &NewArgs) -> Result<Context> {
    let mut context = Context::new();
    template.manifest.apply_defaults(&mut context);

    if let Some(name) = args.destination.file_name() {
        context.insert("project_name", name.to_string_lossy());
    }
    if let Some(path) = &args.context {
        context.extend(Context::load(path)?);
    }
    for assignment in &args.vars {
        let (name, value) = Context::parse_assignment(assignment)?;
        context.insert(name, value);
    }

    let missing = template.missing_variables(&context)?;
    if missing.is_empty() {
        return Ok(context);
    }

    if args.no_input || args.json || !Term::stdout().is_term() {
        tracing::debug!("not prompting for {} missing variable(s)", missing.len());
        return Ok(context);
    }

    for name in missing {
        let prompt = template
            .manifest
            .variables
            .get(&name)
            .and_then(|spec| spec.description.clone())
            .unwrap_or_else(|| name.clone());
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        context.insert(name, value);
    }

    Ok(context)
}

fn print_entries(entries: &[RenderedEntry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    println!();
    output::print_tree(entries);
    println!();
    output::print_success(&format!("Dry run: {} entries would be written", entries.len()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: NewArgs,
    }

    fn parse(argv: &[&str]) -> NewArgs {
        let mut full = vec!["new", "--no-input"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    fn python_basic() -> ResolvedTemplate {
        ResolvedTemplate::builtin("python-basic").unwrap()
    }

    #[test]
    fn test_destination_name_and_defaults() {
        let ctx = build_context(&python_basic(), &parse(&["out/widget"])).unwrap();
        assert_eq!(ctx.get("project_name"), Some("widget"));
        assert_eq!(ctx.get("description"), Some("A new Python project."));
    }

    #[test]
    fn test_var_flags_override_everything() {
        let dir = tempfile::tempdir().unwrap();
        let ctx_file = dir.path().join("ctx.json");
        std::fs::write(&ctx_file, r#"{"project_name": "Gadget", "description": "From file"}"#)
            .unwrap();

        let args = parse(&[
            "widget",
            "--context",
            ctx_file.to_str().unwrap(),
            "-D",
            "description=From flag",
        ]);
        let ctx = build_context(&python_basic(), &args).unwrap();
        assert_eq!(ctx.get("project_name"), Some("Gadget"));
        assert_eq!(ctx.get("description"), Some("From flag"));
    }

    #[test]
    fn test_bad_assignment_is_an_error() {
        let args = parse(&["widget", "--var", "oops"]);
        assert!(build_context(&python_basic(), &args).is_err());
    }

    #[test]
    fn test_template_and_template_dir_conflict() {
        let result = TestCli::try_parse_from([
            "new",
            "widget",
            "--template",
            "python-basic",
            "--template-dir",
            "some/dir",
        ]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_renders_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("Widget");
        let args = parse(&[dest.to_str().unwrap(), "--json", "-D", "description=A widget."]);

        run(args, None).await.unwrap();
        let readme = std::fs::read_to_string(dest.join("README.md")).unwrap();
        assert!(readme.starts_with("# Widget\n\nA widget.\n"));
        assert!(dest.join("src/widget/__init__.py").is_file());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("widget");
        let args = parse(&[dest.to_str().unwrap(), "--dry-run", "--json"]);

        run(args, None).await.unwrap();
        assert!(!dest.exists());
    }
}
