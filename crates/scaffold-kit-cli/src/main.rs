//! scaffold-kit CLI: create projects from template trees.
//!
//! Provides three commands: `new`, `list`, and `vars`.
//!
//! Each command delegates to [`scaffold_kit_core`]; this crate only collects
//! input (flags, context files, prompts) and formats output.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scaffold-kit",
    about = "Scaffold new projects from template trees with {{ expression }} placeholders",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory of named templates (each `<name>/template.json` + `<name>/files/`)
    #[arg(long, global = true, env = "SCAFFOLD_KIT_TEMPLATES")]
    templates_dir: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template into a new project directory
    New(commands::new::NewArgs),

    /// List available templates
    List {
        /// Print the list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the variables a template uses
    Vars {
        /// Template name, or path to a template directory
        template: String,

        /// Print the variables as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let templates_dir = cli.templates_dir.as_deref();
    let result = match cli.command {
        Commands::New(args) => commands::new::run(args, templates_dir).await,
        Commands::List { json } => commands::list::run(templates_dir, json),
        Commands::Vars { template, json } => commands::vars::run(&template, templates_dir, json),
    };

    if let Err(e) = result {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
