mod cmd;
mod logging;
mod output;
mod root;

use clap::{Parser, Subcommand};
use storyforge_core::config::{Config, DEFAULT_SPEAK_COMMAND};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "storyforge",
    about = "Generate user stories from the epic catalog and keep epics and stories in step",
    version,
    propagate_version = true
)]
struct Cli {
    /// Documentation root holding epics/ and stories/ (default: nearest project_documentation/)
    #[arg(long, global = true, env = "PROJECT_DOCS")]
    docs: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Don't announce progress through the speech program
    #[arg(long, global = true)]
    no_speak: bool,

    /// Catalog YAML to generate from instead of the built-in one
    #[arg(long, global = true, env = "STORY_CATALOG")]
    catalog: Option<PathBuf>,

    /// Speech program handed each announcement as its only argument
    #[arg(long, global = true, env = "SPEAK_ORCHESTRATOR", default_value = DEFAULT_SPEAK_COMMAND)]
    speak_command: String,

    /// Harmonization log (default: harmonization.log beside the docs root)
    #[arg(long, global = true, env = "HARMONIZE_LOG")]
    log_file: Option<PathBuf>,

    /// Report destination (default: harmonization-report.md beside the docs root)
    #[arg(long, global = true, env = "HARMONIZE_REPORT")]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize every catalog story that doesn't exist yet and rewrite the mapping
    Generate,

    /// Back up, then split, create, enhance, link and report
    Harmonize,

    /// Write the validation report without touching any document
    Report,

    /// Check harmonize.yaml for common mistakes
    Check,
}

fn main() {
    let cli = Cli::parse();

    let docs_root = root::resolve_docs_root(cli.docs.as_deref());
    let mut config = Config::new(docs_root);
    config.speak_command = cli.speak_command;
    if let Some(path) = cli.log_file {
        config.log_file = path;
    }
    if let Some(path) = cli.report {
        config.report_path = path;
    }

    let run_log = matches!(cli.command, Commands::Harmonize).then_some(config.log_file.as_path());
    logging::init(run_log);

    let speak = !cli.no_speak;
    let result = match cli.command {
        Commands::Generate => cmd::generate::run(&config, cli.catalog.as_deref(), cli.json),
        Commands::Harmonize => cmd::harmonize::run(&config, speak, cli.json),
        Commands::Report => cmd::report::run(&config, speak, cli.json),
        Commands::Check => cmd::check::run(&config, cli.json),
    };

    if let Err(e) = result {
        tracing::error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
