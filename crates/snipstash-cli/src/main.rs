//! Snipstash CLI
//!
//! Command-line interface for Snipstash

use clap::{Parser, Subcommand};
use snipstash_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "snipstash")]
#[command(about = "Snipstash - Code snippet management and execution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Snippet management operations
    Snippet(commands::snippet::SnippetArgs),
    /// Export snippets to a JSON document or source file
    Export(commands::transfer::ExportArgs),
    /// Import snippets from a JSON document
    Import(commands::transfer::ImportArgs),
    /// Execute active snippets for a simulated request
    Run(commands::run::RunArgs),
    /// Render passthrough snippet output (content, styles, scripts)
    Render(commands::render::RenderArgs),
}

fn main() {
    logging_facility::init(Profile::Development);

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Snippet(args) => commands::snippet::execute(args),
        Commands::Export(args) => commands::transfer::execute_export(args),
        Commands::Import(args) => commands::transfer::execute_import(args),
        Commands::Run(args) => commands::run::execute(args),
        Commands::Render(args) => commands::render::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
