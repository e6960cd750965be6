//! Snippet management commands
//!
//! Usage: snipstash snippet <list|show|create|activate|deactivate|delete|clone|tags|check>

use clap::{Args, Subcommand};
use snipstash_core::model::{Scope, Snippet};
use snipstash_engine::commands::snippet_ops;
use snipstash_engine::SnippetEnv;
use snipstash_store::tables::TableCheckCache;
use std::path::PathBuf;

use super::common::{self, DbArgs};

#[derive(Debug, Args)]
pub struct SnippetArgs {
    #[command(subcommand)]
    pub command: SnippetCommand,

    #[command(flatten)]
    pub db: DbArgs,

    /// Operate on the tenant-shared table
    #[arg(long, global = true)]
    pub network: bool,
}

#[derive(Debug, Subcommand)]
pub enum SnippetCommand {
    /// List all snippets
    List,
    /// Show one snippet in full
    Show { id: i64 },
    /// Create a new snippet
    Create(CreateArgs),
    /// Activate a snippet
    Activate { id: i64 },
    /// Deactivate a snippet
    Deactivate { id: i64 },
    /// Delete a snippet
    Delete { id: i64 },
    /// Clone a snippet into a new inactive copy
    Clone { id: i64 },
    /// List every tag in use
    Tags,
    /// Check a snippet's code for syntax errors
    Check { id: i64 },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Snippet title
    #[arg(long)]
    pub name: String,

    /// Read the code from a file instead of --code
    #[arg(long, conflicts_with = "code")]
    pub file: Option<PathBuf>,

    /// Inline snippet code
    #[arg(long)]
    pub code: Option<String>,

    /// Execution scope
    #[arg(long, default_value = "global")]
    pub scope: String,

    /// Execution priority (lower runs first)
    #[arg(long, default_value_t = 10)]
    pub priority: i32,

    /// Comma-separated tag list
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Description text
    #[arg(long, default_value = "")]
    pub desc: String,
}

/// Execute snippet command
pub fn execute(args: SnippetArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (conn, cache) = common::open(&args.db)?;
    let env = SnippetEnv::new(&conn, &cache, args.db.site, args.db.multisite);
    env.bootstrap(&TableCheckCache::new())?;
    let network = args.network;

    match args.command {
        SnippetCommand::List => {
            for snippet in snippet_ops::get_snippets(&env, &[], network)? {
                let marker = if snippet.active { "*" } else { " " };
                println!(
                    "{} [{:>4}] {:<30} {:<16} p{}",
                    marker,
                    snippet.id,
                    snippet.display_name(),
                    snippet.scope.as_str(),
                    snippet.priority
                );
            }
        }
        SnippetCommand::Show { id } => {
            let snippet = snippet_ops::get_snippet(&env, id, network)?;
            if !snippet.is_saved() {
                return Err(format!("snippet {} not found", id).into());
            }
            println!("Name:     {}", snippet.display_name());
            println!("Scope:    {} ({})", snippet.scope.as_str(), snippet.lang());
            println!("Priority: {}", snippet.priority);
            println!("Active:   {}", snippet.active);
            if !snippet.tags.is_empty() {
                println!("Tags:     {}", snippet.tags_list());
            }
            if let Some(modified) = snippet.modified {
                println!("Modified: {}", modified.format("%Y-%m-%d %H:%M:%S"));
            }
            if !snippet.desc.is_empty() {
                println!("\n{}", snippet.desc);
            }
            println!("\n{}", snippet.code);
        }
        SnippetCommand::Create(create) => {
            let code = match (&create.file, &create.code) {
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, Some(code)) => code.clone(),
                (None, None) => return Err("provide --code or --file".into()),
            };
            let scope = Scope::parse(&create.scope)
                .ok_or_else(|| format!("unknown scope '{}'", create.scope))?;

            let mut snippet = Snippet::new();
            snippet.name = create.name;
            snippet.desc = create.desc;
            snippet.code = code;
            snippet.scope = scope;
            snippet.priority = create.priority;
            snippet.network = network;
            snippet.set_tags(&create.tags);

            let saved = snippet_ops::save_snippet(&env, snippet)?;
            println!("✓ Created snippet {}", saved.id);
        }
        SnippetCommand::Activate { id } => {
            snippet_ops::activate_snippet(&env, id, network)?;
            println!("✓ Activated snippet {}", id);
        }
        SnippetCommand::Deactivate { id } => {
            snippet_ops::deactivate_snippet(&env, id, network)?;
            println!("✓ Deactivated snippet {}", id);
        }
        SnippetCommand::Delete { id } => {
            snippet_ops::delete_snippet(&env, id, network)?;
            println!("✓ Deleted snippet {}", id);
        }
        SnippetCommand::Clone { id } => {
            let copy = snippet_ops::clone_snippet(&env, id, network)?;
            println!("✓ Cloned snippet {} into {}", id, copy.id);
        }
        SnippetCommand::Tags => {
            for tag in snippet_ops::get_all_snippet_tags(&env, network)? {
                println!("{}", tag);
            }
        }
        SnippetCommand::Check { id } => {
            let mut snippet = snippet_ops::get_snippet(&env, id, network)?;
            if !snippet.is_saved() {
                return Err(format!("snippet {} not found", id).into());
            }
            snippet_ops::test_snippet_code(&mut snippet);
            match snippet.code_error {
                Some(error) => return Err(format!("syntax error: {}", error).into()),
                None => println!("✓ No syntax errors found"),
            }
        }
    }

    Ok(())
}
