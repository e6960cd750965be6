//! Export and import commands
//!
//! Usage: snipstash export <PATH> [--ids 1,2] [--code]
//!        snipstash import <PATH> [--dup-action skip|ignore|replace]

use clap::{Args, ValueEnum};
use snipstash_engine::commands::export::{self, DupAction};
use snipstash_engine::SnippetEnv;
use snipstash_store::tables::TableCheckCache;
use std::path::PathBuf;

use super::common::{self, DbArgs};

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file path
    pub path: PathBuf,

    /// Snippet IDs to export (all when omitted)
    #[arg(long, value_delimiter = ',')]
    pub ids: Vec<i64>,

    /// Export as a plain source file instead of a JSON document
    #[arg(long)]
    pub code: bool,

    #[command(flatten)]
    pub db: DbArgs,

    /// Export from the tenant-shared table
    #[arg(long)]
    pub network: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DupActionArg {
    Skip,
    Ignore,
    Replace,
}

impl From<DupActionArg> for DupAction {
    fn from(arg: DupActionArg) -> Self {
        match arg {
            DupActionArg::Skip => DupAction::Skip,
            DupActionArg::Ignore => DupAction::Ignore,
            DupActionArg::Replace => DupAction::Replace,
        }
    }
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to a JSON export document
    pub path: PathBuf,

    /// How to handle snippets whose name already exists
    #[arg(long, value_enum, default_value_t = DupActionArg::Ignore)]
    pub dup_action: DupActionArg,

    #[command(flatten)]
    pub db: DbArgs,

    /// Import into the tenant-shared table
    #[arg(long)]
    pub network: bool,
}

/// Execute export command
pub fn execute_export(args: ExportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (conn, cache) = common::open(&args.db)?;
    let env = SnippetEnv::new(&conn, &cache, args.db.site, args.db.multisite);
    env.bootstrap(&TableCheckCache::new())?;

    let output = if args.code {
        export::export_code(&env, &args.ids, args.network)?
    } else {
        export::export_snippets_json(&env, &args.ids, args.network)?
    };

    std::fs::write(&args.path, output)?;
    println!("✓ Exported to {}", args.path.display());
    Ok(())
}

/// Execute import command
pub fn execute_import(args: ImportArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (conn, cache) = common::open(&args.db)?;
    let env = SnippetEnv::new(&conn, &cache, args.db.site, args.db.multisite);
    env.bootstrap(&TableCheckCache::new())?;

    let json = std::fs::read_to_string(&args.path)?;
    let imported =
        export::import_snippets_json(&env, &json, args.network, args.dup_action.into())?;

    println!("✓ Imported {} snippet(s)", imported.len());
    Ok(())
}
