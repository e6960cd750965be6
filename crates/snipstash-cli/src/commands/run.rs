//! Execution sweep command
//!
//! Usage: snipstash run [--admin] [--safe-mode]
//!
//! Simulates one request against the database and reports which snippets
//! would execute. The CLI ships no interpreter, so the sweep uses the
//! no-op runner: snippets are selected, consumed, and reported, but
//! their code is not evaluated.

use clap::Args;
use snipstash_core::context::StaticContext;
use snipstash_core::hooks::NoopHooks;
use snipstash_core::runner::NoopRunner;
use snipstash_engine::commands::execute;
use snipstash_engine::SnippetEnv;
use snipstash_store::tables::TableCheckCache;

use super::common::{self, DbArgs};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Simulate an administrative request
    #[arg(long)]
    pub admin: bool,

    /// Engage the safe-mode kill switch
    #[arg(long)]
    pub safe_mode: bool,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Execute run command
pub fn execute(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (conn, cache) = common::open(&args.db)?;
    let env = SnippetEnv::new(&conn, &cache, args.db.site, args.db.multisite);
    env.bootstrap(&TableCheckCache::new())?;

    let mut ctx = if args.admin {
        StaticContext::admin(args.db.site)
    } else {
        StaticContext::front_end(args.db.site)
    };
    ctx.safe_mode = args.safe_mode;

    let report = execute::execute_active_snippets(&env, &ctx, &NoopHooks, &NoopRunner)?;

    println!("Executed: {:?}", report.executed);
    println!("Skipped:  {:?}", report.skipped);
    for (id, failure) in &report.failed {
        println!("Failed:   {} ({})", id, failure);
    }
    Ok(())
}
