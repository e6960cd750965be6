//! Render command
//!
//! Usage: snipstash render <head|footer|styles|admin-styles|head-scripts|footer-scripts>

use clap::{Args, ValueEnum};
use snipstash_engine::commands::render;
use snipstash_engine::SnippetEnv;
use snipstash_store::tables::TableCheckCache;

use super::common::{self, DbArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RenderTarget {
    /// Markup for the document head
    Head,
    /// Markup for the end of the document body
    Footer,
    /// Public-side stylesheet
    Styles,
    /// Admin-side stylesheet
    AdminStyles,
    /// Scripts for the document head
    HeadScripts,
    /// Scripts for the document footer
    FooterScripts,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// What to render
    #[arg(value_enum)]
    pub target: RenderTarget,

    #[command(flatten)]
    pub db: DbArgs,
}

/// Execute render command
pub fn execute(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (conn, cache) = common::open(&args.db)?;
    let env = SnippetEnv::new(&conn, &cache, args.db.site, args.db.multisite);
    env.bootstrap(&TableCheckCache::new())?;

    let output = match args.target {
        RenderTarget::Head => render::render_head_content(&env)?,
        RenderTarget::Footer => render::render_footer_content(&env)?,
        RenderTarget::Styles => render::render_stylesheet(&env, false)?,
        RenderTarget::AdminStyles => render::render_stylesheet(&env, true)?,
        RenderTarget::HeadScripts => render::render_scripts(&env, true)?,
        RenderTarget::FooterScripts => render::render_scripts(&env, false)?,
    };

    println!("{}", output);
    Ok(())
}
