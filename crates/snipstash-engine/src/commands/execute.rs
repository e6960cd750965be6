//! Active-snippet execution
//!
//! The once-per-request path: gather active snippets whose scope matches
//! the request, consume single-use snippets before their code runs, and
//! hand each candidate to the [`CodeRunner`]. One snippet's failure
//! never stops the sweep.

use snipstash_core::context::RequestContext;
use snipstash_core::errors::Result;
use snipstash_core::hooks::ExecutionHooks;
use snipstash_core::model::Scope;
use snipstash_core::runner::{CodeRunner, ExecutionFailure, RunOutcome, RunRequest};
use snipstash_store::cache;
use snipstash_store::options::{self, OptionScope, ACTIVE_SHARED_NETWORK_SNIPPETS};
use snipstash_store::snippets::ActiveRow;

use crate::env::SnippetEnv;

/// Per-sweep accounting returned to the caller.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    /// IDs whose code ran to completion
    pub executed: Vec<i64>,
    /// IDs skipped by a veto, the safe-mode switch, a lost single-use
    /// race, or the editing guard
    pub skipped: Vec<i64>,
    /// IDs whose code raised, with the failure
    pub failed: Vec<(i64, ExecutionFailure)>,
}

/// The scope set a request pulls in when no hook overrides it.
///
/// Global and single-use snippets run everywhere; the third member
/// depends on which side of the site the request landed on.
pub fn default_scopes(is_admin: bool) -> Vec<Scope> {
    let side = if is_admin { Scope::Admin } else { Scope::FrontEnd };
    vec![Scope::Global, Scope::SingleUse, side]
}

/// Candidate row paired with its source table identity.
pub(crate) struct Candidate {
    pub(crate) row: ActiveRow,
    pub(crate) network: bool,
}

/// Gather execution candidates from the site table and, under
/// multisite, the shared table.
///
/// Shared-table rows carry no usable active flag; the per-site
/// shared-activation record decides which of them this site runs.
pub(crate) fn fetch_candidates(env: &SnippetEnv<'_>, scopes: &[Scope]) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();

    let site_rows =
        cache::get_active_snippets(env.conn, env.cache, &env.tables.site, scopes, true)?;
    candidates.extend(site_rows.into_iter().map(|row| Candidate {
        row,
        network: false,
    }));

    if env.multisite {
        let active_shared: Vec<i64> = options::get_option(
            env.conn,
            OptionScope::Site(env.site),
            ACTIVE_SHARED_NETWORK_SNIPPETS,
        )?
        .unwrap_or_default();

        let shared_rows =
            cache::get_active_snippets(env.conn, env.cache, &env.tables.shared, scopes, false)?;
        candidates.extend(
            shared_rows
                .into_iter()
                .filter(|row| row.active || active_shared.contains(&row.id))
                .map(|row| Candidate { row, network: true }),
        );
    }

    Ok(candidates)
}

/// Consume a single-use snippet before its code runs.
///
/// Returns whether this sweep won the consumption; the loser of a
/// concurrent race observes `false` and must skip the snippet. The
/// deactivation is visible even if the code then fails.
fn consume_single_use(env: &SnippetEnv<'_>, candidate: &Candidate) -> Result<bool> {
    let consumed = if candidate.network && !candidate.row.active {
        // Shared snippet activated per-site: consumption means removal
        // from this site's shared-activation record
        options::remove_from_id_set(
            env.conn,
            OptionScope::Site(env.site),
            ACTIVE_SHARED_NETWORK_SNIPPETS,
            &[candidate.row.id],
        )?
    } else {
        snipstash_store::snippets::deactivate_if_active(
            env.conn,
            env.tables.name(candidate.network),
            candidate.row.id,
        )?
    };

    if consumed {
        cache::clean_snippets_cache(env.cache, env.tables.name(candidate.network));
    }
    Ok(consumed)
}

/// Execute every active snippet matching the request's scope set.
///
/// Honors the safe-mode switch, the editing guard, per-snippet hook
/// vetoes, and single-use consumption. Failures are reported, never
/// propagated; the sweep always visits every candidate.
pub fn execute_active_snippets(
    env: &SnippetEnv<'_>,
    ctx: &dyn RequestContext,
    hooks: &dyn ExecutionHooks,
    runner: &dyn CodeRunner,
) -> Result<ExecutionReport> {
    let mut report = ExecutionReport::default();

    if ctx.safe_mode() {
        tracing::info!("safe mode enabled, skipping snippet execution");
        return Ok(report);
    }

    let scopes = hooks
        .default_scopes(ctx.is_admin())
        .unwrap_or_else(|| default_scopes(ctx.is_admin()));

    let editing = ctx.editing();

    for candidate in fetch_candidates(env, &scopes)? {
        let id = candidate.row.id;
        let network = candidate.network;

        if candidate.row.scope == Scope::SingleUse && !consume_single_use(env, &candidate)? {
            report.skipped.push(id);
            continue;
        }

        if !hooks.allow_execute(id, network) {
            report.skipped.push(id);
            continue;
        }

        // Never run the snippet currently open in the editor
        if editing
            .as_ref()
            .is_some_and(|e| e.id == id && e.network == network)
        {
            report.skipped.push(id);
            continue;
        }

        let request = RunRequest {
            id,
            code: &candidate.row.code,
            scope: candidate.row.scope,
        };
        let result = runner.run(&request);

        match &result {
            Ok(RunOutcome::Executed) => report.executed.push(id),
            Ok(RunOutcome::Skipped) => report.skipped.push(id),
            Err(failure) => {
                tracing::error!(id, network, %failure, "snippet execution failed");
                report.failed.push((id, failure.clone()));
            }
        }

        hooks.after_execute(id, network, &result);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scopes() {
        assert_eq!(
            default_scopes(false),
            vec![Scope::Global, Scope::SingleUse, Scope::FrontEnd]
        );
        assert_eq!(
            default_scopes(true),
            vec![Scope::Global, Scope::SingleUse, Scope::Admin]
        );
    }
}
