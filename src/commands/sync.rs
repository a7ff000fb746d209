//! The sync run: fetch, diff, confirm, reconcile, report

use anyhow::{Context, Result};
use buildkite::{Pipeline, PipelineService};
use colored::Colorize;
use log::{debug, info};
use stepdiff::{ConfirmCallback, PipelineState, ReconcileReport, aggregate_changes};

use crate::config::RunContext;
use crate::engine::{self, differ};
use crate::ui;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Show the changes and stop before prompting
    pub dry_run: bool,
}

/// How a run ended
#[derive(Debug)]
pub enum SyncOutcome {
    /// Every pipeline already matches the desired step
    NoChanges,
    /// Changes were shown but nothing was asked or updated
    DryRun { pipelines: usize },
    /// Every pipeline with changes was declined
    NothingConfirmed,
    /// Updates were dispatched
    Reconciled(ReconcileReport),
}

/// Run one sync against `service`.
///
/// Fetch errors are fatal. Update errors are reported per pipeline and do not
/// fail the run.
pub fn run<S, C>(
    ctx: &RunContext,
    service: &S,
    opts: SyncOptions,
    confirm: &mut C,
) -> Result<SyncOutcome>
where
    S: PipelineService + ?Sized,
    C: ConfirmCallback + ?Sized,
{
    let org = service
        .organization(&ctx.org)
        .with_context(|| format!("Error fetching organization {}", ctx.org))?;
    info!("organization: {} ({})", org.name, org.slug);

    let fetched = service
        .list_pipelines(&ctx.org)
        .context("Error fetching pipelines...")?;
    let pipelines = pipeline_states(ctx, fetched);
    debug!("{} pipeline(s) after exclusions", pipelines.len());

    let agg = aggregate_changes(&pipelines, ctx.step.clone());
    debug!(
        "canonical step: {}",
        serde_json::Value::Object(agg.step.clone())
    );

    if agg.is_empty() {
        println!("{}", "No changes!".green());
        return Ok(SyncOutcome::NoChanges);
    }

    differ::display_summary(&agg, pipelines.len());

    if opts.dry_run {
        differ::display_changes(&agg);
        println!();
        ui::info("Dry run - no changes made");
        return Ok(SyncOutcome::DryRun {
            pipelines: agg.changes.len(),
        });
    }

    let confirmed = engine::confirm_changes(agg.changes, confirm)?;
    if confirmed.is_empty() {
        println!();
        ui::dim("No pipelines selected, nothing to update");
        return Ok(SyncOutcome::NothingConfirmed);
    }

    let report = engine::execute(&confirmed, &pipelines, &agg.step, service, &ctx.org)?;
    Ok(SyncOutcome::Reconciled(report))
}

/// Drop excluded pipelines and keep each remaining pipeline's first step
fn pipeline_states(ctx: &RunContext, pipelines: Vec<Pipeline>) -> Vec<PipelineState> {
    pipelines
        .into_iter()
        .filter(|p| {
            let excluded = ctx.is_excluded(&p.slug);
            if excluded {
                debug!("skipping excluded pipeline {}", p.slug);
            }
            !excluded
        })
        .map(|p| {
            let step = p.first_step().cloned().unwrap_or_default();
            PipelineState::new(p.slug, step)
        })
        .collect()
}
