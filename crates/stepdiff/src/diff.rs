//! Change detection between a desired step and the steps pipelines have

use log::debug;
use serde_json::Value;

use crate::types::{Aggregation, ChangeEntry, ChangeSet, PipelineState, StepSpec};
use crate::value::{deep_equal, is_falsy};

/// Compare the desired step against a pipeline's current step.
///
/// Only keys present in `desired` are compared, in `desired`'s order. A key
/// missing from `actual` compares as null.
pub fn diff_step(desired: &StepSpec, actual: &StepSpec) -> Vec<ChangeEntry> {
    desired
        .iter()
        .filter_map(|(key, want)| {
            let have = actual.get(key).unwrap_or(&Value::Null);
            if deep_equal(have, want) {
                return None;
            }
            Some(ChangeEntry {
                key: key.clone(),
                old: (!is_falsy(have)).then(|| have.clone()),
                new: want.clone(),
            })
        })
        .collect()
}

/// Back-fill fields missing from `desired` with the values in `template`.
///
/// Keys already present in `desired` are never touched, even when null, so
/// applying the same template twice is a no-op. Returns the number of fields
/// copied.
pub fn merge_missing(desired: &mut StepSpec, template: &StepSpec) -> usize {
    let mut merged = 0;
    for (key, value) in template {
        if !desired.contains_key(key) {
            desired.insert(key.clone(), value.clone());
            merged += 1;
        }
    }
    merged
}

/// Compute the canonical step and per-pipeline changes.
///
/// The first pipeline's current step fills in every field the desired step
/// leaves unset; the result is the step pushed to every pipeline. Pipelines
/// whose current step already matches on all canonical fields are omitted.
pub fn aggregate_changes(pipelines: &[PipelineState], desired: StepSpec) -> Aggregation {
    let mut step = desired;
    let mut changes = ChangeSet::new();

    for (index, pipeline) in pipelines.iter().enumerate() {
        if index == 0 {
            let merged = merge_missing(&mut step, &pipeline.step);
            debug!(
                "merged {} field(s) from {} into the desired step",
                merged, pipeline.slug
            );
        }

        let entries = diff_step(&step, &pipeline.step);
        if entries.is_empty() {
            debug!("{} is up to date", pipeline.slug);
            continue;
        }
        debug!("{} has {} change(s)", pipeline.slug, entries.len());
        changes.insert(pipeline.slug.clone(), entries);
    }

    Aggregation { step, changes }
}
