//! Reconciliation engine - pushes the canonical step to confirmed pipelines

use crate::context::{ProgressCallback, StepUpdater};
use crate::types::{ChangeSet, PipelineState, ReconcileReport, StepSpec, UpdateOutcome};
use anyhow::Result;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Replace the steps of every pipeline in `changes` with `[step]`.
///
/// Updates run concurrently, one worker per pipeline. A failed update is
/// recorded and never stops the others. Returns once every update has
/// finished.
///
/// # Arguments
/// * `changes` - Confirmed changes; only the slugs are used
/// * `pipelines` - Fetched pipelines, used to resolve slugs
/// * `step` - Canonical step to push
/// * `updater` - Remote update implementation
/// * `progress` - Receives each outcome as it completes
pub fn reconcile<U, P>(
    changes: &ChangeSet,
    pipelines: &[PipelineState],
    step: &StepSpec,
    updater: &U,
    progress: &P,
) -> Result<ReconcileReport>
where
    U: StepUpdater + ?Sized,
    P: ProgressCallback + ?Sized,
{
    let mut report = ReconcileReport::default();
    if changes.is_empty() {
        return Ok(report);
    }

    let by_slug: HashMap<&str, &PipelineState> =
        pipelines.iter().map(|p| (p.slug.as_str(), p)).collect();
    let targets: Vec<&str> = changes.keys().map(String::as_str).collect();
    let steps = std::slice::from_ref(step);

    progress.on_start(targets.len());

    let results: Arc<Mutex<Vec<(String, UpdateOutcome)>>> = Arc::new(Mutex::new(Vec::new()));

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(targets.len())
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create update thread pool: {}", e))?;

    pool.install(|| {
        targets.par_iter().for_each(|slug| {
            let outcome = match by_slug.get(slug) {
                Some(pipeline) => update_pipeline(pipeline, steps, updater),
                None => UpdateOutcome::Failed {
                    error: format!("unknown pipeline: {slug}"),
                },
            };

            progress.on_update_complete(slug, &outcome);
            push_outcome(&results, (*slug).to_string(), outcome);
        });
    });

    for (slug, outcome) in into_outcomes(results)? {
        report.add_outcome(&slug, outcome);
    }

    Ok(report)
}

fn update_pipeline<U: StepUpdater + ?Sized>(
    pipeline: &PipelineState,
    steps: &[StepSpec],
    updater: &U,
) -> UpdateOutcome {
    debug!("updating {}", pipeline.slug);
    match updater.update_steps(&pipeline.slug, steps) {
        Ok(()) => UpdateOutcome::Updated,
        Err(e) => {
            warn!("update of {} failed: {:#}", pipeline.slug, e);
            UpdateOutcome::Failed {
                error: format!("{e:#}"),
            }
        }
    }
}

fn push_outcome(
    results: &Arc<Mutex<Vec<(String, UpdateOutcome)>>>,
    slug: String,
    outcome: UpdateOutcome,
) {
    match results.lock() {
        Ok(mut locked) => locked.push((slug, outcome)),
        Err(poisoned) => poisoned.into_inner().push((slug, outcome)),
    }
}

fn into_outcomes(
    results: Arc<Mutex<Vec<(String, UpdateOutcome)>>>,
) -> Result<Vec<(String, UpdateOutcome)>> {
    let mutex = Arc::try_unwrap(results)
        .map_err(|_| anyhow::anyhow!("Failed to collect update results: shared result state"))?;

    match mutex.into_inner() {
        Ok(collected) => Ok(collected),
        Err(poisoned) => Ok(poisoned.into_inner()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NoProgress;
    use crate::types::ChangeEntry;
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records every call; fails for the configured slugs
    #[derive(Default)]
    struct MockUpdater {
        fail: HashSet<String>,
        calls: Mutex<Vec<(String, Vec<StepSpec>)>>,
    }

    impl MockUpdater {
        fn failing(slugs: &[&str]) -> Self {
            Self {
                fail: slugs.iter().map(|s| (*s).to_string()).collect(),
                ..Default::default()
            }
        }

        fn called_slugs(&self) -> HashSet<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(s, _)| s.clone())
                .collect()
        }
    }

    impl StepUpdater for MockUpdater {
        fn update_steps(&self, slug: &str, steps: &[StepSpec]) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push((slug.to_string(), steps.to_vec()));
            if self.fail.contains(slug) {
                anyhow::bail!("HTTP 422");
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    impl ProgressCallback for CountingProgress {
        fn on_start(&self, count: usize) {
            self.started.store(count, Ordering::SeqCst);
        }

        fn on_update_complete(&self, _slug: &str, _outcome: &UpdateOutcome) {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn step(value: Value) -> StepSpec {
        match value {
            Value::Object(map) => map,
            _ => panic!("step must be an object"),
        }
    }

    fn fixture(slugs: &[&str]) -> (ChangeSet, Vec<PipelineState>) {
        let changes = slugs
            .iter()
            .map(|s| {
                (
                    (*s).to_string(),
                    vec![ChangeEntry {
                        key: "command".into(),
                        old: Some(json!("old.sh")),
                        new: json!("run.sh"),
                    }],
                )
            })
            .collect();
        let pipelines = slugs
            .iter()
            .map(|s| PipelineState::new(*s, step(json!({"type": "script", "command": "old.sh"}))))
            .collect();
        (changes, pipelines)
    }

    #[test]
    fn test_reconcile_updates_all_with_canonical_step() {
        let (changes, pipelines) = fixture(&["a", "b"]);
        let canonical = step(json!({"type": "script", "command": "run.sh"}));
        let updater = MockUpdater::default();

        let report = reconcile(&changes, &pipelines, &canonical, &updater, &NoProgress).unwrap();

        assert!(report.is_success());
        assert_eq!(report.total(), 2);
        let calls = updater.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        for (_, steps) in calls.iter() {
            assert_eq!(steps, &vec![canonical.clone()]);
        }
    }

    #[test]
    fn test_reconcile_failure_does_not_block_others() {
        let (changes, pipelines) = fixture(&["a", "b", "c", "d"]);
        let canonical = step(json!({"type": "script"}));
        let updater = MockUpdater::failing(&["b"]);

        let report = reconcile(&changes, &pipelines, &canonical, &updater, &NoProgress).unwrap();

        assert_eq!(updater.called_slugs().len(), 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].pipeline_name, "b");
        assert_eq!(report.failures[0].error, "HTTP 422");
        let succeeded: HashSet<_> = report.succeeded.iter().cloned().collect();
        assert_eq!(
            succeeded,
            ["a", "c", "d"]
                .iter()
                .map(|s| (*s).to_string())
                .collect::<HashSet<_>>()
        );
    }

    #[test]
    fn test_reconcile_failure_count_matches() {
        let (changes, pipelines) = fixture(&["a", "b", "c"]);
        let updater = MockUpdater::failing(&["a", "c"]);

        let report =
            reconcile(&changes, &pipelines, &StepSpec::new(), &updater, &NoProgress).unwrap();

        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.succeeded, vec!["b".to_string()]);
    }

    #[test]
    fn test_reconcile_only_dispatches_change_set() {
        let (changes, _) = fixture(&["a"]);
        let (_, pipelines) = fixture(&["a", "b"]);
        let updater = MockUpdater::default();

        reconcile(&changes, &pipelines, &StepSpec::new(), &updater, &NoProgress).unwrap();

        assert_eq!(updater.called_slugs(), HashSet::from(["a".to_string()]));
    }

    #[test]
    fn test_reconcile_unknown_slug_is_a_failure() {
        let (changes, _) = fixture(&["ghost"]);
        let updater = MockUpdater::default();

        let report = reconcile(&changes, &[], &StepSpec::new(), &updater, &NoProgress).unwrap();

        assert!(updater.called_slugs().is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].error.contains("ghost"));
    }

    #[test]
    fn test_reconcile_empty_change_set() {
        let updater = MockUpdater::default();
        let progress = CountingProgress::default();

        let report =
            reconcile(&ChangeSet::new(), &[], &StepSpec::new(), &updater, &progress).unwrap();

        assert_eq!(report.total(), 0);
        assert_eq!(progress.started.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reconcile_reports_progress() {
        let (changes, pipelines) = fixture(&["a", "b", "c"]);
        let updater = MockUpdater::failing(&["c"]);
        let progress = CountingProgress::default();

        reconcile(&changes, &pipelines, &StepSpec::new(), &updater, &progress).unwrap();

        assert_eq!(progress.started.load(Ordering::SeqCst), 3);
        assert_eq!(progress.completed.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn push_outcome_handles_poisoned_mutex() {
        let results: Arc<Mutex<Vec<(String, UpdateOutcome)>>> = Arc::new(Mutex::new(Vec::new()));
        let poisoned = Arc::clone(&results);

        let _ = std::thread::spawn(move || {
            let _guard = poisoned
                .lock()
                .expect("lock should succeed before poisoning");
            panic!("intentional poison");
        })
        .join();

        push_outcome(&results, "a".into(), UpdateOutcome::Updated);

        let collected = into_outcomes(results).expect("poisoned mutex should be recovered");
        assert_eq!(collected.len(), 1);
    }
}
