//! Concurrent batch execution with progress reporting.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use settingsync_core::{Action, ErrorKind, FileSystem};

use crate::executor::execute;
use crate::progress::{ActionOutcome, BatchProgress, BatchReport};
use crate::{OperationError, BATCH_CHANNEL_SIZE};

/// Event sent through the channel during batch execution.
#[derive(Debug)]
pub enum BatchEvent {
    /// An action finished.
    Progress(BatchProgress),
    /// Every action finished.
    Complete(BatchReport),
}

/// Start executing every action concurrently.
///
/// Each action runs as its own blocking task; a failure never cancels its
/// siblings. Progress is reported in completion order, and the final
/// [`BatchReport`] lists outcomes in submission order. Must be called from
/// within a tokio runtime.
pub fn start_batch<F>(fs: Arc<F>, actions: Vec<Action>) -> mpsc::Receiver<BatchEvent>
where
    F: FileSystem + 'static,
{
    let (tx, rx) = mpsc::channel(BATCH_CHANNEL_SIZE);

    tokio::spawn(async move {
        batch_impl(fs, actions, tx).await;
    });

    rx
}

/// Execute every action concurrently and wait for all of them.
pub async fn execute_batch<F>(fs: Arc<F>, actions: Vec<Action>) -> BatchReport
where
    F: FileSystem + 'static,
{
    execute_batch_with_progress(fs, actions, |_| {}).await
}

/// Like [`execute_batch`], calling `on_progress` each time an action finishes.
pub async fn execute_batch_with_progress<F, P>(
    fs: Arc<F>,
    actions: Vec<Action>,
    on_progress: P,
) -> BatchReport
where
    F: FileSystem + 'static,
    P: FnMut(&BatchProgress),
{
    let submitted = actions.clone();
    let rx = start_batch(fs, actions);
    collect_report(rx, submitted, on_progress).await
}

/// Drain `rx` until the final report arrives.
///
/// If the batch task goes away without one, every submitted action is
/// reported as failed since its outcome is unknown.
async fn collect_report(
    mut rx: mpsc::Receiver<BatchEvent>,
    submitted: Vec<Action>,
    mut on_progress: impl FnMut(&BatchProgress),
) -> BatchReport {
    let start = Instant::now();
    while let Some(event) = rx.recv().await {
        match event {
            BatchEvent::Progress(progress) => on_progress(&progress),
            BatchEvent::Complete(report) => return report,
        }
    }

    warn!(actions = submitted.len(), "batch ended without a report");
    let outcomes = submitted
        .into_iter()
        .map(|action| ActionOutcome {
            result: Err(OperationError::new(
                action.display_path(),
                ErrorKind::InvalidState,
                "Batch task ended without reporting an outcome",
            )),
            action,
        })
        .collect();

    BatchReport {
        outcomes,
        bytes_copied: 0,
        duration: start.elapsed(),
    }
}

async fn batch_impl<F>(fs: Arc<F>, actions: Vec<Action>, tx: mpsc::Sender<BatchEvent>)
where
    F: FileSystem + 'static,
{
    let start = Instant::now();
    let mut progress = BatchProgress::new(actions.len());
    let mut slots: Vec<Option<ActionOutcome>> = vec![None; actions.len()];
    let mut seen = HashSet::new();
    let mut tasks = JoinSet::new();

    for (index, action) in actions.iter().enumerate() {
        // One action per file, otherwise two tasks could race on it
        let touched: Vec<PathBuf> = action.targets().into_iter().chain(action.source()).collect();
        if touched.iter().any(|path| seen.contains(path)) {
            slots[index] = Some(ActionOutcome {
                action: action.clone(),
                result: Err(OperationError::new(
                    action.display_path(),
                    ErrorKind::InvalidState,
                    "Another action in this batch touches the same file",
                )),
            });
            continue;
        }
        seen.extend(touched);

        let fs = Arc::clone(&fs);
        let action = action.clone();
        tasks.spawn(async move {
            let task_action = action.clone();
            let result = match tokio::task::spawn_blocking(move || execute(fs.as_ref(), &task_action))
                .await
            {
                Ok(result) => result,
                Err(e) => Err(OperationError::new(
                    action.display_path(),
                    ErrorKind::InvalidState,
                    format!("Task failed: {e}"),
                )),
            };
            (index, ActionOutcome { action, result })
        });
    }

    for outcome in slots.iter().flatten() {
        progress.record(outcome);
        let _ = tx.send(BatchEvent::Progress(progress.clone())).await;
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                match &outcome.result {
                    Ok(_) => debug!(action = %outcome.action, "done"),
                    Err(e) => warn!(action = %outcome.action, "{e}"),
                }
                progress.record(&outcome);
                slots[index] = Some(outcome);
                let _ = tx.send(BatchEvent::Progress(progress.clone())).await;
            }
            Err(e) => warn!("batch task failed: {e}"),
        }
    }

    // A wrapper task that died leaves its slot empty; report it as failed.
    let outcomes: Vec<ActionOutcome> = slots
        .into_iter()
        .zip(actions)
        .map(|(slot, action)| {
            slot.unwrap_or_else(|| ActionOutcome {
                result: Err(OperationError::new(
                    action.display_path(),
                    ErrorKind::InvalidState,
                    "Task did not complete",
                )),
                action,
            })
        })
        .collect();

    let report = BatchReport {
        bytes_copied: outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .sum(),
        outcomes,
        duration: start.elapsed(),
    };
    let _ = tx.send(BatchEvent::Complete(report)).await;
}
