// SPDX-FileCopyrightText: 2026 Sirbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named background task supervision.
//!
//! Every long-running engine task (one per client plus the dispatch loop)
//! is spawned through a [`TaskTable`]. Each task is wrapped so that its
//! outcome is observed and logged exactly once, whether it completes,
//! fails, panics, or is cancelled. Tasks stay in the table until
//! [`TaskTable::cancel_all`] cancels and awaits them.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use dashmap::DashMap;
use futures::FutureExt;
use sirbot_core::{SirbotError, TaskStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Name of the dispatch loop task.
pub const INCOMING_TASK: &str = "incoming";

/// Named background tasks sharing one cancellation token.
pub struct TaskTable {
    handles: Mutex<HashMap<String, JoinHandle<TaskStatus>>>,
    statuses: Arc<DashMap<String, TaskStatus>>,
    cancel: CancellationToken,
}

impl TaskTable {
    /// Create a table whose tasks stop when `cancel` is cancelled.
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
            statuses: Arc::new(DashMap::new()),
            cancel,
        }
    }

    /// Spawn `task` under `name`.
    ///
    /// `on_exit` runs inside the task right after its terminal status is
    /// known. Names are unique; spawning an existing name fails.
    pub async fn spawn<F, E>(&self, name: &str, task: F, on_exit: E) -> Result<(), SirbotError>
    where
        F: Future<Output = Result<(), SirbotError>> + Send + 'static,
        E: FnOnce(&TaskStatus) + Send + 'static,
    {
        let mut handles = self.handles.lock().await;
        if handles.contains_key(name) {
            return Err(SirbotError::Internal(format!(
                "task `{name}` is already running"
            )));
        }
        if self.cancel.is_cancelled() {
            return Err(SirbotError::Internal(format!(
                "cannot spawn task `{name}` after shutdown"
            )));
        }

        self.statuses.insert(name.to_string(), TaskStatus::Running);
        let handle = tokio::spawn(supervise(
            name.to_string(),
            task,
            self.cancel.clone(),
            Arc::clone(&self.statuses),
            on_exit,
        ));
        handles.insert(name.to_string(), handle);
        debug!(task = %name, "task spawned");
        Ok(())
    }

    /// Cancel every task and wait for all of them to finish.
    ///
    /// Returns the terminal status of each task that was in the table.
    pub async fn cancel_all(&self) -> Vec<(String, TaskStatus)> {
        self.cancel.cancel();
        let handles: Vec<_> = self.handles.lock().await.drain().collect();

        let mut finished = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let status = match handle.await {
                Ok(status) => status,
                Err(join_error) => {
                    // Only reachable if the runtime itself is shutting down.
                    let status = if join_error.is_panic() {
                        TaskStatus::Panicked(join_error.to_string())
                    } else {
                        TaskStatus::Cancelled
                    };
                    self.statuses.insert(name.clone(), status.clone());
                    status
                }
            };
            finished.push((name, status));
        }
        finished
    }

    /// Status of the task called `name`, if it was ever spawned.
    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.statuses.get(name).map(|entry| entry.value().clone())
    }

    /// Snapshot of every task status, sorted by name.
    pub fn statuses(&self) -> BTreeMap<String, TaskStatus> {
        self.statuses
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of tasks not yet awaited by [`TaskTable::cancel_all`].
    pub async fn len(&self) -> usize {
        self.handles.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl std::fmt::Debug for TaskTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskTable")
            .field("statuses", &self.statuses())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Run `task` until it finishes or `cancel` fires, then record and log
/// the outcome.
async fn supervise<F, E>(
    name: String,
    task: F,
    cancel: CancellationToken,
    statuses: Arc<DashMap<String, TaskStatus>>,
    on_exit: E,
) -> TaskStatus
where
    F: Future<Output = Result<(), SirbotError>> + Send + 'static,
    E: FnOnce(&TaskStatus) + Send + 'static,
{
    let status = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(task = %name, "task cancelled");
            TaskStatus::Cancelled
        }
        outcome = AssertUnwindSafe(task).catch_unwind() => match outcome {
            Ok(Ok(())) => {
                warn!(task = %name, "task exited before cancellation");
                TaskStatus::Completed
            }
            Ok(Err(e)) => {
                error!(task = %name, error = %e, "task exited with error");
                TaskStatus::Failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!(task = %name, panic = %message, "task panicked");
                TaskStatus::Panicked(message)
            }
        },
    };

    statuses.insert(name, status.clone());
    on_exit(&status);
    status
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tracing_test::traced_test;

    use super::*;

    async fn wait_terminal(table: &TaskTable, name: &str) -> TaskStatus {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(status) = table.status(name)
                    && status.is_terminal()
                {
                    return status;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("task should reach a terminal status")
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_task_is_logged_exactly_once() {
        let table = TaskTable::new(CancellationToken::new());
        table
            .spawn(
                "slack",
                async { Err(SirbotError::client("slack", "socket closed")) },
                |_| {},
            )
            .await
            .unwrap();

        let status = wait_terminal(&table, "slack").await;
        assert_eq!(
            status,
            TaskStatus::Failed("client `slack` error: socket closed".into())
        );

        // Awaiting the task again at shutdown does not log a second time.
        let finished = table.cancel_all().await;
        assert_eq!(finished, vec![("slack".to_string(), status)]);
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("task exited with error"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("expected one failure log, found {n}")),
            }
        });
    }

    async fn explode() -> Result<(), SirbotError> {
        panic!("kaboom")
    }

    #[tokio::test]
    #[traced_test]
    async fn panicking_task_is_contained() {
        let table = TaskTable::new(CancellationToken::new());
        table.spawn("flaky", explode(), |_| {}).await.unwrap();

        let status = wait_terminal(&table, "flaky").await;
        assert_eq!(status, TaskStatus::Panicked("kaboom".into()));
        assert!(logs_contain("task panicked"));
    }

    #[tokio::test]
    #[traced_test]
    async fn early_return_is_reported_as_completed() {
        let table = TaskTable::new(CancellationToken::new());
        table.spawn("quick", async { Ok(()) }, |_| {}).await.unwrap();

        assert_eq!(wait_terminal(&table, "quick").await, TaskStatus::Completed);
        assert!(logs_contain("task exited before cancellation"));
    }

    #[tokio::test]
    async fn cancel_all_stops_pending_tasks_and_runs_exit_hooks() {
        let table = TaskTable::new(CancellationToken::new());
        let exits = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b", INCOMING_TASK] {
            let exits = Arc::clone(&exits);
            table
                .spawn(name, futures::future::pending(), move |status| {
                    assert_eq!(*status, TaskStatus::Cancelled);
                    exits.fetch_add(1, Ordering::SeqCst);
                })
                .await
                .unwrap();
        }
        assert_eq!(table.len().await, 3);

        let finished = table.cancel_all().await;
        assert_eq!(finished.len(), 3);
        assert!(finished.iter().all(|(_, s)| *s == TaskStatus::Cancelled));
        assert_eq!(exits.load(Ordering::SeqCst), 3);
        assert!(table.is_empty().await);
        assert!(table.statuses().values().all(TaskStatus::is_terminal));
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let table = TaskTable::new(CancellationToken::new());
        table
            .spawn("slack", futures::future::pending(), |_| {})
            .await
            .unwrap();
        let err = table
            .spawn("slack", futures::future::pending(), |_| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already running"));
        table.cancel_all().await;
    }

    #[tokio::test]
    async fn spawning_after_shutdown_fails() {
        let table = TaskTable::new(CancellationToken::new());
        table.cancel_all().await;
        assert!(table.is_cancelled());
        assert!(table.spawn("late", async { Ok(()) }, |_| {}).await.is_err());
        assert_eq!(table.status("late"), None);
    }
}
