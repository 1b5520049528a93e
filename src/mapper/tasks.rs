//! Structured fan-out helper
//!
//! Every fan-out level (processors per namespace, items per processor,
//! relationship rules per item) spawns into a `TaskGroup` and joins it. Joining
//! returns early with `Cancelled` once the token fires and aborts whatever is
//! still running.

use std::future::Future;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::ProcessError;

pub type TaskResult<T> = Result<T, ProcessError>;

/// A set of spawned tasks bound to one cancellation token
pub struct TaskGroup<T> {
    set: JoinSet<TaskResult<T>>,
    token: CancellationToken,
}

impl<T: Send + 'static> TaskGroup<T> {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            set: JoinSet::new(),
            token,
        }
    }

    pub fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = TaskResult<T>> + Send + 'static,
    {
        self.set.spawn(task);
    }

    /// Wait for every task, collecting results in completion order
    pub async fn join(mut self) -> TaskResult<Vec<TaskResult<T>>> {
        let mut results = Vec::with_capacity(self.set.len());
        loop {
            tokio::select! {
                _ = self.token.cancelled() => {
                    self.set.abort_all();
                    return Err(ProcessError::Cancelled);
                }
                next = self.set.join_next() => match next {
                    Some(Ok(result)) => results.push(result),
                    Some(Err(err)) => results.push(Err(err.into())),
                    None => break,
                },
            }
        }
        Ok(results)
    }
}

/// Keep successful results, drop failed ones with a debug log
///
/// Cancellation is never swallowed.
pub fn settle<T>(results: Vec<TaskResult<T>>, scope: &str) -> TaskResult<Vec<T>> {
    let mut values = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(value) => values.push(value),
            Err(ProcessError::Cancelled) => return Err(ProcessError::Cancelled),
            Err(err) => tracing::debug!(scope, error = %err, "Skipping failed subtask"),
        }
    }
    Ok(values)
}
