//! Concurrent execution of independent fallible tasks.

use std::error::Error;
use std::fmt;

use futures::future::{BoxFuture, join_all};

/// One failed task.
#[derive(Debug)]
pub struct TaskFailure<E> {
    /// Task name.
    pub task: String,
    /// Failure.
    pub error: E,
}

/// Every failure of a [`TaskGroup`] run. Never empty.
#[derive(Debug)]
pub struct GroupError<E> {
    failures: Vec<TaskFailure<E>>,
}

impl<E> GroupError<E> {
    /// Failures in the order their tasks were added.
    #[must_use]
    pub fn failures(&self) -> &[TaskFailure<E>] {
        &self.failures
    }

    /// Consume into the failure list.
    #[must_use]
    pub fn into_failures(self) -> Vec<TaskFailure<E>> {
        self.failures
    }
}

impl<E: fmt::Display> fmt::Display for GroupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.failures.as_slice() {
            [single] => write!(f, "{}: {}", single.task, single.error),
            failures => {
                write!(f, "{} tasks failed", failures.len())?;
                for failure in failures {
                    write!(f, "\n  {}: {}", failure.task, failure.error)?;
                }
                Ok(())
            },
        }
    }
}

impl<E: Error + 'static> Error for GroupError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.failures.as_slice() {
            [single] => Some(&single.error),
            _ => None,
        }
    }
}

/// Named tasks that run together; a failure does not cancel the others.
pub struct TaskGroup<'a, E> {
    tasks: Vec<(String, BoxFuture<'a, Result<(), E>>)>,
}

impl<E> fmt::Debug for TaskGroup<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGroup")
            .field(
                "tasks",
                &self.tasks.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<E> Default for TaskGroup<'_, E> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<'a, E> TaskGroup<'a, E> {
    /// Empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task.
    pub fn add(&mut self, name: impl Into<String>, task: BoxFuture<'a, Result<(), E>>) {
        self.tasks.push((name.into(), task));
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task to completion.
    ///
    /// # Errors
    ///
    /// Returns a [`GroupError`] holding each failed task, in insertion order.
    pub async fn exec(self) -> Result<(), GroupError<E>> {
        let (names, futures): (Vec<String>, Vec<_>) = self.tasks.into_iter().unzip();
        let results = join_all(futures).await;

        let failures: Vec<TaskFailure<E>> = names
            .into_iter()
            .zip(results)
            .filter_map(|(task, result)| result.err().map(|error| TaskFailure { task, error }))
            .collect();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(GroupError { failures })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Boom(&'static str);

    #[tokio::test]
    async fn empty_group_succeeds() {
        let group: TaskGroup<'_, Boom> = TaskGroup::new();
        assert!(group.is_empty());
        group.exec().await.unwrap();
    }

    #[tokio::test]
    async fn collects_every_failure_in_order() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut group = TaskGroup::new();
        for (name, outcome) in [("a", Err(Boom("first"))), ("b", Ok(())), ("c", Err(Boom("second")))] {
            let ran = Arc::clone(&ran);
            group.add(
                name,
                async move {
                    ran.fetch_add(1, Ordering::SeqCst);
                    outcome
                }
                .boxed(),
            );
        }
        assert_eq!(group.len(), 3);

        let err = group.exec().await.unwrap_err();
        assert_eq!(ran.load(Ordering::SeqCst), 3);
        let tasks: Vec<&str> = err.failures().iter().map(|f| f.task.as_str()).collect();
        assert_eq!(tasks, vec!["a", "c"]);
        let rendered = err.to_string();
        assert!(rendered.contains("2 tasks failed"));
        assert!(rendered.contains("a: first"));
        assert!(rendered.contains("c: second"));
    }

    #[tokio::test]
    async fn single_failure_exposes_source() {
        let mut group = TaskGroup::new();
        group.add("only", async { Err(Boom("bad")) }.boxed());
        let err = group.exec().await.unwrap_err();
        assert_eq!(err.to_string(), "only: bad");
        assert!(err.source().is_some());
    }
}
