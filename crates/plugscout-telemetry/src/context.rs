//! Per-invocation context for correlating log lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one invocation of a command.
///
/// Every event logged inside [`RunContext::span`] carries the run id, so
/// interleaved output from the parallel dependency fetches can be told
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// Command being run (e.g. `list`, `deps`).
    pub command: String,
    /// Finer-grained operation, if any.
    pub operation: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
}

impl RunContext {
    /// Start a context for `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            command: command.into(),
            operation: None,
            started_at: Utc::now(),
        }
    }

    /// Set the operation.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Milliseconds since the run started (clamped at zero).
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
            .max(0)
    }

    /// Span carrying this run's fields.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            command = %self.command,
            operation = self.operation.as_deref().unwrap_or(""),
        )
    }

    /// Enter the span and log completion when the guard drops.
    #[must_use]
    pub fn enter(self) -> RunGuard {
        let span = self.span();
        tracing::debug!(parent: &span, "run started");
        RunGuard {
            context: self,
            span,
            failed: false,
        }
    }
}

/// Keeps a [`RunContext`] alive and logs its outcome on drop.
#[derive(Debug)]
pub struct RunGuard {
    context: RunContext,
    span: tracing::Span,
    failed: bool,
}

impl RunGuard {
    /// The context this guard tracks.
    #[must_use]
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// The run's span, for `Instrument`ing futures.
    #[must_use]
    pub fn span(&self) -> &tracing::Span {
        &self.span
    }

    /// Record that the run failed.
    pub fn fail(&mut self) {
        self.failed = true;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.context.elapsed_ms();
        if self.failed {
            tracing::warn!(parent: &self.span, elapsed_ms, "run failed");
        } else {
            tracing::debug!(parent: &self.span, elapsed_ms, "run finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_has_unique_id() {
        let a = RunContext::new("list");
        let b = RunContext::new("list");
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.command, "list");
        assert!(a.operation.is_none());
    }

    #[test]
    fn with_operation_sets_field() {
        let ctx = RunContext::new("deps").with_operation("providers");
        assert_eq!(ctx.operation.as_deref(), Some("providers"));
    }

    #[test]
    fn elapsed_is_non_negative() {
        let ctx = RunContext::new("kinds");
        assert!(ctx.elapsed_ms() >= 0);
    }

    #[test]
    fn guard_tracks_failure() {
        let mut guard = RunContext::new("deps").enter();
        assert_eq!(guard.context().command, "deps");
        guard.fail();
        assert!(guard.failed);
    }

    #[test]
    fn context_serializes() {
        let ctx = RunContext::new("list").with_operation("http");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["command"], "list");
        assert_eq!(json["operation"], "http");
        assert_eq!(json["run_id"], ctx.run_id.to_string());
    }
}
