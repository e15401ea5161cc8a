//! Port for structured execution logging.
//!
//! Records engine events (task started, plan extended, step completed,
//! termination) to a machine-readable log. This is separate from `tracing`:
//! tracing carries human-readable diagnostics, this port carries an audit
//! trail of what each task execution did.

use serde_json::Value;

/// A structured execution event.
pub struct ExecutionEvent {
    /// Event type identifier (e.g. "task_started", "step_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ExecutionEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging execution events.
///
/// `log` is synchronous and infallible so that a broken log never changes
/// the outcome of a task.
pub trait ExecutionLogger: Send + Sync {
    fn log(&self, event: ExecutionEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoExecutionLogger;

impl ExecutionLogger for NoExecutionLogger {
    fn log(&self, _event: ExecutionEvent) {}
}
