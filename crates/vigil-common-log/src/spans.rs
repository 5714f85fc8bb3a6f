//! Tracing spans used by the audit pipeline.

use std::future::Future;
use tracing::{debug_span, info_span, Instrument, Span};

/// Span covering the handling of one change event.
///
/// `record_id` and `error` start empty and are filled in once the outcome
/// is known.
pub fn change_span(content: &str, save_type: &str) -> Span {
    info_span!(
        "change",
        content = %content,
        save_type = %save_type,
        record_id = tracing::field::Empty,
        error = tracing::field::Empty,
    )
}

/// Span covering a lifecycle transition (`start` / `stop`).
pub fn lifecycle_span(operation: &str) -> Span {
    info_span!("audit_lifecycle", op = %operation)
}

/// Span covering one write to the audit store.
pub fn store_span(activity_type: &str) -> Span {
    debug_span!("audit_store", activity_type = %activity_type)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span's `error` field.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
    }
}

/// Macro for timing a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
