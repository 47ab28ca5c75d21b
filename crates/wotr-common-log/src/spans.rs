//! Span and timing helpers.

use tracing::{info_span, Span};

/// Create a span covering the processing of one atlas.
pub fn atlas_span(path: &str) -> Span {
    info_span!("atlas", path = %path)
}

/// Create a span for one card within an atlas.
pub fn card_span(index: usize, col: u32, row: u32) -> Span {
    info_span!("card", index, col, row)
}

/// Create a span for one region of a card. `error` is filled by [`record_error`].
pub fn region_span(index: usize, name: &str) -> Span {
    info_span!("region", index, name = %name, error = tracing::field::Empty)
}

/// Record an error on the current span.
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

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    /// Complete the timer and record duration.
    pub fn finish(self) {
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %self.elapsed_ms(),
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

pub use tracing::instrument;
