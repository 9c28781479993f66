//! filter::context
//!
//! Per-run execution context: cooperative cancellation and progress
//! reporting.
//!
//! A [`CancelToken`] is shared between the caller and the running
//! filters. Long-running filters poll [`ExecutionContext::is_cancelled`]
//! at safe points; the pipeline runner checks it between steps.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress callback: `(filter name, message)`.
pub type ProgressFn = Arc<dyn Fn(&str, &str) + Send + Sync>;

/// Context handed to every filter execution.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    cancel: CancelToken,
    progress: Option<ProgressFn>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(&str, &str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Report progress; a no-op without a callback.
    pub fn progress(&self, filter: &str, message: &str) {
        if let Some(progress) = &self.progress {
            progress(filter, message);
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("cancelled", &self.is_cancelled())
            .field("progress", &self.progress.is_some())
            .finish()
    }
}
