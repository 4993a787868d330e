use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Run a blocking capability call with a bounded wait.
///
/// The call runs on a dedicated thread. If it does not report back within `limit`, the caller
/// gets [`SlidecastError::Timeout`] and the late result is discarded when it eventually arrives.
/// A `None` limit runs `f` inline.
pub fn run_with_deadline<T, F>(
    operation: &'static str,
    limit: Option<Duration>,
    f: F,
) -> SlidecastResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> SlidecastResult<T> + Send + 'static,
{
    let Some(limit) = limit else {
        return f();
    };

    let (tx, rx) = mpsc::sync_channel(1);
    std::thread::Builder::new()
        .name(format!("slidecast-{operation}"))
        .spawn(move || {
            // The receiver may be gone after a timeout.
            let _ = tx.send(f());
        })
        .map_err(|e| {
            SlidecastError::Other(anyhow::anyhow!("failed to spawn {operation} worker: {e}"))
        })?;

    match rx.recv_timeout(limit) {
        Ok(out) => out,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            tracing::warn!(operation, ?limit, "capability call timed out");
            Err(SlidecastError::timeout(operation, limit))
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(SlidecastError::Other(anyhow::anyhow!(
            "{operation} worker terminated without a result"
        ))),
    }
}

/// Cooperative cancellation flag shared between a pipeline run and its owner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Return [`SlidecastError::Cancelled`] once cancellation was requested.
    pub fn check(&self) -> SlidecastResult<()> {
        if self.is_cancelled() {
            return Err(SlidecastError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/deadline.rs"]
mod tests;
