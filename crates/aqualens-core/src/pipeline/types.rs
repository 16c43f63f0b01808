use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AqualensError, Result};
use crate::frame::Image;
use crate::stages::StageId;

/// Progress message identifiers. `key()` yields the stable identifier; the
/// Display form carries the human-readable frame text for video runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    Init,
    Stage(StageId),
    SavePrepare,
    SaveWrite,
    Finalize,
    Frame {
        index: usize,
        count: usize,
        stage: StageId,
    },
}

impl MessageKey {
    pub fn key(&self) -> &'static str {
        match self {
            MessageKey::Init => "init",
            MessageKey::Stage(id) => id.message_key(),
            MessageKey::SavePrepare => "save.prepare",
            MessageKey::SaveWrite => "save.write",
            MessageKey::Finalize => "finalize",
            MessageKey::Frame { .. } => "frame",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKey::Frame {
                index,
                count,
                stage,
            } => write!(f, "frame {index}/{count}: {}", stage.message_key()),
            other => f.write_str(other.key()),
        }
    }
}

/// Thread-safe progress reporting.
///
/// Implementors can drive progress bars, logging, or UI updates. The
/// callback must be cheap; it is invoked from the processing thread.
pub trait ProgressSink: Send + Sync {
    /// Report progress. `percent` is in [0, 100] and non-decreasing within
    /// a single run.
    fn report(&self, _key: MessageKey, _percent: u8) {}
}

/// No-op sink used when the caller does not care about progress.
pub struct NoOpSink;
impl ProgressSink for NoOpSink {}

/// Cooperative cancellation flag shared between the caller and a running
/// operation. Cloning shares the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The running operation stops at its next check.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Error out of the current operation if cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(AqualensError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Execution context threaded through engine calls: progress sink plus
/// cancellation token. Replaces any process-wide state.
#[derive(Clone)]
pub struct Context {
    pub progress: Arc<dyn ProgressSink>,
    pub cancel: CancelToken,
}

impl Context {
    pub fn new(progress: Arc<dyn ProgressSink>, cancel: CancelToken) -> Self {
        Self { progress, cancel }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self {
            progress: Arc::new(NoOpSink),
            cancel: CancelToken::new(),
        }
    }
}

/// Result of one pipeline run: the image plus any stages that failed and
/// were passed through unchanged.
#[derive(Clone, Debug)]
pub struct ProcessOutcome {
    pub image: Image,
    pub degraded: Vec<StageId>,
}
