use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{PipelineError, Stage};

/// Why a run stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// The caller flipped the [`CancelToken`]
    Requested,
    /// The run deadline or a service timeout expired
    TimedOut { after: Duration },
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Requested => write!(f, "cancelled by caller"),
            CancelReason::TimedOut { after } => write!(f, "timed out after {after:?}"),
        }
    }
}

/// Shared flag a caller can set from another thread to stop a run between
/// probes.
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

/// Checked before every probe a stage touches.
#[derive(Debug, Clone)]
pub(crate) struct RunGuard {
    pub transcript_id: String,
    token: CancelToken,
    deadline: Option<(Instant, Duration)>,
}

impl RunGuard {
    pub fn new(
        transcript_id: impl Into<String>,
        token: CancelToken,
        limit: Option<Duration>,
    ) -> Self {
        Self {
            transcript_id: transcript_id.into(),
            token,
            deadline: limit.map(|d| (Instant::now() + d, d)),
        }
    }

    pub fn check(&self, stage: Stage) -> Result<(), PipelineError> {
        if self.token.is_cancelled() {
            return Err(self.cancelled(stage, CancelReason::Requested));
        }
        if let Some((deadline, after)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(self.cancelled(stage, CancelReason::TimedOut { after }));
            }
        }
        Ok(())
    }

    pub fn cancelled(&self, stage: Stage, reason: CancelReason) -> PipelineError {
        PipelineError::Cancelled {
            transcript_id: self.transcript_id.clone(),
            stage,
            reason,
        }
    }
}
