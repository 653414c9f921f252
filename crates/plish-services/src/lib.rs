//! Adapters for the external engines probe scoring depends on: a folding
//! engine that reports free energies for the two arms, and a similarity
//! search that reports where a probe also hybridizes.
//!
//! Scoring code talks to the [`ThermodynamicService`] and
//! [`SpecificityService`] traits only; the process-backed implementations
//! live in [`oligoscreen`] and [`blastn`].

pub mod blastn;
pub mod oligoscreen;
pub mod process;
pub mod specificity;
pub mod thermo;

pub use blastn::BlastnService;
pub use oligoscreen::OligoscreenService;
pub use process::ToolConfig;
pub use specificity::*;
pub use thermo::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not find executable '{executable}'")]
    ToolNotFound { executable: String },
    #[error("'{executable}' failed (status={status:?}): {stderr}")]
    ToolFailed {
        executable: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("'{executable}' timed out after {after:?}")]
    TimedOut { executable: String, after: Duration },
    #[error("Malformed output line '{line}': {reason}")]
    MalformedOutput { line: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub(crate) fn malformed(line: &str, reason: impl Into<String>) -> Self {
        ServiceError::MalformedOutput {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
