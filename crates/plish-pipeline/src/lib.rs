//! Probe design for one transcript: candidate generation followed by four
//! scoring stages, each run over the whole candidate list before the next
//! starts.
//!
//! 1. splice junction classification
//! 2. melting temperature
//! 3. folding free energies (external engine)
//! 4. specificity (external similarity search)
//!
//! Any stage failure aborts the run; no partially scored probes escape.

pub mod cancel;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod stages;

pub use cancel::{CancelReason, CancelToken};
pub use config::PipelineConfig;
pub use pipeline::ProbePipeline;
pub use report::DesignRun;

use plish_core::CoreError;
use plish_db::DbError;
use plish_services::ServiceError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    SpliceJunctions,
    MeltingTemperature,
    Thermodynamics,
    Specificity,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::SpliceJunctions,
        Stage::MeltingTemperature,
        Stage::Thermodynamics,
        Stage::Specificity,
    ];

    /// 1-based position in the run
    pub fn step(&self) -> usize {
        match self {
            Stage::SpliceJunctions => 1,
            Stage::MeltingTemperature => 2,
            Stage::Thermodynamics => 3,
            Stage::Specificity => 4,
        }
    }

    pub fn progress_message(&self) -> &'static str {
        match self {
            Stage::SpliceJunctions => "Analyzing splice junction sites...",
            Stage::MeltingTemperature => "Calculating melting temperature...",
            Stage::Thermodynamics => "Calculating thermodynamics...",
            Stage::Specificity => "Assessing specificity...",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SpliceJunctions => write!(f, "splice junction analysis"),
            Stage::MeltingTemperature => write!(f, "melting temperature"),
            Stage::Thermodynamics => write!(f, "thermodynamics"),
            Stage::Specificity => write!(f, "specificity"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Database {database} does not exist")]
    DatabaseNotFound { database: String },
    #[error("Transcript ID {transcript_id} does not exist in {database}")]
    TranscriptNotFound {
        transcript_id: String,
        database: String,
    },
    #[error("{stage} failed for {transcript_id}: {source}")]
    Stage {
        transcript_id: String,
        stage: Stage,
        source: ServiceError,
    },
    #[error("{stage} cancelled for {transcript_id}: {reason}")]
    Cancelled {
        transcript_id: String,
        stage: Stage,
        reason: CancelReason,
    },
    #[error("Database error: {0}")]
    Database(#[from] DbError),
    #[error("{0}")]
    Transcript(#[from] CoreError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }

    /// Stage the run stopped in, if it got that far
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } | PipelineError::Cancelled { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}
