pub mod exon;
pub mod filter;
pub mod operations;
pub mod probe;
pub mod search;
pub mod sequence;

pub use exon::*;
pub use filter::*;
pub use probe::*;
pub use sequence::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid melting temperature conditions: {0}")]
    InvalidConditions(String),
    #[error("Transcript {transcript_id} has non-ASCII character '{found}' at byte {position}")]
    InvalidSequence {
        transcript_id: String,
        position: usize,
        found: char,
    },
    #[error("Invalid filter criteria: {0}")]
    InvalidCriteria(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
