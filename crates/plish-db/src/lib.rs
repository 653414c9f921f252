pub mod flatfile;
pub mod sqlite;

pub use flatfile::FlatFileDatabase;
pub use sqlite::SqliteTranscriptStore;

use std::path::PathBuf;

use plish_core::Transcript;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("Malformed {path} line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

/// A reference database as listed to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Gene name and spliced sequence of one transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub gene_name: String,
    pub sequence: String,
}

/// Read access to prepared reference databases. Transcript ids are compared
/// without their `.N` version suffix.
pub trait TranscriptSource {
    fn database_exists(&self, database: &str) -> Result<bool, DbError>;

    /// `None` when the transcript is not in the database
    fn fetch_transcript(
        &self,
        database: &str,
        transcript_id: &str,
    ) -> Result<Option<TranscriptEntry>, DbError>;

    /// Exon lengths in 5'->3' order; empty when the transcript is unknown
    fn fetch_exon_lengths(&self, database: &str, transcript_id: &str) -> Result<Vec<u32>, DbError>;

    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DbError>;

    /// Sequence and exon structure together.
    fn load_transcript(
        &self,
        database: &str,
        transcript_id: &str,
    ) -> Result<Option<Transcript>, DbError> {
        let Some(entry) = self.fetch_transcript(database, transcript_id)? else {
            return Ok(None);
        };
        let exons = self.fetch_exon_lengths(database, transcript_id)?;
        Ok(Some(Transcript::new(
            transcript_id,
            &entry.gene_name,
            entry.sequence,
            exons,
        )))
    }
}

impl<T: TranscriptSource + ?Sized> TranscriptSource for &T {
    fn database_exists(&self, database: &str) -> Result<bool, DbError> {
        (**self).database_exists(database)
    }

    fn fetch_transcript(
        &self,
        database: &str,
        transcript_id: &str,
    ) -> Result<Option<TranscriptEntry>, DbError> {
        (**self).fetch_transcript(database, transcript_id)
    }

    fn fetch_exon_lengths(&self, database: &str, transcript_id: &str) -> Result<Vec<u32>, DbError> {
        (**self).fetch_exon_lengths(database, transcript_id)
    }

    fn list_databases(&self) -> Result<Vec<DatabaseInfo>, DbError> {
        (**self).list_databases()
    }
}

/// Parse a comma-separated exon length list such as `120,88,301`.
pub fn parse_exon_lengths(field: &str) -> Result<Vec<u32>, String> {
    field
        .trim()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<u32>()
                .map_err(|_| format!("'{}' is not an exon length", s.trim()))
        })
        .collect()
}

/// Inverse of [`parse_exon_lengths`]
pub fn format_exon_lengths(lengths: &[u32]) -> String {
    lengths
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
