use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Drop a trailing `.N` version suffix from a transcript identifier.
pub fn strip_version(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}

/// Gene names are stored quoted in some reference files; trim the quotes.
pub fn normalize_gene_name(name: &str) -> String {
    name.trim().trim_matches('"').to_string()
}

/// A target transcript: spliced nucleotide sequence plus its exon structure
/// in 5'->3' (strand-aware) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Identifier without version suffix
    pub id: String,
    /// Gene name used for display and specificity checks
    pub name: String,
    pub sequence: String,
    #[serde(default)]
    pub exon_lengths: Vec<u32>,
}

impl Transcript {
    pub fn new(
        id: impl AsRef<str>,
        name: impl AsRef<str>,
        sequence: impl Into<String>,
        exon_lengths: Vec<u32>,
    ) -> Self {
        Self {
            id: strip_version(id.as_ref().trim()).to_string(),
            name: normalize_gene_name(name.as_ref()),
            sequence: sequence.into().to_uppercase(),
            exon_lengths,
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Sum of all exon lengths
    pub fn exon_total(&self) -> u64 {
        self.exon_lengths.iter().map(|&l| l as u64).sum()
    }

    /// Whether the exon lengths add up to the sequence length. Not enforced;
    /// callers may warn on mismatch.
    pub fn exons_consistent(&self) -> bool {
        self.exon_total() == self.sequence.len() as u64
    }

    /// Sequences must be ASCII. Non-ACGT letters are tolerated, multi-byte
    /// characters are not.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self.sequence.char_indices().find(|(_, c)| !c.is_ascii()) {
            Some((position, found)) => Err(CoreError::InvalidSequence {
                transcript_id: self.id.clone(),
                position,
                found,
            }),
            None => Ok(()),
        }
    }
}
