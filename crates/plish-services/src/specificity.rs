use plish_core::{normalize_gene_name, SimilarityHit};
use uuid::Uuid;

use crate::ServiceError;

/// A full probe sequence to search against a reference database
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub request_id: Uuid,
    pub sequence: String,
    pub database: String,
}

impl SearchRequest {
    pub fn new(sequence: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            sequence: sequence.into(),
            database: database.into(),
        }
    }
}

/// A similarity search returning hits in the engine's ranking order.
pub trait SpecificityService {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SimilarityHit>, ServiceError>;
}

impl<T: SpecificityService + ?Sized> SpecificityService for &T {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SimilarityHit>, ServiceError> {
        (**self).search(request)
    }
}

/// Parse one tabular hit row. Field 2 holds `transcript_id|gene_symbol`,
/// field 3 the percent identity; everything after is ignored.
pub fn parse_similarity_row(line: &str) -> Result<SimilarityHit, ServiceError> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() < 3 {
        return Err(ServiceError::malformed(
            line,
            format!("expected at least 3 fields, found {}", fields.len()),
        ));
    }

    let (transcript_id, gene_symbol) = fields[1]
        .split_once('|')
        .ok_or_else(|| ServiceError::malformed(line, "subject id lacks '|' separator"))?;
    let gene_symbol = gene_symbol.split('|').next().unwrap_or(gene_symbol);
    let identity = fields[2]
        .trim()
        .parse::<f64>()
        .map_err(|_| {
            let reason = format!("'{}' is not a percent identity", fields[2]);
            ServiceError::malformed(line, reason)
        })?;

    Ok(SimilarityHit::new(
        transcript_id.trim(),
        normalize_gene_name(gene_symbol),
        identity,
    ))
}

/// Parse every non-empty, non-comment line of a tabular search report.
pub fn parse_search_output(text: &str) -> Result<Vec<SimilarityHit>, ServiceError> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(parse_similarity_row)
        .collect()
}
