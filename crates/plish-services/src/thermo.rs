use plish_core::ArmEnergies;
use uuid::Uuid;

use crate::ServiceError;

/// Body temperature, the reference for all folding calculations
pub const DEFAULT_FOLD_TEMPERATURE_K: f64 = 310.15;

/// Both arms of one probe, submitted together
#[derive(Debug, Clone, PartialEq)]
pub struct FoldRequest {
    pub request_id: Uuid,
    pub left_arm: String,
    pub right_arm: String,
    /// Kelvin
    pub temperature: f64,
}

impl FoldRequest {
    pub fn new(
        left_arm: impl Into<String>,
        right_arm: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            left_arm: left_arm.into(),
            right_arm: right_arm.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldResponse {
    pub left: ArmEnergies,
    pub right: ArmEnergies,
}

/// A folding engine that scores two oligos at a given temperature.
pub trait ThermodynamicService {
    fn fold(&self, request: &FoldRequest) -> Result<FoldResponse, ServiceError>;
}

impl<T: ThermodynamicService + ?Sized> ThermodynamicService for &T {
    fn fold(&self, request: &FoldRequest) -> Result<FoldResponse, ServiceError> {
        (**self).fold(request)
    }
}

/// Parse one result row: an echoed label followed by bimolecular,
/// unimolecular, duplex, 5' opening and 3' opening energies.
pub fn parse_fold_row(line: &str) -> Result<(String, ArmEnergies), ServiceError> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() != 6 {
        return Err(ServiceError::malformed(
            line,
            format!("expected 6 fields, found {}", fields.len()),
        ));
    }

    let mut values = [0.0; 5];
    for (slot, field) in values.iter_mut().zip(&fields[1..]) {
        let field = field.trim();
        *slot = field
            .parse::<f64>()
            .map_err(|_| ServiceError::malformed(line, format!("'{field}' is not a number")))?;
    }

    Ok((fields[0].trim().to_string(), ArmEnergies::from_columns(values)))
}

/// Parse the engine's result table: a header line, then exactly one row per
/// submitted arm in submission order (left, then right).
pub fn parse_fold_output(text: &str) -> Result<FoldResponse, ServiceError> {
    let rows: Vec<&str> = text
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if rows.len() != 2 {
        return Err(ServiceError::malformed(
            text.lines().next().unwrap_or(""),
            format!("expected 2 result rows, found {}", rows.len()),
        ));
    }

    let (_, left) = parse_fold_row(rows[0])?;
    let (_, right) = parse_fold_row(rows[1])?;
    Ok(FoldResponse { left, right })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "Name\tDG bimolecular\tDG unimolecular\tDG duplex\tDG 2bp at 5'\tDG 2bp at 3'\n\
        1\t-3.2\t-0.8\t-24.6\t1.9\t2.1\n\
        2\t-1.4\t0.3\t-26.0\t2.4\t1.7\n";

    #[test]
    fn test_parse_fold_row() {
        let (label, e) = parse_fold_row("1\t-3.2\t-0.8\t-24.6\t1.9\t2.1").unwrap();
        assert_eq!(label, "1");
        assert_eq!(e.bimolecular, -3.2);
        assert_eq!(e.unimolecular, -0.8);
        assert_eq!(e.duplex, -24.6);
        assert_eq!(e.open_5prime, 1.9);
        assert_eq!(e.open_3prime, 2.1);
    }

    #[test]
    fn test_parse_fold_row_rejects_bad_rows() {
        assert!(parse_fold_row("1\t-3.2\t-0.8\t-24.6\t1.9").is_err());
        assert!(parse_fold_row("1\t-3.2\t-0.8\tabc\t1.9\t2.1").is_err());
        assert!(parse_fold_row("").is_err());
    }

    #[test]
    fn test_parse_fold_output() {
        let resp = parse_fold_output(OUTPUT).unwrap();
        assert_eq!(resp.left.bimolecular, -3.2);
        assert_eq!(resp.right.duplex, -26.0);
    }

    #[test]
    fn test_parse_fold_output_needs_two_rows() {
        let header_only = "Name\ta\tb\tc\td\te\n";
        assert!(parse_fold_output(header_only).is_err());
        let extra = format!("{}3\t0\t0\t0\t0\t0\n", OUTPUT);
        assert!(parse_fold_output(&extra).is_err());
    }

    #[test]
    fn test_requests_get_distinct_ids() {
        let a = FoldRequest::new("A", "C", DEFAULT_FOLD_TEMPERATURE_K);
        let b = FoldRequest::new("A", "C", DEFAULT_FOLD_TEMPERATURE_K);
        assert_ne!(a.request_id, b.request_id);
    }
}
