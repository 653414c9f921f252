use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Complement a single DNA base. Anything outside ACGT is uppercased and
/// returned unchanged.
pub fn complement_base(base: char) -> char {
    match base.to_ascii_uppercase() {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        other => other,
    }
}

/// Complement of a DNA sequence, uppercased
pub fn complement(seq: &str) -> String {
    seq.chars().map(complement_base).collect()
}

/// Reverse complement of a DNA sequence
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement_base).collect()
}

/// Number of G and C bases (case-insensitive)
pub fn gc_count(seq: &str) -> usize {
    seq.chars()
        .filter(|c| matches!(c.to_ascii_uppercase(), 'G' | 'C'))
        .count()
}

/// GC content as a percentage (0.0 to 100.0)
pub fn gc_percent(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    gc_count(seq) as f64 * 100.0 / seq.len() as f64
}

/// Round to one decimal place, the precision melting temperatures are stored at.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Buffer conditions that pick the melting temperature formula.
///
/// - `Basic`: Marmur & Doty, no salt correction.
/// - `Salt`: salt-adjusted (Nakano et al.), concentration in mol/L.
/// - `SaltFormamide`: Meinkoth & Wahl, salt in mol/L and formamide in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "formula", rename_all = "snake_case")]
pub enum TmConditions {
    Basic,
    Salt { molar: f64 },
    SaltFormamide { molar: f64, formamide_pct: f64 },
}

impl TmConditions {
    /// Select the formula from the optional salt and formamide parameters.
    /// Formamide without a salt concentration has no formula and is rejected.
    pub fn from_options(
        salt_molar: Option<f64>,
        formamide_pct: Option<f64>,
    ) -> Result<Self, CoreError> {
        match (salt_molar, formamide_pct) {
            (None, None) => Ok(TmConditions::Basic),
            (Some(molar), None) => Ok(TmConditions::Salt { molar }),
            (Some(molar), Some(formamide_pct)) => Ok(TmConditions::SaltFormamide {
                molar,
                formamide_pct,
            }),
            (None, Some(pct)) => Err(CoreError::InvalidConditions(format!(
                "formamide ({pct}%) requires a salt concentration"
            ))),
        }
    }
}

/// Melting temperature in °C.
///
/// `seq` must not be empty; the fixed 40/20-base windows guarantee this for
/// probe arms. An empty sequence yields a non-finite value.
pub fn melting_temperature(seq: &str, conditions: &TmConditions) -> f64 {
    let n = seq.len() as f64;
    let upper = seq.to_ascii_uppercase();
    let g = upper.matches('G').count() as f64;
    let c = upper.matches('C').count() as f64;

    match *conditions {
        TmConditions::Basic => 64.9 + 41.0 * (g + c - 16.4) / n,
        TmConditions::Salt { molar } => {
            100.5 + 41.0 * (g + c) / n - 820.0 / n + 16.6 * molar.log10()
        }
        TmConditions::SaltFormamide {
            molar,
            formamide_pct,
        } => 81.0 + 16.6 * molar.ln() + 0.41 * (g / n + c / n) - 500.0 / n - 0.61 * formamide_pct,
    }
}
