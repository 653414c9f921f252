use std::path::Path;
use std::time::Duration;

use plish_core::operations::TmConditions;
use plish_services::DEFAULT_FOLD_TEMPERATURE_K;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Run parameters. Every field has a default, so a partial JSON document is
/// enough to override one setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Monovalent salt, mol/L. `None` selects the uncorrected Tm formula.
    pub salt_molar: Option<f64>,
    /// Formamide, percent. Requires `salt_molar`.
    pub formamide_pct: Option<f64>,
    /// Folding temperature in Kelvin
    pub fold_temperature_k: f64,
    /// Keep only the first N candidates (quick trial runs)
    pub max_candidates: Option<usize>,
    /// Abort the whole run after this many seconds
    pub deadline_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            salt_molar: Some(0.05),
            formamide_pct: None,
            fold_temperature_k: DEFAULT_FOLD_TEMPERATURE_K,
            max_candidates: None,
            deadline_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.tm_conditions()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn tm_conditions(&self) -> Result<TmConditions, PipelineError> {
        TmConditions::from_options(self.salt_molar, self.formamide_pct)
            .map_err(|e| PipelineError::Config(e.to_string()))
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_secs.map(Duration::from_secs)
    }
}
