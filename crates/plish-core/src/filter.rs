use serde::{Deserialize, Serialize};

use crate::probe::{Probe, ProbeArm, Specificity};
use crate::CoreError;

/// Thresholds applied by [`filter_probes`]. All comparisons are strict and
/// every predicate must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    /// Minimum specificity tier (inclusive)
    pub min_specificity: Specificity,
    /// GC percentage must exceed this
    pub min_gc: f64,
    /// Drop probes whose start and end fall in the same exon
    pub require_multi_exon: bool,
    /// Both arm Tm values must lie in `(min_tm, max_tm)`
    pub min_tm: f64,
    pub max_tm: f64,
    /// Bimolecular energy of both arms must exceed this
    pub min_dimer: f64,
    /// Unimolecular energy of both arms must exceed this
    pub min_fold: f64,
    /// Duplex energy of both arms must be below this
    pub max_duplex: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_specificity: Specificity::None,
            min_gc: 0.0,
            require_multi_exon: false,
            min_tm: 55.0,
            max_tm: 65.0,
            min_dimer: f64::MIN,
            min_fold: f64::MIN,
            max_duplex: f64::MAX,
        }
    }
}

impl FilterCriteria {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let criteria: FilterCriteria = serde_json::from_str(json)?;
        criteria.validate()?;
        Ok(criteria)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_tm >= self.max_tm {
            return Err(CoreError::InvalidCriteria(format!(
                "empty melting temperature range ({}, {})",
                self.min_tm, self.max_tm
            )));
        }
        Ok(())
    }

    /// Whether a single probe passes every predicate. Probes missing a score
    /// never pass.
    pub fn accepts(&self, probe: &Probe) -> bool {
        if self.require_multi_exon && !probe.is_multi_exon() {
            return false;
        }
        let specificity_ok = probe
            .specificity
            .is_some_and(|s| s.rank() >= self.min_specificity.rank());

        specificity_ok
            && probe.gc_percent > self.min_gc
            && probe.arms().iter().all(|arm| self.arm_accepts(arm))
    }

    fn arm_accepts(&self, arm: &ProbeArm) -> bool {
        let tm_ok = arm
            .melting_temp
            .is_some_and(|tm| self.min_tm < tm && tm < self.max_tm);
        let energies_ok = arm.energies.is_some_and(|e| {
            e.bimolecular > self.min_dimer
                && e.unimolecular > self.min_fold
                && e.duplex < self.max_duplex
        });
        tm_ok && energies_ok
    }
}

/// Order-preserving subset of `probes` accepted by `criteria`.
pub fn filter_probes(probes: &[Probe], criteria: &FilterCriteria) -> Vec<Probe> {
    let kept: Vec<Probe> = probes
        .iter()
        .filter(|p| criteria.accepts(p))
        .cloned()
        .collect();
    log::debug!("filter kept {} of {} probes", kept.len(), probes.len());
    kept
}
