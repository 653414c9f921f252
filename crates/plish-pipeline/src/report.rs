use chrono::{DateTime, Utc};
use plish_core::{filter_probes, FilterCriteria, Probe, Specificity, Transcript};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PipelineConfig;

/// Outcome of one completed run. Every probe in `probes` is fully scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRun {
    pub run_id: Uuid,
    pub database: String,
    pub transcript: Transcript,
    pub config: PipelineConfig,
    /// All candidates in anchor order, before filtering
    pub probes: Vec<Probe>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DesignRun {
    /// Order-preserving subset that passes `criteria`
    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<Probe> {
        filter_probes(&self.probes, criteria)
    }

    /// `<gene>-<transcript>`, the prefix shared by all probe labels
    pub fn label_prefix(&self) -> String {
        format!("{}-{}", self.transcript.name.replace('"', ""), self.transcript.id)
    }

    /// `<gene>-<transcript>-<anchor>`
    pub fn probe_label(&self, probe: &Probe) -> String {
        format!("{}-{}", self.label_prefix(), probe.anchor)
    }

    /// Number of probes per specificity tier, in tier order
    pub fn specificity_counts(&self) -> [(Specificity, usize); 3] {
        Specificity::ALL.map(|tier| {
            let n = self
                .probes
                .iter()
                .filter(|p| p.specificity == Some(tier))
                .count();
            (tier, n)
        })
    }

    pub fn multi_exon_count(&self) -> usize {
        self.probes.iter().filter(|p| p.is_multi_exon()).count()
    }
}
