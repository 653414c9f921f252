use chrono::Utc;
use log::{info, warn};
use plish_core::search::generate_candidates;
use plish_core::Transcript;
use plish_db::TranscriptSource;
use plish_services::{SpecificityService, ThermodynamicService};
use uuid::Uuid;

use crate::cancel::{CancelToken, RunGuard};
use crate::stages::{
    assign_melting_temperatures, classify_splice_junctions, score_folding, score_specificity,
};
use crate::{DesignRun, PipelineConfig, PipelineError, Stage};

/// Designs and scores probes for one transcript at a time.
///
/// Runs are synchronous; each stage finishes the whole candidate list
/// before the next begins.
pub struct ProbePipeline<T, S> {
    thermo: T,
    specificity: S,
    config: PipelineConfig,
    cancel: CancelToken,
}

impl<T: ThermodynamicService, S: SpecificityService> ProbePipeline<T, S> {
    pub fn new(thermo: T, specificity: S, config: PipelineConfig) -> Self {
        Self {
            thermo,
            specificity,
            config,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Handle that stops the current or next run when cancelled
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Look the transcript up in `database` and run every stage on it.
    pub fn design<D: TranscriptSource + ?Sized>(
        &self,
        source: &D,
        database: &str,
        transcript_id: &str,
    ) -> Result<DesignRun, PipelineError> {
        let transcript_id: String = transcript_id.chars().filter(|c| !c.is_whitespace()).collect();

        if !source.database_exists(database)? {
            return Err(PipelineError::DatabaseNotFound {
                database: database.to_string(),
            });
        }

        let transcript = source
            .load_transcript(database, &transcript_id)?
            .ok_or_else(|| PipelineError::TranscriptNotFound {
                transcript_id: transcript_id.clone(),
                database: database.to_string(),
            })?;

        self.run(database, transcript)
    }

    /// Run every stage on an already loaded transcript. `database` is the
    /// one specificity is checked against.
    pub fn run(&self, database: &str, transcript: Transcript) -> Result<DesignRun, PipelineError> {
        let started_at = Utc::now();
        let conditions = self.config.tm_conditions()?;
        transcript.validate()?;
        let guard = RunGuard::new(
            transcript.id.clone(),
            self.cancel.clone(),
            self.config.deadline(),
        );

        info!("Target: {} ({})", transcript.id, transcript.name);
        if transcript.exon_lengths.is_empty() {
            warn!("{}: no exon structure, probes will not be placed on exons", transcript.id);
        } else if !transcript.exons_consistent() {
            warn!(
                "{}: exon lengths sum to {} but sequence has {} bases",
                transcript.id,
                transcript.exon_total(),
                transcript.len()
            );
        }

        let mut probes = generate_candidates(&transcript.sequence);
        info!("#Candidates: {}", probes.len());
        if let Some(limit) = self.config.max_candidates {
            probes.truncate(limit);
        }

        announce(Stage::SpliceJunctions);
        guard.check(Stage::SpliceJunctions)?;
        let probes = classify_splice_junctions(probes, &transcript.exon_lengths);

        announce(Stage::MeltingTemperature);
        guard.check(Stage::MeltingTemperature)?;
        let probes = assign_melting_temperatures(probes, &conditions);

        announce(Stage::Thermodynamics);
        let probes = score_folding(probes, &self.thermo, self.config.fold_temperature_k, &guard)?;

        announce(Stage::Specificity);
        let probes = score_specificity(probes, &self.specificity, &transcript, database, &guard)?;

        let run = DesignRun {
            run_id: Uuid::new_v4(),
            database: database.to_string(),
            transcript,
            config: self.config.clone(),
            probes,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "{}: {} probes scored, {} span an exon junction",
            run.transcript.id,
            run.probes.len(),
            run.multi_exon_count()
        );
        Ok(run)
    }
}

fn announce(stage: Stage) {
    info!("Step {}/{}: {}", stage.step(), Stage::ALL.len(), stage.progress_message());
}
