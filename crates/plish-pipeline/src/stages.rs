use plish_core::operations::{melting_temperature, round1, TmConditions};
use plish_core::{classify, classify_specificity, Probe, Transcript};
use plish_services::{
    FoldRequest, SearchRequest, ServiceError, SpecificityService, ThermodynamicService,
};

use crate::cancel::{CancelReason, RunGuard};
use crate::{PipelineError, Stage};

/// Stage 1: attach the exon span of every probe.
pub fn classify_splice_junctions(probes: Vec<Probe>, exon_lengths: &[u32]) -> Vec<Probe> {
    probes
        .into_iter()
        .map(|p| {
            let span = classify(p.start, p.end, exon_lengths);
            p.with_exon_span(span)
        })
        .collect()
}

/// Stage 2: melting temperature of both arms, rounded to 0.1 °C.
pub fn assign_melting_temperatures(probes: Vec<Probe>, conditions: &TmConditions) -> Vec<Probe> {
    probes
        .into_iter()
        .map(|p| {
            let left = round1(melting_temperature(&p.left_arm.sequence, conditions));
            let right = round1(melting_temperature(&p.right_arm.sequence, conditions));
            p.with_melting_temps(left, right)
        })
        .collect()
}

/// Stage 3: folding energies for both arms, one engine call per probe.
pub(crate) fn score_folding<T: ThermodynamicService>(
    probes: Vec<Probe>,
    service: &T,
    temperature: f64,
    guard: &RunGuard,
) -> Result<Vec<Probe>, PipelineError> {
    let mut scored = Vec::with_capacity(probes.len());
    for probe in probes {
        guard.check(Stage::Thermodynamics)?;
        let request = FoldRequest::new(
            probe.left_arm.sequence.clone(),
            probe.right_arm.sequence.clone(),
            temperature,
        );
        let response = service
            .fold(&request)
            .map_err(|e| stage_error(guard, Stage::Thermodynamics, e))?;
        log::debug!(
            "probe @{}: duplex {:.1}/{:.1}",
            probe.anchor,
            response.left.duplex,
            response.right.duplex
        );
        scored.push(probe.with_energies(response.left, response.right));
    }
    Ok(scored)
}

/// Stage 4: search each full probe against `database` and classify.
pub(crate) fn score_specificity<S: SpecificityService>(
    probes: Vec<Probe>,
    service: &S,
    transcript: &Transcript,
    database: &str,
    guard: &RunGuard,
) -> Result<Vec<Probe>, PipelineError> {
    let mut scored = Vec::with_capacity(probes.len());
    for probe in probes {
        guard.check(Stage::Specificity)?;
        let request = SearchRequest::new(probe.sequence.clone(), database);
        let hits = service
            .search(&request)
            .map_err(|e| stage_error(guard, Stage::Specificity, e))?;
        let specificity = classify_specificity(&transcript.id, &transcript.name, &hits);
        log::debug!("probe @{}: {} hits, {}", probe.anchor, hits.len(), specificity);
        scored.push(probe.with_specificity(specificity, hits));
    }
    Ok(scored)
}

/// Service timeouts are reported as cancellations, everything else as a
/// stage failure.
fn stage_error(guard: &RunGuard, stage: Stage, err: ServiceError) -> PipelineError {
    match err {
        ServiceError::TimedOut { after, .. } => {
            guard.cancelled(stage, CancelReason::TimedOut { after })
        }
        source => PipelineError::Stage {
            transcript_id: guard.transcript_id.clone(),
            stage,
            source,
        },
    }
}
