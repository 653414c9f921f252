use std::cell::RefCell;
use std::time::Duration;

use plish_core::{ArmEnergies, CoreError, ExonSpan, SimilarityHit, Specificity, Transcript};
use plish_db::{DatabaseInfo, SqliteTranscriptStore};
use plish_pipeline::{
    CancelReason, CancelToken, PipelineConfig, PipelineError, ProbePipeline, Stage,
};
use plish_services::{
    FoldRequest, FoldResponse, SearchRequest, ServiceError, SpecificityService,
    ThermodynamicService,
};

// First 100 bases of HBB coding sequence
const HBB: &str = "ATGGTGCATCTGACTCCTGAGGAGAAGTCTGCCGTTACTGCCCTGTGGGGCAAGGTGAACGTGGATGAAGTTGGTGGTGAGGCCCTGGGCAGGCTGCTGG";

#[derive(Default)]
struct Calls {
    events: RefCell<Vec<String>>,
}

struct FakeFolder<'a> {
    calls: &'a Calls,
    fail: bool,
}

impl ThermodynamicService for FakeFolder<'_> {
    fn fold(&self, request: &FoldRequest) -> Result<FoldResponse, ServiceError> {
        self.calls.events.borrow_mut().push(format!(
            "fold {} {} {}",
            request.left_arm, request.right_arm, request.temperature
        ));
        if self.fail {
            return Err(ServiceError::MalformedOutput {
                line: "1\t-3.2".to_string(),
                reason: "expected 6 fields, found 2".to_string(),
            });
        }
        Ok(FoldResponse {
            left: ArmEnergies::from_columns([-1.0, -0.5, -28.0, 1.2, 1.4]),
            right: ArmEnergies::from_columns([-2.0, -0.7, -30.0, 1.1, 1.3]),
        })
    }
}

enum SearchMode {
    OwnTranscript,
    Empty,
    OtherIsoform,
    TimeOut,
    CancelAfter(usize, CancelToken),
}

struct FakeSearch<'a> {
    calls: &'a Calls,
    mode: SearchMode,
}

impl SpecificityService for FakeSearch<'_> {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SimilarityHit>, ServiceError> {
        let n = {
            let mut events = self.calls.events.borrow_mut();
            events.push(format!("search {} {}", request.database, request.sequence));
            events.iter().filter(|e| e.starts_with("search")).count()
        };
        match &self.mode {
            SearchMode::OwnTranscript => Ok(vec![SimilarityHit::new("NM_000518.5", "HBB", 100.0)]),
            SearchMode::Empty => Ok(Vec::new()),
            SearchMode::OtherIsoform => Ok(vec![
                SimilarityHit::new("NM_000518", "HBB", 100.0),
                SimilarityHit::new("XM_011520", "HBB", 97.5),
            ]),
            SearchMode::TimeOut => Err(ServiceError::TimedOut {
                executable: "blastn".to_string(),
                after: Duration::from_secs(5),
            }),
            SearchMode::CancelAfter(limit, token) => {
                if n >= *limit {
                    token.cancel();
                }
                Ok(Vec::new())
            }
        }
    }
}

fn store() -> SqliteTranscriptStore {
    let store = SqliteTranscriptStore::open_in_memory().unwrap();
    store
        .add_database(&DatabaseInfo {
            id: "hg38".to_string(),
            name: "Human".to_string(),
            comment: None,
        })
        .unwrap();
    store
        .insert_transcript("hg38", &Transcript::new("NM_000518.5", "HBB", HBB, vec![50, 50]))
        .unwrap();
    store
}

fn pipeline<'a>(
    calls: &'a Calls,
    mode: SearchMode,
    config: PipelineConfig,
) -> ProbePipeline<FakeFolder<'a>, FakeSearch<'a>> {
    ProbePipeline::new(FakeFolder { calls, fail: false }, FakeSearch { calls, mode }, config)
}

#[test]
fn test_full_run_scores_every_candidate() {
    let calls = Calls::default();
    let run = pipeline(&calls, SearchMode::OwnTranscript, PipelineConfig::default())
        .design(&store(), "hg38", " NM_000518.5 ")
        .unwrap();

    assert_eq!(run.transcript.id, "NM_000518");
    assert_eq!(run.database, "hg38");
    let anchors: Vec<usize> = run.probes.iter().map(|p| p.anchor).collect();
    assert_eq!(anchors, vec![19, 22, 25, 35, 52, 68, 79]);

    let spans: Vec<ExonSpan> = run.probes.iter().map(|p| p.exon_span).collect();
    assert_eq!(
        spans,
        vec![
            ExonSpan::new(-1, 1),
            ExonSpan::new(1, 1),
            ExonSpan::new(1, 1),
            ExonSpan::new(1, 2),
            ExonSpan::new(1, 2),
            ExonSpan::new(1, 2),
            ExonSpan::new(2, 2),
        ]
    );

    for p in &run.probes {
        assert!(p.is_fully_scored());
        assert_eq!(p.sequence, &HBB[p.start..p.end]);
        assert_eq!(p.specificity, Some(Specificity::Isoform));
        assert_eq!(p.similarity_hits.len(), 1);
        assert_eq!(p.left_arm.energies.unwrap().duplex, -28.0);
        assert_eq!(p.right_arm.energies.unwrap().duplex, -30.0);
    }
    assert!(run.started_at <= run.finished_at);
}

#[test]
fn test_stages_run_over_whole_list_in_order() {
    let calls = Calls::default();
    let run = pipeline(&calls, SearchMode::OwnTranscript, PipelineConfig::default())
        .design(&store(), "hg38", "NM_000518")
        .unwrap();

    let events = calls.events.borrow();
    assert_eq!(events.len(), 2 * run.probes.len());
    let (folds, searches) = events.split_at(run.probes.len());
    assert!(folds.iter().all(|e| e.starts_with("fold")));
    assert!(searches.iter().all(|e| e.starts_with("search hg38")));

    // arms are submitted left then right, at body temperature
    let first = &run.probes[0];
    assert_eq!(
        folds[0],
        format!("fold {} {} 310.15", first.left_arm.sequence, first.right_arm.sequence)
    );
    // the full probe, not an arm, is searched
    assert_eq!(searches[0], format!("search hg38 {}", first.sequence));
}

#[test]
fn test_no_hits_means_no_specificity() {
    let calls = Calls::default();
    let run = pipeline(&calls, SearchMode::Empty, PipelineConfig::default())
        .design(&store(), "hg38", "NM_000518")
        .unwrap();
    for p in &run.probes {
        assert_eq!(p.specificity, Some(Specificity::None));
        assert!(p.similarity_hits.is_empty());
    }
}

#[test]
fn test_other_isoform_hits_give_gene_specificity() {
    let calls = Calls::default();
    let run = pipeline(&calls, SearchMode::OtherIsoform, PipelineConfig::default())
        .design(&store(), "hg38", "NM_000518")
        .unwrap();
    assert!(run.probes.iter().all(|p| p.specificity == Some(Specificity::Gene)));
    assert_eq!(run.probes[0].similarity_hits.len(), 2);
}

#[test]
fn test_unknown_database() {
    let calls = Calls::default();
    let err = pipeline(&calls, SearchMode::Empty, PipelineConfig::default())
        .design(&store(), "mm10", "NM_000518")
        .unwrap_err();
    assert!(matches!(err, PipelineError::DatabaseNotFound { ref database } if database == "mm10"));
    assert!(calls.events.borrow().is_empty());
}

#[test]
fn test_unknown_transcript() {
    let calls = Calls::default();
    let err = pipeline(&calls, SearchMode::Empty, PipelineConfig::default())
        .design(&store(), "hg38", "NM_404")
        .unwrap_err();
    assert!(matches!(err, PipelineError::TranscriptNotFound { .. }));
    assert!(err.to_string().contains("NM_404"));
}

#[test]
fn test_malformed_fold_output_aborts_run() {
    let calls = Calls::default();
    let pipeline = ProbePipeline::new(
        FakeFolder {
            calls: &calls,
            fail: true,
        },
        FakeSearch {
            calls: &calls,
            mode: SearchMode::Empty,
        },
        PipelineConfig::default(),
    );
    let err = pipeline.design(&store(), "hg38", "NM_000518").unwrap_err();
    match err {
        PipelineError::Stage {
            transcript_id,
            stage,
            source: ServiceError::MalformedOutput { .. },
        } => {
            assert_eq!(transcript_id, "NM_000518");
            assert_eq!(stage, Stage::Thermodynamics);
        }
        other => panic!("expected thermodynamics failure, got {other:?}"),
    }
    // stopped at the first probe, search never ran
    assert_eq!(calls.events.borrow().len(), 1);
}

#[test]
fn test_service_timeout_is_a_cancellation() {
    let calls = Calls::default();
    let err = pipeline(&calls, SearchMode::TimeOut, PipelineConfig::default())
        .design(&store(), "hg38", "NM_000518")
        .unwrap_err();
    assert!(err.is_cancellation());
    match err {
        PipelineError::Cancelled { stage, reason, .. } => {
            assert_eq!(stage, Stage::Specificity);
            assert_eq!(
                reason,
                CancelReason::TimedOut {
                    after: Duration::from_secs(5)
                }
            );
        }
        other => panic!("expected cancellation, got {other:?}"),
    }
}

#[test]
fn test_cancel_token_stops_between_probes() {
    let calls = Calls::default();
    let token = CancelToken::new();
    let err = pipeline(
        &calls,
        SearchMode::CancelAfter(2, token.clone()),
        PipelineConfig::default(),
    )
    .with_cancel_token(token)
    .design(&store(), "hg38", "NM_000518")
    .unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Cancelled {
            stage: Stage::Specificity,
            reason: CancelReason::Requested,
            ..
        }
    ));
    let searches = calls
        .events
        .borrow()
        .iter()
        .filter(|e| e.starts_with("search"))
        .count();
    assert_eq!(searches, 2);
}

#[test]
fn test_max_candidates_truncates() {
    let calls = Calls::default();
    let config = PipelineConfig {
        max_candidates: Some(3),
        ..PipelineConfig::default()
    };
    let run = pipeline(&calls, SearchMode::OwnTranscript, config)
        .design(&store(), "hg38", "NM_000518")
        .unwrap();
    let anchors: Vec<usize> = run.probes.iter().map(|p| p.anchor).collect();
    assert_eq!(anchors, vec![19, 22, 25]);
}

#[test]
fn test_melting_temperatures_use_configured_formula() {
    let calls = Calls::default();
    let config = PipelineConfig {
        salt_molar: None,
        ..PipelineConfig::default()
    };
    let run = pipeline(&calls, SearchMode::OwnTranscript, config)
        .design(&store(), "hg38", "NM_000518")
        .unwrap();
    let arm = &run.probes[0].left_arm;
    let gc = arm.sequence.chars().filter(|c| *c == 'G' || *c == 'C').count() as f64;
    let expected = 64.9 + 41.0 * (gc - 16.4) / 20.0;
    assert!((arm.melting_temp.unwrap() - expected).abs() <= 0.05 + 1e-9);
}

#[test]
fn test_filtered_subset() {
    let calls = Calls::default();
    let run = pipeline(&calls, SearchMode::OwnTranscript, PipelineConfig::default())
        .design(&store(), "hg38", "NM_000518")
        .unwrap();
    let criteria = plish_core::FilterCriteria {
        require_multi_exon: true,
        min_tm: 0.0,
        max_tm: 100.0,
        ..plish_core::FilterCriteria::default()
    };
    let kept: Vec<usize> = run.filtered(&criteria).iter().map(|p| p.anchor).collect();
    assert_eq!(kept, vec![19, 35, 52, 68]);
}

#[test]
fn test_non_ascii_transcript_is_rejected() {
    let calls = Calls::default();
    let sequence = format!("Ä{}", &HBB[2..]);
    let err = pipeline(&calls, SearchMode::OwnTranscript, PipelineConfig::default())
        .run("hg38", Transcript::new("NM_000518", "HBB", sequence, vec![50, 50]))
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Transcript(CoreError::InvalidSequence { position: 0, .. })
    ));
    assert!(calls.events.borrow().is_empty());
}

#[test]
fn test_exon_sum_mismatch_is_tolerated() {
    let calls = Calls::default();
    // 40 + 50 = 90, the sequence has 100 bases
    let transcript = Transcript::new("NM_000518", "HBB", HBB, vec![40, 50]);
    assert!(!transcript.exons_consistent());

    let run = pipeline(&calls, SearchMode::OwnTranscript, PipelineConfig::default())
        .run("hg38", transcript)
        .unwrap();

    let spans: Vec<ExonSpan> = run.probes.iter().map(|p| p.exon_span).collect();
    assert_eq!(
        spans,
        vec![
            ExonSpan::new(-1, 1),
            ExonSpan::new(1, 2),
            ExonSpan::new(1, 2),
            ExonSpan::new(1, 2),
            ExonSpan::new(1, 2),
            ExonSpan::new(2, 2),
            ExonSpan::new(2, 2),
        ]
    );
    assert!(run.probes.iter().all(|p| p.is_fully_scored()));
}
