use serde::{Deserialize, Serialize};

use crate::exon::ExonSpan;
use crate::operations::{gc_percent, reverse_complement};
use crate::sequence::strip_version;

/// Total probe length in bases
pub const PROBE_LEN: usize = 40;
/// Length of each arm
pub const ARM_LEN: usize = PROBE_LEN / 2;
/// Bases of the window that lie upstream of the anchor offset
pub const UPSTREAM: usize = 19;
/// Bases of the window from the anchor offset onwards
pub const DOWNSTREAM: usize = PROBE_LEN - UPSTREAM;

/// How uniquely a probe matches its own transcript. Ordered
/// `None < Gene < Isoform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specificity {
    /// Hits another gene, or no hits at all
    None,
    /// Hits only the target gene, but other isoforms too
    Gene,
    /// Hits only the target transcript
    Isoform,
}

impl Specificity {
    pub const ALL: [Specificity; 3] = [Specificity::None, Specificity::Gene, Specificity::Isoform];

    pub fn rank(&self) -> u8 {
        match self {
            Specificity::None => 1,
            Specificity::Gene => 2,
            Specificity::Isoform => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Specificity::None => "none",
            Specificity::Gene => "gene",
            Specificity::Isoform => "isoform",
        }
    }
}

impl std::fmt::Display for Specificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Specificity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Specificity::None),
            "gene" => Ok(Specificity::Gene),
            "isoform" => Ok(Specificity::Isoform),
            other => Err(format!("unknown specificity '{other}'")),
        }
    }
}

/// One hit reported by the similarity search. Displayed as
/// `transcript|gene:identity` with identity at three decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityHit {
    /// Subject transcript id, version stripped
    pub transcript_id: String,
    pub gene_symbol: String,
    pub percent_identity: f64,
}

impl SimilarityHit {
    pub fn new(transcript_id: &str, gene_symbol: impl Into<String>, percent_identity: f64) -> Self {
        Self {
            transcript_id: strip_version(transcript_id).to_string(),
            gene_symbol: gene_symbol.into(),
            percent_identity,
        }
    }
}

impl std::fmt::Display for SimilarityHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}:{:.3}", self.transcript_id, self.gene_symbol, self.percent_identity)
    }
}

/// Classify specificity from the full hit list.
///
/// A hit on another gene forces `None` no matter where it appears in the
/// list; otherwise a hit on another transcript gives `Gene`. No hits at all
/// is `None`.
pub fn classify_specificity(
    transcript_id: &str,
    gene_name: &str,
    hits: &[SimilarityHit],
) -> Specificity {
    if hits.is_empty() {
        return Specificity::None;
    }
    let own_id = strip_version(transcript_id);
    if hits.iter().any(|h| h.gene_symbol != gene_name) {
        Specificity::None
    } else if hits.iter().any(|h| h.transcript_id != own_id) {
        Specificity::Gene
    } else {
        Specificity::Isoform
    }
}

/// Free energies (kcal/mol) reported by the folding engine for one arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmEnergies {
    /// Two identical oligos interacting
    pub bimolecular: f64,
    /// Self-structure
    pub unimolecular: f64,
    /// Duplex with the complementary sequence
    pub duplex: f64,
    /// Cost of opening the two terminal base pairs at the 5' end
    pub open_5prime: f64,
    /// Cost of opening the two terminal base pairs at the 3' end
    pub open_3prime: f64,
}

impl ArmEnergies {
    /// Build from the five values in engine column order.
    pub fn from_columns(values: [f64; 5]) -> Self {
        Self {
            bimolecular: values[0],
            unimolecular: values[1],
            duplex: values[2],
            open_5prime: values[3],
            open_3prime: values[4],
        }
    }

    pub fn columns(&self) -> [f64; 5] {
        [
            self.bimolecular,
            self.unimolecular,
            self.duplex,
            self.open_5prime,
            self.open_3prime,
        ]
    }
}

/// One 20-base half of a probe. Scores stay `None` until their stage has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeArm {
    pub sequence: String,
    #[serde(default)]
    pub melting_temp: Option<f64>,
    #[serde(default)]
    pub energies: Option<ArmEnergies>,
}

impl ProbeArm {
    pub fn new(sequence: impl Into<String>) -> Self {
        Self {
            sequence: sequence.into(),
            melting_temp: None,
            energies: None,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.melting_temp.is_some() && self.energies.is_some()
    }
}

/// A hybridization probe pair built around one anchor site.
///
/// Stage methods consume the probe and return it with the next set of fields
/// populated, so a stage never observes another stage's half-written state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    /// Offset of the anchor motif in the transcript
    pub anchor: usize,
    pub start: usize,
    pub end: usize,
    /// Target window as it appears in the transcript
    pub sequence: String,
    pub gc_percent: f64,
    pub left_arm: ProbeArm,
    pub right_arm: ProbeArm,
    #[serde(default)]
    pub exon_span: ExonSpan,
    #[serde(default)]
    pub specificity: Option<Specificity>,
    #[serde(default)]
    pub similarity_hits: Vec<SimilarityHit>,
}

impl Probe {
    /// Build a probe from a 40-base window around `anchor`.
    ///
    /// The arms come from the reverse complement: the right arm is its first
    /// 20 bases, the left arm the remainder.
    pub fn new(anchor: usize, window: &str) -> Self {
        let rc = reverse_complement(window);
        let split = ARM_LEN.min(rc.len());
        Self {
            anchor,
            start: anchor.saturating_sub(UPSTREAM),
            end: anchor + DOWNSTREAM,
            sequence: window.to_string(),
            gc_percent: gc_percent(window),
            right_arm: ProbeArm::new(&rc[..split]),
            left_arm: ProbeArm::new(&rc[split..]),
            exon_span: ExonSpan::UNASSIGNED,
            specificity: None,
            similarity_hits: Vec::new(),
        }
    }

    pub fn with_exon_span(mut self, span: ExonSpan) -> Self {
        self.exon_span = span;
        self
    }

    pub fn with_melting_temps(mut self, left: f64, right: f64) -> Self {
        self.left_arm.melting_temp = Some(left);
        self.right_arm.melting_temp = Some(right);
        self
    }

    pub fn with_energies(mut self, left: ArmEnergies, right: ArmEnergies) -> Self {
        self.left_arm.energies = Some(left);
        self.right_arm.energies = Some(right);
        self
    }

    pub fn with_specificity(mut self, specificity: Specificity, hits: Vec<SimilarityHit>) -> Self {
        self.specificity = Some(specificity);
        self.similarity_hits = hits;
        self
    }

    pub fn arms(&self) -> [&ProbeArm; 2] {
        [&self.left_arm, &self.right_arm]
    }

    pub fn is_multi_exon(&self) -> bool {
        self.exon_span.is_multi_exon()
    }

    /// Temperature, folding and specificity scores are all present. The exon
    /// span is not checked: -1 is a valid result for a probe starting at 0.
    pub fn is_fully_scored(&self) -> bool {
        self.specificity.is_some()
            && self.left_arm.is_scored()
            && self.right_arm.is_scored()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: &str = "AAAAAAAAAACCCCCCCCCCGGGGGGGGGGTTTTTTTTTT";

    #[test]
    fn test_probe_arms_from_reverse_complement() {
        let probe = Probe::new(25, WINDOW);
        assert_eq!(probe.start, 6);
        assert_eq!(probe.end, 46);
        assert_eq!(probe.sequence, WINDOW);
        // rc = AAAAAAAAAACCCCCCCCCCGGGGGGGGGGTTTTTTTTTT
        assert_eq!(probe.right_arm.sequence, "AAAAAAAAAACCCCCCCCCC");
        assert_eq!(probe.left_arm.sequence, "GGGGGGGGGGTTTTTTTTTT");
        assert!((probe.gc_percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(probe.exon_span, ExonSpan::UNASSIGNED);
        assert!(!probe.is_fully_scored());
    }

    #[test]
    fn test_stage_builders() {
        let e = ArmEnergies::from_columns([-1.0, -2.0, -30.0, 0.5, 0.4]);
        let probe = Probe::new(25, WINDOW)
            .with_exon_span(ExonSpan::new(1, 2))
            .with_melting_temps(60.1, 61.2)
            .with_energies(e, e)
            .with_specificity(Specificity::Isoform, Vec::new());
        assert!(probe.is_fully_scored());
        assert!(probe.is_multi_exon());
        assert_eq!(probe.left_arm.melting_temp, Some(60.1));
        assert_eq!(probe.right_arm.energies.unwrap().duplex, -30.0);
    }

    #[test]
    fn test_specificity_order() {
        assert!(Specificity::None < Specificity::Gene);
        assert!(Specificity::Gene < Specificity::Isoform);
        assert_eq!(Specificity::Isoform.rank(), 3);
        assert_eq!("gene".parse::<Specificity>().unwrap(), Specificity::Gene);
        assert!("weird".parse::<Specificity>().is_err());
    }

    #[test]
    fn test_classify_no_hits() {
        assert_eq!(classify_specificity("NM_1", "HBB", &[]), Specificity::None);
    }

    #[test]
    fn test_classify_isoform() {
        let hits = vec![SimilarityHit::new("NM_1.3", "HBB", 100.0)];
        assert_eq!(classify_specificity("NM_1", "HBB", &hits), Specificity::Isoform);
    }

    #[test]
    fn test_classify_gene() {
        let hits = vec![
            SimilarityHit::new("NM_1", "HBB", 100.0),
            SimilarityHit::new("NM_2", "HBB", 95.0),
        ];
        assert_eq!(classify_specificity("NM_1", "HBB", &hits), Specificity::Gene);
    }

    #[test]
    fn test_gene_mismatch_overrides_transcript_match() {
        let hits = vec![
            SimilarityHit::new("NM_1", "HBB", 100.0),
            SimilarityHit::new("NM_1", "HBD", 90.0),
        ];
        assert_eq!(classify_specificity("NM_1", "HBB", &hits), Specificity::None);

        // order must not matter
        let hits = vec![
            SimilarityHit::new("NM_9", "HBD", 90.0),
            SimilarityHit::new("NM_2", "HBB", 100.0),
        ];
        assert_eq!(classify_specificity("NM_1", "HBB", &hits), Specificity::None);
    }

    #[test]
    fn test_hit_display() {
        let hit = SimilarityHit::new("NM_2.1", "HBB", 97.5);
        assert_eq!(hit.to_string(), "NM_2|HBB:97.500");
        // blastn reports identity with three decimals
        assert_eq!(SimilarityHit::new("NM_1", "HBB", 100.0).to_string(), "NM_1|HBB:100.000");
    }

    #[test]
    fn test_energies_columns() {
        let cols = [-1.5, -0.3, -28.4, 1.1, 0.9];
        assert_eq!(ArmEnergies::from_columns(cols).columns(), cols);
    }
}
