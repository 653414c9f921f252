use serde::{Deserialize, Serialize};

/// Exon index used before splice classification has run.
pub const UNASSIGNED_EXON: i32 = -1;

/// 1-based indices of the exons holding a probe's start and end coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExonSpan {
    pub start: i32,
    pub end: i32,
}

impl ExonSpan {
    pub const UNASSIGNED: ExonSpan = ExonSpan {
        start: UNASSIGNED_EXON,
        end: UNASSIGNED_EXON,
    };

    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn is_assigned(&self) -> bool {
        self.start != UNASSIGNED_EXON && self.end != UNASSIGNED_EXON
    }

    /// True when start and end fall in different exons, i.e. the probe
    /// crosses a splice junction.
    pub fn is_multi_exon(&self) -> bool {
        self.start != self.end
    }
}

impl Default for ExonSpan {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl std::fmt::Display for ExonSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.start, self.end)
    }
}

/// Assign exon indices to a probe's `start` and `end` by walking cumulative
/// exon lengths.
///
/// Exon `i` is recorded whenever the position is strictly greater than the
/// running sum *before* exon `i` is added, so the last such exon wins. A
/// position equal to a boundary is therefore attributed to the exon that ends
/// there, not the one that starts after it.
pub fn classify(start: usize, end: usize, exon_lengths: &[u32]) -> ExonSpan {
    let mut span = ExonSpan::UNASSIGNED;
    let mut csum: u64 = 0;

    for (i, &len) in exon_lengths.iter().enumerate() {
        let index = (i + 1) as i32;
        if start as u64 > csum {
            span.start = index;
        }
        if end as u64 > csum {
            span.end = index;
        }
        csum += len as u64;
    }

    span
}
