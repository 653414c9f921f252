use regex::Regex;

use crate::probe::{Probe, DOWNSTREAM, UPSTREAM};

/// Two-base motifs that mark a probe split point
pub const ANCHOR_PATTERN: &str = "AG|TA";

/// Offsets of every anchor motif in `sequence`, ascending. Matches may
/// overlap: "TAG" yields both TA at 0 and AG at 1.
pub fn find_anchors(sequence: &str) -> Vec<usize> {
    find_overlapping(sequence, ANCHOR_PATTERN).unwrap_or_default()
}

/// Start offsets of all (possibly overlapping) regex matches, case-insensitive
pub fn find_overlapping(sequence: &str, pattern: &str) -> Result<Vec<usize>, regex::Error> {
    let re = Regex::new(&format!("(?i){}", pattern))?;
    let mut offsets = Vec::new();
    let mut pos = 0;

    while pos < sequence.len() {
        match re.find_at(sequence, pos) {
            Some(m) => {
                offsets.push(m.start());
                pos = m.start() + 1;
            }
            None => break,
        }
    }

    Ok(offsets)
}

/// Whether a full window `[offset - 19, offset + 21)` fits inside a sequence
/// of length `len`.
pub fn window_fits(offset: usize, len: usize) -> bool {
    offset >= UPSTREAM && offset + DOWNSTREAM <= len
}

/// Scan a transcript and build one probe per usable anchor, in ascending
/// anchor order. Windows containing non-ASCII characters are skipped.
pub fn generate_candidates(sequence: &str) -> Vec<Probe> {
    let len = sequence.len();
    find_anchors(sequence)
        .into_iter()
        .filter(|&offset| window_fits(offset, len))
        .filter_map(|offset| {
            sequence
                .get(offset - UPSTREAM..offset + DOWNSTREAM)
                .filter(|window| window.is_ascii())
                .map(|window| Probe::new(offset, window))
        })
        .collect()
}
