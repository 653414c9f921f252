use plish_core::Probe;
use plish_pipeline::DesignRun;

/// Amplification tier with the bridge sequences joined to each arm: the
/// left bridge is prepended to the left arm, the right bridge appended to
/// the right arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeTier {
    pub name: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

pub const BRIDGE_TIERS: [BridgeTier; 5] = [
    BridgeTier {
        name: "2X",
        left: "TCGTACGTCTAACTTACGTCGTTATG",
        right: "TTATACGTCGAGTTGAAGAACAACCTG",
    },
    BridgeTier {
        name: "3X",
        left: "TATTCGTTCGAACTTACGTCGTTATG",
        right: "TTATACGTCGAGTTGACCGACGTATTG",
    },
    BridgeTier {
        name: "4X",
        left: "TTAGTAGGCGAACTTACGTCGTTATG",
        right: "TTATACGTCGAGTTGAACATAAGTGCG",
    },
    BridgeTier {
        name: "5X",
        left: "TAGCGCTAACAACTTACGTCGTTATG",
        right: "TTATACGTCGAGTTGAACGTCGTAACA",
    },
    BridgeTier {
        name: "6X",
        left: "TAGGTCAGGAAACTTACGTCGTTATG",
        right: "TTATACGTCGAGTTGAATAGCCAGGTT",
    },
];

pub fn tier(name: &str) -> Option<&'static BridgeTier> {
    BRIDGE_TIERS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Ordering-ready oligos: for every probe and tier, an `HL<tier>-<label>`
/// record and an `HR<tier>-<label>` record.
pub fn serialize(run: &DesignRun, probes: &[Probe]) -> String {
    let mut out = String::new();
    for probe in probes {
        let label = run.probe_label(probe);
        for tier in &BRIDGE_TIERS {
            out.push_str(&format!(
                ">HL{}-{}\n{}{}\n",
                tier.name, label, tier.left, probe.left_arm.sequence
            ));
            out.push_str(&format!(
                ">HR{}-{}\n{}{}\n",
                tier.name, label, probe.right_arm.sequence, tier.right
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_sorted_and_shaped() {
        let names: Vec<&str> = BRIDGE_TIERS.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["2X", "3X", "4X", "5X", "6X"]);
        for t in &BRIDGE_TIERS {
            assert_eq!(t.left.len(), 26);
            assert_eq!(t.right.len(), 27);
            assert!(t.left.ends_with("ACTTACGTCGTTATG"));
            assert!(t.right.starts_with("TTATACGTCGAGTTGA"));
        }
    }

    #[test]
    fn test_tier_lookup() {
        assert_eq!(tier("4x").unwrap().name, "4X");
        assert!(tier("7X").is_none());
    }
}
