use plish_core::{Probe, ProbeArm};
use plish_pipeline::DesignRun;

const PROBE_COLUMNS: [&str; 7] = [
    "Hprobe: Id",
    "Hprobe: Target sequence",
    "Hprobe: %GC",
    "Hprobe: Multiple exons?",
    "Hprobe: Exons",
    "Hprobe: Specificity",
    "Hprobe: Hits (Ident%)",
];

const ARM_COLUMNS: [&str; 7] = ["Seq", "Tm", "Bimol.", "Unimol.", "Duplex", "Open5", "Open3"];

pub fn header() -> String {
    let mut cols: Vec<String> = PROBE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for side in ["Left", "Right"] {
        cols.extend(ARM_COLUMNS.iter().map(|c| format!("{side}: {c}")));
    }
    cols.join("\t")
}

/// Tab-separated score sheet, one row per probe in the given order.
pub fn serialize(run: &DesignRun, probes: &[Probe]) -> String {
    let mut out = header();
    out.push('\n');
    for probe in probes {
        out.push_str(&row(run, probe));
        out.push('\n');
    }
    out
}

fn row(run: &DesignRun, probe: &Probe) -> String {
    let hits = probe
        .similarity_hits
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut cells = vec![
        run.probe_label(probe),
        probe.sequence.clone(),
        format!("{:.1}", probe.gc_percent),
        probe.is_multi_exon().to_string(),
        probe.exon_span.to_string(),
        probe.specificity.map(|s| s.to_string()).unwrap_or_default(),
        hits,
    ];
    cells.extend(arm_cells(&probe.left_arm));
    cells.extend(arm_cells(&probe.right_arm));
    cells.join("\t")
}

fn arm_cells(arm: &ProbeArm) -> Vec<String> {
    let mut cells = vec![
        arm.sequence.clone(),
        arm.melting_temp.map(|t| t.to_string()).unwrap_or_default(),
    ];
    match arm.energies {
        Some(e) => cells.extend(e.columns().iter().map(|v| v.to_string())),
        None => cells.extend(std::iter::repeat(String::new()).take(5)),
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_columns() {
        let h = header();
        let cols: Vec<&str> = h.split('\t').collect();
        assert_eq!(cols.len(), 21);
        assert_eq!(cols[0], "Hprobe: Id");
        assert_eq!(cols[7], "Left: Seq");
        assert_eq!(cols[14], "Right: Seq");
        assert_eq!(cols[20], "Right: Open3");
    }

    #[test]
    fn test_unscored_arm_has_empty_cells() {
        let cells = arm_cells(&ProbeArm::new("ACGT"));
        assert_eq!(cells.len(), 7);
        assert_eq!(cells[0], "ACGT");
        assert!(cells[1..].iter().all(|c| c.is_empty()));
    }
}
