pub mod arm_fasta;
pub mod json;
pub mod score_sheet;

use std::path::{Path, PathBuf};

use plish_core::Probe;
use plish_pipeline::DesignRun;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    ScoreSheet,
    ArmFasta,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::ScoreSheet => "csv",
            ExportFormat::ArmFasta => "fna",
            ExportFormat::Json => "json",
        }
    }
}

/// `<gene>-<transcript>_hprobe`, quotes removed from the gene name
pub fn result_file_stem(gene_name: &str, transcript_id: &str) -> String {
    format!("{}-{}_hprobe", gene_name.replace('"', ""), transcript_id)
}

/// Render `probes` from `run` in the given format.
pub fn serialize(
    run: &DesignRun,
    probes: &[Probe],
    format: ExportFormat,
) -> Result<String, ExportError> {
    Ok(match format {
        ExportFormat::ScoreSheet => score_sheet::serialize(run, probes),
        ExportFormat::ArmFasta => arm_fasta::serialize(run, probes),
        ExportFormat::Json => json::serialize(run)?,
    })
}

/// Write one export into `dir`, returning the file path.
pub fn write_result(
    dir: &Path,
    run: &DesignRun,
    probes: &[Probe],
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let stem = result_file_stem(&run.transcript.name, &run.transcript.id);
    let path = dir.join(format!("{stem}.{}", format.extension()));
    std::fs::write(&path, serialize(run, probes, format)?)?;
    log::info!("Wrote {} probes to {}", probes.len(), path.display());
    Ok(path)
}
