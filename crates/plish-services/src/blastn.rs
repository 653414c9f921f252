use std::fs;
use std::path::{Path, PathBuf};

use plish_core::SimilarityHit;

use crate::process::{run_tool, ScratchFiles, ToolConfig};
use crate::specificity::{parse_search_output, SearchRequest, SpecificityService};
use crate::ServiceError;

const DEFAULT_BLASTN_BIN: &str = "blastn";
const BLASTN_ENV_BIN: &str = "PLISH_BLASTN_BIN";

/// Similarity search via NCBI BLAST+ `blastn` (megablast, tabular output).
///
/// Databases are laid out as `<root>/<db>/<db>.*`, the layout `makeblastdb`
/// produces when pointed at `<root>/<db>/<db>`.
#[derive(Debug, Clone)]
pub struct BlastnService {
    config: ToolConfig,
    database_root: PathBuf,
}

impl BlastnService {
    pub fn new(config: ToolConfig, database_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            database_root: database_root.into(),
        }
    }

    pub fn from_env(database_root: impl Into<PathBuf>) -> Self {
        Self::new(
            ToolConfig::from_env_or(BLASTN_ENV_BIN, DEFAULT_BLASTN_BIN),
            database_root,
        )
    }

    pub fn database_path(&self, database: &str) -> PathBuf {
        self.database_root.join(database).join(database)
    }

    pub fn database_root(&self) -> &Path {
        &self.database_root
    }

    fn args(&self, request: &SearchRequest, scratch: &ScratchFiles) -> Vec<String> {
        vec![
            "-query".to_string(),
            scratch.input.display().to_string(),
            "-task".to_string(),
            "megablast".to_string(),
            "-db".to_string(),
            self.database_path(&request.database).display().to_string(),
            "-out".to_string(),
            scratch.output.display().to_string(),
            "-outfmt".to_string(),
            "6".to_string(),
            "-evalue".to_string(),
            "10".to_string(),
        ]
    }
}

impl SpecificityService for BlastnService {
    fn search(&self, request: &SearchRequest) -> Result<Vec<SimilarityHit>, ServiceError> {
        let scratch = ScratchFiles::new(&self.config.scratch_dir, request.request_id, "blast")?;
        fs::write(&scratch.input, format!("{}\n", request.sequence))?;
        run_tool(&self.config, &self.args(request, &scratch), &scratch)?;
        parse_search_output(&scratch.read_output()?)
    }
}
