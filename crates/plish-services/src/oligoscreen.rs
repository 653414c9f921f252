use std::fs;

use crate::process::{run_tool, ScratchFiles, ToolConfig};
use crate::thermo::{parse_fold_output, FoldRequest, FoldResponse, ThermodynamicService};
use crate::ServiceError;

const DEFAULT_OLIGOSCREEN_BIN: &str = "oligoscreen";
const OLIGOSCREEN_ENV_BIN: &str = "PLISH_OLIGOSCREEN_BIN";
/// Where RNAstructure looks for its nearest-neighbour parameter tables
const DATA_TABLES_ENV: &str = "DATAPATH";

/// Folding via RNAstructure's `oligoscreen`, one process per probe.
#[derive(Debug, Clone)]
pub struct OligoscreenService {
    config: ToolConfig,
}

impl OligoscreenService {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    /// Resolve the executable from `PLISH_OLIGOSCREEN_BIN` (default
    /// `oligoscreen` on the PATH) and point it at `data_tables`.
    pub fn from_env(data_tables: Option<&str>) -> Self {
        let mut config = ToolConfig::from_env_or(OLIGOSCREEN_ENV_BIN, DEFAULT_OLIGOSCREEN_BIN);
        if let Some(dir) = data_tables {
            config = config.with_env(DATA_TABLES_ENV, dir);
        }
        Self::new(config)
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }
}

impl ThermodynamicService for OligoscreenService {
    fn fold(&self, request: &FoldRequest) -> Result<FoldResponse, ServiceError> {
        let scratch = ScratchFiles::new(&self.config.scratch_dir, request.request_id, "out")?;
        fs::write(
            &scratch.input,
            format!("{}\n{}", request.left_arm, request.right_arm),
        )?;

        let args = vec![
            scratch.input.display().to_string(),
            scratch.output.display().to_string(),
            "--temperature".to_string(),
            request.temperature.to_string(),
        ];
        run_tool(&self.config, &args, &scratch)?;
        parse_fold_output(&scratch.read_output()?)
    }
}
