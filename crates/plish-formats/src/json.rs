use plish_pipeline::DesignRun;

use crate::ExportError;

/// Pretty-printed dump of a whole run, unfiltered.
pub fn serialize(run: &DesignRun) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(run)?)
}

pub fn parse(input: &str) -> Result<DesignRun, ExportError> {
    Ok(serde_json::from_str(input)?)
}
