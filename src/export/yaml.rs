//! YAML Export functionality
//!
//! Exports the complete data set to YAML for a human-readable backup.

use std::io::Write;

use crate::error::{SpendwiseError, SpendwiseResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full data set to YAML
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> SpendwiseResult<()> {
    let export = FullExport::from_storage(storage)?;

    let header = format!(
        "# Spendwise full export\n# Generated: {}\n# App Version: {}\n#\n# Contains all your financial data. Keep it private.\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| SpendwiseError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| SpendwiseError::Export(e.to_string()))?;
    Ok(())
}

/// Read back a YAML export; comment lines are ignored by the parser
pub fn import_from_yaml(yaml_str: &str) -> SpendwiseResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| SpendwiseError::Import(e.to_string()))?;
    export.validate().map_err(SpendwiseError::Import)?;
    Ok(export)
}
