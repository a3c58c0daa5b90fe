//! Subcommand implementations.

pub mod batch;
pub mod normalize;
pub mod parse;

use std::fs;
use std::path::Path;

use ttj_core::ExtractionConfig;

/// Load the extraction config from a JSON file, or fall back to defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<ExtractionConfig> {
    let config: ExtractionConfig = match path {
        Some(p) => serde_json::from_str(&fs::read_to_string(Path::new(p))?)?,
        None => ExtractionConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
