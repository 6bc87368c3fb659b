use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Year set the reference data needed fixing for. Links from any other year
/// are left untouched unless the config widens the set.
pub const DEFAULT_ALLOWED_YEARS: [u16; 2] = [2020, 2021];

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct GraphConfig {
    #[serde(default)]
    pub dates: DatesSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DatesSection {
    #[serde(default = "default_allowed_years")]
    pub allowed_years: Vec<u16>,
}

impl Default for DatesSection {
    fn default() -> Self {
        Self {
            allowed_years: default_allowed_years(),
        }
    }
}

fn default_allowed_years() -> Vec<u16> {
    DEFAULT_ALLOWED_YEARS.to_vec()
}

/// Load and parse a GraphConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<GraphConfig> {
    if !config_path.exists() {
        return Ok(GraphConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: GraphConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}
