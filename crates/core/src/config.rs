use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::types::Severity;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub detectors: Vec<String>,
    pub fail_on: Option<Severity>,
    pub default_baseline: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    pub fn discover(root: &Path) -> Option<Self> {
        let path = root.join("lintbase.toml");
        if path.exists() {
            Config::load(&path).ok()
        } else {
            None
        }
    }
}
