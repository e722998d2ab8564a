use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct FileConfig {
    // Relative paths resolve against the repository root.
    pub songs_dir: Option<String>,
    pub library_dir: Option<String>,
    pub collections_file: Option<String>,

    /// Song file extensions, with or without the leading dot.
    pub extensions: Option<Vec<String>>,
    /// Detailed entries logged per capped warning category.
    pub warning_cap: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
