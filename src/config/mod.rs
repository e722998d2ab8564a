mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONGS_DIR: &str = "songs";
pub const DEFAULT_LIBRARY_DIR: &str = "library";
pub const DEFAULT_COLLECTIONS_FILE: &str = "setlists.json";
pub const DEFAULT_EXTENSIONS: &[&str] = &["cho"];
pub const DEFAULT_WARNING_CAP: usize = 50;

pub const SONGS_INDEX_FILE: &str = "songs.index.json";
pub const LIBRARY_INDEX_FILE: &str = "library.index.json";
pub const RUN_LOG_FILE: &str = "consolidate.log.json";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub repo_root: PathBuf,
    pub songs_dir: Option<PathBuf>,
    pub library_dir: Option<PathBuf>,
    pub collections_file: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            repo_root: PathBuf::from("."),
            songs_dir: None,
            library_dir: None,
            collections_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub repo_root: PathBuf,
    pub songs_dir: PathBuf,
    pub library_dir: PathBuf,
    pub collections_file: PathBuf,
    pub extensions: Vec<String>,
    pub warning_cap: usize,
}

fn under_root(root: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn normalize_extensions(raw: Vec<String>) -> Result<Vec<String>> {
    let mut extensions: Vec<String> = vec![];
    for ext in raw {
        let ext = ext.trim().trim_start_matches('.').to_string();
        if ext.is_empty() {
            bail!("Song file extensions must not be empty");
        }
        if !extensions.contains(&ext) {
            extensions.push(ext);
        }
    }
    if extensions.is_empty() {
        bail!("At least one song file extension must be configured");
    }
    Ok(extensions)
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let repo_root = cli.repo_root.clone();
        if !repo_root.exists() {
            bail!("Repository root does not exist: {:?}", repo_root);
        }
        if !repo_root.is_dir() {
            bail!("Repository root is not a directory: {:?}", repo_root);
        }

        let songs_dir = file
            .songs_dir
            .map(|p| under_root(&repo_root, &p))
            .or_else(|| cli.songs_dir.clone())
            .unwrap_or_else(|| repo_root.join(DEFAULT_SONGS_DIR));

        let library_dir = file
            .library_dir
            .map(|p| under_root(&repo_root, &p))
            .or_else(|| cli.library_dir.clone())
            .unwrap_or_else(|| repo_root.join(DEFAULT_LIBRARY_DIR));

        let collections_file = file
            .collections_file
            .map(|p| under_root(&repo_root, &p))
            .or_else(|| cli.collections_file.clone())
            .unwrap_or_else(|| library_dir.join(DEFAULT_COLLECTIONS_FILE));

        let extensions = normalize_extensions(file.extensions.unwrap_or_else(|| {
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        }))?;

        let warning_cap = file.warning_cap.unwrap_or(DEFAULT_WARNING_CAP);
        if warning_cap == 0 {
            bail!("warning_cap must be greater than zero");
        }

        Ok(Self {
            repo_root,
            songs_dir,
            library_dir,
            collections_file,
            extensions,
            warning_cap,
        })
    }

    /// Defaults for a repository laid out as `<root>/songs` + `<root>/library`.
    pub fn for_repo(repo_root: impl Into<PathBuf>) -> Result<Self> {
        let cli = CliConfig {
            repo_root: repo_root.into(),
            ..Default::default()
        };
        Self::resolve(&cli, None)
    }

    pub fn songs_index_path(&self) -> PathBuf {
        self.library_dir.join(SONGS_INDEX_FILE)
    }

    pub fn library_index_path(&self) -> PathBuf {
        self.library_dir.join(LIBRARY_INDEX_FILE)
    }

    pub fn run_log_path(&self) -> PathBuf {
        self.library_dir.join(RUN_LOG_FILE)
    }
}
