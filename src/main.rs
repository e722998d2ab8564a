use anyhow::{Context, Result};
use clap::Parser;
use songbook_consolidator::config::{AppConfig, CliConfig, FileConfig};
use songbook_consolidator::consolidate::{consolidate, report_summary, write_outputs};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "consolidate-library")]
#[command(about = "Rebuild the song and library indexes of a ChordPro songbook")]
struct CliArgs {
    /// Repository root folder, containing songs/ and library/.
    #[clap(long, default_value = ".", value_parser = parse_path)]
    pub repo: PathBuf,

    /// Path to a TOML config file. Its values override the CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Folder scanned for song files. Defaults to <repo>/songs.
    #[clap(long, value_parser = parse_path)]
    pub songs_dir: Option<PathBuf>,

    /// Folder the indexes and run log are written to. Defaults to <repo>/library.
    #[clap(long, value_parser = parse_path)]
    pub library_dir: Option<PathBuf>,

    /// Collection (setlist) document. Defaults to <library>/setlists.json.
    #[clap(long, value_parser = parse_path)]
    pub collections_file: Option<PathBuf>,

    /// Build and validate everything, but write nothing.
    #[clap(long)]
    pub check: bool,

    /// Less console output.
    #[clap(long)]
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let default_level = if cli_args.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        repo_root: cli_args.repo,
        songs_dir: cli_args.songs_dir,
        library_dir: cli_args.library_dir,
        collections_file: cli_args.collections_file,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Consolidating library at {}", config.repo_root.display());
    let mut consolidation = consolidate(&config);
    if !cli_args.check {
        write_outputs(&config, &mut consolidation)?;
    }
    report_summary(&config, &consolidation, !cli_args.check);

    let exit_code = consolidation.status.exit_code();
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
    Ok(())
}
