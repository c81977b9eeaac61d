//! Command-line extractor for makeself self-extracting archives.
//!
//! `unmakeself` recovers the payload archives embedded in a makeself
//! installer by reading the shell header as data, so none of the untrusted
//! shell code ever runs.  Extracted tarballs may still contain absolute or
//! ancestor-relative paths; use appropriate flags when unpacking them if
//! you don't trust the file's source.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, warn, LevelFilter};

use unmakeself::header;
use unmakeself::splitter::{self, ExtractMode};
use unmakeself::unpack;
use unmakeself::DEFAULT_CHUNK_SIZE;

/// unmakeself
#[derive(Debug, Parser)]
#[clap(name = "unmakeself", version)]
struct App {
    /// Increase the verbosity; use twice for extra effect
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease the verbosity; use twice for extra effect
    #[clap(short, long, action = clap::ArgAction::Count)]
    quiet: u8,

    /// The target directory to unpack to
    #[clap(short, long, default_value = ".")]
    outdir: PathBuf,

    /// Assume the file is a MojoSetup installer and unpack only the
    /// application data
    #[clap(long)]
    mojo: bool,

    /// Don't create a containing folder named after each source archive
    #[clap(long)]
    no_containing_folder: bool,

    /// Streaming chunk size in bytes
    #[clap(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// The makeself archives to extract
    #[clap(required = true)]
    files: Vec<PathBuf>,
}

fn log_level(app: &App) -> LevelFilter {
    const LEVELS: [LevelFilter; 5] = [
        LevelFilter::Error,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
    ];
    let index = (2 + i32::from(app.verbose) - i32::from(app.quiet))
        .clamp(0, LEVELS.len() as i32 - 1) as usize;
    LEVELS[index]
}

fn target_for(file: &Path, app: &App) -> PathBuf {
    if app.no_containing_folder {
        app.outdir.clone()
    } else {
        app.outdir.join(file.file_stem().unwrap_or(file.as_os_str()))
    }
}

fn process_file(file: &Path, app: &App) -> Result<()> {
    let segments = header::scan(file)
        .with_context(|| format!("{} is not a recognized makeself archive", file.display()))?;

    let target = target_for(file, app);
    splitter::prepare_target(&target)?;

    if app.mojo {
        let mut zip_name = target.clone().into_os_string();
        zip_name.push(".zip");
        let zip_path = PathBuf::from(zip_name);

        splitter::split_archive(file, &segments, &zip_path, ExtractMode::Trailer, app.chunk_size)?;
        if !splitter::is_zip(&zip_path) {
            warn!("not a clean zip file: {}", zip_path.display());
        }
        unpack::unpack_zip(&zip_path, &target)?;
        fs::remove_file(&zip_path)?;
    } else {
        splitter::split_archive(file, &segments, &target, ExtractMode::Segments, app.chunk_size)?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let app = App::parse();

    env_logger::Builder::new()
        .filter_level(log_level(&app))
        .init();

    let mut failures = 0usize;
    for file in &app.files {
        if let Err(e) = process_file(file, &app) {
            error!("{}: {:#}", file.display(), e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("failed to extract {failures} of {} archives", app.files.len());
    }
    Ok(())
}
