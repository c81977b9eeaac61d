//! Unpacking the structured payload with external tools.
//!
//! The trailing zip of a MojoSetup installer may carry absolute or
//! ancestor-relative member paths, so the actual unpacking is delegated to
//! tools that handle those safely.  `7z` is the most versatile, `unzip` the
//! common fallback, and the built-in zip reader the last resort when
//! neither tool is installed.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use log::debug;

enum ToolOutcome {
    Done,
    Missing,
}

/// Run one external tool with the target directory as its working
/// directory.  A missing binary is reported as [`ToolOutcome::Missing`]; a
/// present tool that exits non-zero is an error, not a fallback trigger.
fn run_tool(program: &str, args: &[&str], zip_path: &Path, cwd: &Path) -> Result<ToolOutcome> {
    let mut command = Command::new(program);
    command.args(args).arg(zip_path).current_dir(cwd);

    match command.status() {
        Ok(status) if status.success() => Ok(ToolOutcome::Done),
        Ok(status) => bail!("{program} exited with {status}"),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ToolOutcome::Missing),
        Err(e) => Err(e).with_context(|| format!("failed to run {program}")),
    }
}

/// Unpack `zip_path` into `target`, trying `7z`, then `unzip`, then the
/// built-in zip reader.
pub fn unpack_zip(zip_path: &Path, target: &Path) -> Result<()> {
    // the tools run from inside the target directory, so they need an
    // absolute archive path
    let zip_path = zip_path
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", zip_path.display()))?;

    if let ToolOutcome::Done = run_tool("7z", &["x"], &zip_path, target)? {
        return Ok(());
    }
    debug!("7z is not available, falling back to unzip");

    if let ToolOutcome::Done = run_tool("unzip", &[], &zip_path, target)? {
        return Ok(());
    }
    debug!("unzip is not available, falling back to the built-in zip reader");

    let archive = File::open(&zip_path)?;
    zip::ZipArchive::new(archive)
        .and_then(|mut zip| zip.extract(target))
        .with_context(|| format!("cannot unpack {}", zip_path.display()))?;
    Ok(())
}
