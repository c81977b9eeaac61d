//! Slicing a makeself archive into standalone payload files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

use crate::header::Segment;
use crate::util::copy_range;

/// Errors that can occur while splitting an archive.
#[derive(Debug, Error)]
pub enum SplitError {
    /// I/O error reading the archive or writing an output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The destination already exists; nothing has been written.
    #[error("target path already exists: {}", .0.display())]
    TargetExists(PathBuf),
}

/// How the archive's bytes map onto output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractMode {
    /// One numbered `<n>.tgz` per declared segment, any trailing bytes to
    /// `<n+1>.bin` (renamed `.zip` when they form a zip container).
    Segments,
    /// Only the trailing bytes, written to the target path itself.  Used for
    /// MojoSetup-style installers whose meaningful payload sits after the
    /// declared tar segments.
    Trailer,
}

/// Fail before any write if `target` exists, otherwise create it.
pub fn prepare_target(target: &Path) -> Result<(), SplitError> {
    if target.exists() {
        return Err(SplitError::TargetExists(target.to_path_buf()));
    }
    fs::create_dir_all(target)?;
    Ok(())
}

/// Copy each segment of the archive at `path` into its own file.
///
/// In [`ExtractMode::Segments`] mode `target` is the destination directory
/// (see [`prepare_target`]); in [`ExtractMode::Trailer`] mode it is the
/// exact path the trailing region is written to.  Returns the paths written,
/// in order.  I/O failures propagate immediately and leave any partial
/// output in place for the caller to clean up.
pub fn split_archive(
    path: &Path,
    segments: &[Segment],
    target: &Path,
    mode: ExtractMode,
    chunk_size: usize,
) -> Result<Vec<PathBuf>, SplitError> {
    let mut source = File::open(path)?;
    let file_size = source.metadata()?.len();
    let end_offset = segments.last().map_or(0, |segment| segment.end());

    let mut results = Vec::new();

    let trailer_path = match mode {
        ExtractMode::Segments => {
            for (index, segment) in segments.iter().enumerate() {
                info!(
                    "unpacking {} byte hunk at offset {}",
                    segment.size, segment.offset
                );
                let hunk_path = target.join(format!("{}.tgz", index + 1));
                let mut out = File::create(&hunk_path)?;
                copy_range(
                    &mut source,
                    &mut out,
                    segment.offset,
                    Some(segment.size),
                    chunk_size,
                )?;
                results.push(hunk_path);
            }
            target.join(format!("{}.bin", segments.len() + 1))
        }
        ExtractMode::Trailer => target.to_path_buf(),
    };

    if file_size > end_offset {
        info!(
            "found {} trailing bytes after the last declared segment",
            file_size - end_offset
        );
        let mut out = File::create(&trailer_path)?;
        copy_range(&mut source, &mut out, end_offset, None, chunk_size)?;
        drop(out);

        let trailer_path = if is_zip(&trailer_path) {
            let renamed = trailer_path.with_extension("zip");
            if renamed != trailer_path {
                fs::rename(&trailer_path, &renamed)?;
            }
            renamed
        } else {
            trailer_path
        };
        results.push(trailer_path);
    }

    Ok(results)
}

/// Whether the file at `path` is a zip container.
///
/// Probes by opening the central directory rather than sniffing leading
/// magic bytes, so a zip with prepended data still counts.
#[must_use]
pub fn is_zip(path: &Path) -> bool {
    File::open(path).is_ok_and(|file| zip::ZipArchive::new(file).is_ok())
}
