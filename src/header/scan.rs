//! The offset/length discovery engine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;

use crate::lexer::{self, ShellLexer};

use super::error::{Result, ScanError};
use super::landmark::find_landmark;
use super::limits::Limits;

/// One payload archive embedded in a makeself file, as a raw byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte position of the first payload byte.
    pub offset: u64,
    /// Declared length in bytes.
    pub size: u64,
}

impl Segment {
    /// Byte position just past the declared end of this segment.
    #[must_use]
    pub fn end(self) -> u64 {
        self.offset + self.size
    }
}

/// The fixed command a makeself stub assigns to `offset`.  Slot
/// `LINE_COUNT_SLOT` holds the header line count and is the only token
/// allowed to vary.
const OFFSET_COMMAND: &[&str] = &["head", "-n", "", "$0", "|", "wc", "-c", "|", "tr", "-d", " "];
const LINE_COUNT_SLOT: usize = 2;

/// Scan the shell header of the archive at `path` for the offsets and
/// lengths of the embedded payload archives.
///
/// Equivalent to [`scan_with_limits`] with [`Limits::default`].
pub fn scan(path: impl AsRef<Path>) -> Result<Vec<Segment>> {
    scan_with_limits(path, &Limits::default())
}

/// Scan the shell header of the archive at `path`, bounding the landmark
/// searches with `limits`.
///
/// The header must contain, in order: a `filesizes=` assignment carrying a
/// whitespace-separated integer list, an occurrence of the `--tar` flag, and
/// an `offset=` assignment whose value is the fixed
/// `head -n <N> $0 | wc -c | tr -d ' '` pipeline.  `<N>` is taken as the
/// number of text lines forming the header; the payload begins at the byte
/// position just past them.
pub fn scan_with_limits(path: impl AsRef<Path>, limits: &Limits) -> Result<Vec<Segment>> {
    let path = path.as_ref();
    let mut lexer = ShellLexer::new(BufReader::new(File::open(path)?));

    if !find_landmark(
        &mut lexer,
        &["filesizes", "="],
        None,
        Some(limits.max_size_list_lines),
    )? {
        return Err(ScanError::MissingSizeList);
    }
    let token = lexer.next_token()?.ok_or(ScanError::MissingSizeList)?;
    let sizes = parse_size_list(lexer::strip_quotes(&token.text))?;

    if !find_landmark(
        &mut lexer,
        &["-", "-", "tar"],
        None,
        Some(limits.max_tar_marker_lines),
    )? {
        return Err(ScanError::MissingTarMarker);
    }

    // No line bound here, but the enclosing case clause ending first means
    // the stub carries no offset assignment at all.
    if !find_landmark(&mut lexer, &["offset", "="], Some(";;"), None)? {
        return Err(ScanError::MissingOffsetAssignment);
    }
    let token = lexer
        .next_token()?
        .ok_or(ScanError::MissingOffsetAssignment)?;
    let header_lines = verify_offset_command(&token.text)?;

    let base_offset = header_byte_len(path, header_lines)?;
    debug!("header is {header_lines} lines, payload begins at byte {base_offset}");

    // First segment starts where the text header ends; each subsequent
    // segment's offset is the previous segment's declared size.
    let mut segments = Vec::with_capacity(sizes.len());
    let mut offset = base_offset;
    for size in sizes {
        segments.push(Segment { offset, size });
        offset = size;
    }
    Ok(segments)
}

fn parse_size_list(list: &str) -> Result<Vec<u64>> {
    let sizes = list
        .split_whitespace()
        .map(|token| {
            token.parse::<u64>().map_err(|_| ScanError::BadSize {
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<u64>>>()?;
    if sizes.is_empty() {
        return Err(ScanError::EmptySizeList);
    }
    Ok(sizes)
}

/// Check the `offset=` value against [`OFFSET_COMMAND`] and extract the
/// header line count from the one variable slot.
fn verify_offset_command(token: &str) -> Result<u64> {
    let words = lexer::split_words(lexer::strip_quotes(token))?;

    let matches = words.len() == OFFSET_COMMAND.len()
        && words
            .iter()
            .zip(OFFSET_COMMAND)
            .enumerate()
            .all(|(slot, (got, want))| slot == LINE_COUNT_SLOT || got == want);
    if !matches {
        let mut expected: Vec<&str> = OFFSET_COMMAND.to_vec();
        expected[LINE_COUNT_SLOT] = words
            .get(LINE_COUNT_SLOT)
            .map(String::as_str)
            .unwrap_or("<N>");
        return Err(ScanError::OffsetCommandMismatch {
            expected: expected.join(" "),
            actual: words.join(" "),
        });
    }

    words[LINE_COUNT_SLOT]
        .parse()
        .map_err(|_| ScanError::BadLineCount {
            token: words[LINE_COUNT_SLOT].clone(),
        })
}

/// Byte length of the first `lines` raw lines of the file.
///
/// Lines are consumed as byte reads up to `\n`, never re-tokenized; an input
/// that ends early just yields the bytes it has.
fn header_byte_len(path: &Path, lines: u64) -> Result<u64> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = Vec::new();
    let mut consumed = 0u64;
    for _ in 0..lines {
        line.clear();
        let n = reader.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
    }
    Ok(consumed)
}
