use std::io::{ErrorKind, Read, Result, Seek, SeekFrom, Write};

/// Copy a byte range from a seekable source into `out` using a bounded
/// buffer, so peak memory stays at `chunk_size` regardless of range length.
///
/// With `size = Some(n)` at most `n` bytes are copied; `None` copies to end
/// of input.  A read returning no data ends the copy early, so a declared
/// size that overruns the actual input is not an error.
///
/// # Return value
///
/// The number of bytes actually copied, which may be less than the requested
/// size when the source ends first.
pub(crate) fn copy_range(
    source: &mut (impl Read + Seek),
    out: &mut impl Write,
    offset: u64,
    size: Option<u64>,
    chunk_size: usize,
) -> Result<u64> {
    source.seek(SeekFrom::Start(offset))?;

    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut remaining = size;
    let mut copied = 0u64;

    loop {
        let want = match remaining {
            Some(0) => break,
            Some(n) => buffer.len().min(usize::try_from(n).unwrap_or(usize::MAX)),
            None => buffer.len(),
        };
        let got = read_some(source, &mut buffer[..want])?;
        if got == 0 {
            break;
        }
        out.write_all(&buffer[..got])?;
        copied += got as u64;
        if let Some(n) = remaining {
            remaining = Some(n - got as u64);
        }
    }

    Ok(copied)
}

/// A single read, retried on EINTR.
fn read_some(reader: &mut impl Read, buf: &mut [u8]) -> Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use similar_asserts::assert_eq;

    use super::*;

    fn copy(data: &[u8], offset: u64, size: Option<u64>, chunk: usize) -> Vec<u8> {
        let mut source = Cursor::new(data.to_vec());
        let mut out = Vec::new();
        copy_range(&mut source, &mut out, offset, size, chunk).unwrap();
        out
    }

    #[test]
    fn test_copy_middle_range() {
        assert_eq!(copy(b"0123456789", 2, Some(5), 1024), b"23456");
    }

    #[test]
    fn test_copy_to_end() {
        assert_eq!(copy(b"0123456789", 7, None, 1024), b"789");
    }

    #[test]
    fn test_zero_size_copies_nothing() {
        assert_eq!(copy(b"0123456789", 3, Some(0), 1024), b"");
    }

    #[test]
    fn test_declared_size_overruns_input() {
        // more bytes requested than the source has; the copy just stops
        assert_eq!(copy(b"0123456789", 8, Some(100), 1024), b"89");
        assert_eq!(copy(b"0123456789", 50, Some(10), 1024), b"");
    }

    #[test]
    fn test_chunk_smaller_than_range() {
        assert_eq!(copy(b"abcdefgh", 1, Some(6), 2), b"bcdefg");
        assert_eq!(copy(b"abcdefgh", 0, None, 3), b"abcdefgh");
    }

    #[test]
    fn test_reported_byte_count() {
        let mut source = Cursor::new(b"0123456789".to_vec());
        let mut out = Vec::new();
        assert_eq!(copy_range(&mut source, &mut out, 4, Some(100), 8).unwrap(), 6);
        assert_eq!(copy_range(&mut source, &mut out, 0, Some(4), 8).unwrap(), 4);
    }
}
