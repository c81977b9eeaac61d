//! Configurable bounds for header scanning.

/// Bounds applied while scanning the shell header.
///
/// Makeself archives put all of the metadata the scanner needs within the
/// first few hundred text lines; the payload after the header can be
/// arbitrarily large and arbitrarily malformed, so the forward scans are
/// line-bounded to keep a bad input from being walked end to end.
///
/// # Example
///
/// ```
/// use unmakeself::header::Limits;
///
/// // Use defaults
/// let limits = Limits::default();
///
/// // Stretch the filesizes bound for an unusually chatty stub
/// let relaxed = Limits {
///     max_size_list_lines: 500,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum lexical line the `filesizes=` assignment may appear on.
    ///
    /// Default: 200 lines.
    pub max_size_list_lines: usize,

    /// Maximum lexical line the `--tar` flag may appear on.
    ///
    /// Default: 1024 lines.
    pub max_tar_marker_lines: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_size_list_lines: 200,
            max_tar_marker_lines: 1024,
        }
    }
}

impl Limits {
    /// Create a new `Limits` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create limits that effectively disable the line bounds.
    ///
    /// Only use this for inputs known to carry an oversized header; on a
    /// malformed file the scanner may then read all the way into the
    /// payload before giving up.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_size_list_lines: usize::MAX,
            max_tar_marker_lines: usize::MAX,
        }
    }
}
