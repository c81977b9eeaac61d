//! Order-preserving literal matching over the token stream.

use std::io::BufRead;

use crate::lexer::{LexError, ShellLexer};

/// Match state for one literal token sequence.
///
/// A token equal to the pattern element at the current position advances the
/// match; a token equal to the pattern head while mid-match restarts the
/// candidate window at position one instead of aborting; anything else
/// resets.  A run like `---tar` therefore does not match `- - tar` (the
/// third `-` restarts the window and `tar` then lands on position one).
#[derive(Debug)]
pub(super) struct LandmarkMatcher<'p> {
    pattern: &'p [&'p str],
    matched: usize,
}

impl<'p> LandmarkMatcher<'p> {
    pub(super) fn new(pattern: &'p [&'p str]) -> Self {
        debug_assert!(!pattern.is_empty());
        Self { pattern, matched: 0 }
    }

    /// Feed one token; true once the full pattern has been seen.
    pub(super) fn feed(&mut self, token: &str) -> bool {
        if self.matched > 0 && self.matched < self.pattern.len() && token == self.pattern[self.matched]
        {
            self.matched += 1;
        } else if token == self.pattern[0] {
            self.matched = 1;
        } else {
            self.matched = 0;
        }
        self.matched == self.pattern.len()
    }
}

/// Walk the lexer forward until `pattern` has been matched.
///
/// Returns false without consuming further tokens when `stop_token` arrives
/// first, when the lexer passes `line_limit`, or at end of input.
pub(super) fn find_landmark<R: BufRead>(
    lexer: &mut ShellLexer<R>,
    pattern: &[&str],
    stop_token: Option<&str>,
    line_limit: Option<usize>,
) -> Result<bool, LexError> {
    let mut matcher = LandmarkMatcher::new(pattern);
    while let Some(token) = lexer.next_token()? {
        if matcher.feed(&token.text) {
            return Ok(true);
        }
        if stop_token == Some(token.text.as_str()) {
            return Ok(false);
        }
        if line_limit.is_some_and(|limit| lexer.line() >= limit) {
            return Ok(false);
        }
    }
    Ok(false)
}
