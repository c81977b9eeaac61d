//! Shell-lexical tokenizer for reading script headers as data.
//!
//! The scanner needs to walk the textual prefix of a makeself archive the way
//! a shell would split it into words, without ever interpreting it: no
//! expansion, no substitution, no execution.  This module provides that
//! tokenizer as a pure function from bytes to a token stream.
//!
//! The rules are deliberately small:
//!
//! - runs of ASCII alphanumerics and `_` form [`TokenKind::Word`] tokens
//! - `'`, `"` and `` ` `` open quote groups read to the matching close
//!   character; the token text keeps the quotes (the backtick rule lets the
//!   lexer step over command substitutions without evaluating them)
//! - `#` starts a comment running to end of line
//! - any other byte is a single-character [`TokenKind::Op`] token, except the
//!   case terminator `;;`, which lexes as one operator
//!
//! Input is consumed byte-wise, so the binary payload following the text
//! header never needs to be valid UTF-8.

use std::io::{BufRead, ErrorKind};

use thiserror::Error;

/// Errors produced while tokenizing.
#[derive(Debug, Error)]
pub enum LexError {
    /// I/O error from the underlying reader.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A quote group was still open when the input ended.
    #[error("unterminated quote starting on line {line}")]
    UnterminatedQuote {
        /// Line the opening quote character appeared on (1-based).
        line: usize,
    },
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unquoted run of word characters.
    Word,
    /// Quote group, text includes the enclosing quote characters.
    Quoted,
    /// Operator or punctuation character (`;;` is the only two-byte case).
    Op,
}

/// A single token with its kind, text, and starting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

/// Streaming tokenizer over the bytes of a shell script.
///
/// Tokens are pulled one at a time with [`next_token`]; the reader is only
/// consumed as far as the returned tokens require, so a bounded scan of a
/// large archive never touches the payload bytes.
///
/// [`next_token`]: ShellLexer::next_token
#[derive(Debug)]
pub struct ShellLexer<R> {
    reader: R,
    pushback: Option<u8>,
    line: usize,
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_quote_byte(b: u8) -> bool {
    matches!(b, b'\'' | b'"' | b'`')
}

impl<R: BufRead> ShellLexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pushback: None,
            line: 1,
        }
    }

    /// The current line number (1-based).  Advances as newlines are consumed.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    fn getc(&mut self) -> std::io::Result<Option<u8>> {
        let byte = match self.pushback.take() {
            Some(b) => Some(b),
            None => {
                let mut buf = [0u8; 1];
                loop {
                    match self.reader.read(&mut buf) {
                        Ok(0) => break None,
                        Ok(_) => break Some(buf[0]),
                        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    }
                }
            }
        };
        if byte == Some(b'\n') {
            self.line += 1;
        }
        Ok(byte)
    }

    fn ungetc(&mut self, b: u8) {
        if b == b'\n' {
            self.line -= 1;
        }
        self.pushback = Some(b);
    }

    /// Produce the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        loop {
            let Some(b) = self.getc()? else {
                return Ok(None);
            };
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => continue,
                b'#' => {
                    // comment runs to end of line
                    while let Some(c) = self.getc()? {
                        if c == b'\n' {
                            break;
                        }
                    }
                }
                _ => return self.lex_at(b).map(Some),
            }
        }
    }

    fn lex_at(&mut self, first: u8) -> Result<Token, LexError> {
        let line = self.line;

        if is_word_byte(first) {
            let mut text = String::new();
            text.push(char::from(first));
            while let Some(b) = self.getc()? {
                if is_word_byte(b) {
                    text.push(char::from(b));
                } else {
                    self.ungetc(b);
                    break;
                }
            }
            return Ok(Token {
                kind: TokenKind::Word,
                text,
                line,
            });
        }

        if is_quote_byte(first) {
            let mut text = String::new();
            text.push(char::from(first));
            loop {
                let Some(b) = self.getc()? else {
                    return Err(LexError::UnterminatedQuote { line });
                };
                text.push(char::from(b));
                if b == first {
                    break;
                }
            }
            return Ok(Token {
                kind: TokenKind::Quoted,
                text,
                line,
            });
        }

        if first == b';' {
            match self.getc()? {
                Some(b';') => {
                    return Ok(Token {
                        kind: TokenKind::Op,
                        text: ";;".to_string(),
                        line,
                    })
                }
                Some(other) => self.ungetc(other),
                None => {}
            }
        }

        Ok(Token {
            kind: TokenKind::Op,
            text: char::from(first).to_string(),
            line,
        })
    }
}

/// Remove matched enclosing quote characters, repeatedly, so both `"..."`
/// and `` "`...`" `` come down to the bare contents.
#[must_use]
pub fn strip_quotes(token: &str) -> &str {
    let mut s = token;
    while s.len() >= 2 {
        let bytes = s.as_bytes();
        if bytes[0] == bytes[s.len() - 1] && is_quote_byte(bytes[0]) {
            s = &s[1..s.len() - 1];
        } else {
            break;
        }
    }
    s
}

/// Split a command line into shell words: whitespace separates, quote groups
/// contribute their contents with the quotes removed.
pub fn split_words(input: &str) -> Result<Vec<String>, LexError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut pending = false;
    let mut line = 1;

    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            ' ' | '\t' | '\r' => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            '\'' | '"' | '`' => {
                pending = true;
                loop {
                    match chars.next() {
                        None => return Err(LexError::UnterminatedQuote { line }),
                        Some(close) if close == c => break,
                        Some(inner) => current.push(inner),
                    }
                }
            }
            _ => {
                pending = true;
                current.push(c);
            }
        }
    }
    if pending {
        words.push(current);
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = ShellLexer::new(Cursor::new(input.as_bytes().to_vec()));
        let mut tokens = Vec::new();
        while let Some(token) = lexer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    fn texts(input: &str) -> Vec<String> {
        tokenize(input).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_words_and_ops() {
        assert_eq!(texts("filesizes=\"100 200\""), ["filesizes", "=", "\"100 200\""]);
        assert_eq!(texts("--tar"), ["-", "-", "tar"]);
        assert_eq!(texts("$0"), ["$", "0"]);
    }

    #[test]
    fn test_token_kinds() {
        let tokens = tokenize("offset=`wc -c`");
        assert_eq!(tokens[0].kind, TokenKind::Word);
        assert_eq!(tokens[1].kind, TokenKind::Op);
        assert_eq!(tokens[2].kind, TokenKind::Quoted);
        assert_eq!(tokens[2].text, "`wc -c`");
    }

    #[test]
    fn test_case_terminator_is_one_token() {
        assert_eq!(texts("x) echo done ;;"), ["x", ")", "echo", "done", ";;"]);
        // a lone semicolon stays a single-character operator
        assert_eq!(texts("a; b"), ["a", ";", "b"]);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(texts("#!/bin/sh\nskip=5 # trailing comment\nnext"), ["skip", "=", "5", "next"]);
    }

    #[test]
    fn test_quotes_may_span_lines() {
        let tokens = tokenize("v=\"a\nb\"\nw");
        assert_eq!(tokens[2].text, "\"a\nb\"");
        assert_eq!(tokens[3].text, "w");
        assert_eq!(tokens[3].line, 3);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("one\ntwo\n\nfour");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 4);
    }

    #[test]
    fn test_unterminated_quote() {
        let mut lexer = ShellLexer::new(Cursor::new(b"a\nb \"open".to_vec()));
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        let err = lexer.next_token().unwrap_err();
        assert!(matches!(err, LexError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn test_non_utf8_bytes_survive() {
        let mut lexer = ShellLexer::new(Cursor::new(vec![b'o', b'k', b' ', 0xfe, 0xff]));
        assert_eq!(lexer.next_token().unwrap().unwrap().text, "ok");
        assert!(lexer.next_token().unwrap().is_some());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"100 200\""), "100 200");
        assert_eq!(strip_quotes("\"`wc -c`\""), "wc -c");
        assert_eq!(strip_quotes("plain"), "plain");
        assert_eq!(strip_quotes("\"mismatched'"), "\"mismatched'");
        assert_eq!(strip_quotes("\"\""), "");
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words("head -n 5 $0 | wc -c | tr -d ' '").unwrap(),
            ["head", "-n", "5", "$0", "|", "wc", "-c", "|", "tr", "-d", " "]
        );
        assert_eq!(split_words("a  'b c'd").unwrap(), ["a", "b cd"]);
        assert_eq!(split_words("''").unwrap(), [""]);
        assert!(matches!(
            split_words("tr -d 'open"),
            Err(LexError::UnterminatedQuote { .. })
        ));
    }
}
