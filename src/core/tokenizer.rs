//! Command line tokenizer
//!
//! Splits a finished line into delimiter-separated tokens. Tokens are
//! returned as byte ranges into the line rather than copies, so the
//! engine can freeze the line buffer while a command runs and hand the
//! same arguments to every repeated call.

use std::ops::Range;

/// Default delimiter set: a single space.
pub const DEFAULT_DELIMITERS: &[u8] = b" ";

/// Split `line` into up to `max_tokens` spans.
///
/// Consecutive delimiters collapse, so no empty tokens are produced.
/// Bytes past the `max_tokens`-th token are ignored.
pub fn tokenize(line: &[u8], delimiters: &[u8], max_tokens: usize) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut index = 0;

    while index < line.len() && spans.len() < max_tokens {
        while index < line.len() && delimiters.contains(&line[index]) {
            index += 1;
        }
        if index == line.len() {
            break;
        }

        let start = index;
        while index < line.len() && !delimiters.contains(&line[index]) {
            index += 1;
        }
        spans.push(start..index);
    }

    spans
}

/// Materialize token spans as `&str` slices of `line`.
///
/// Line content is printable ASCII by construction, so the UTF-8 view
/// always exists; anything else would indicate engine-internal
/// corruption and is skipped.
pub fn resolve<'l>(line: &'l [u8], spans: &[Range<usize>]) -> Vec<&'l str> {
    spans
        .iter()
        .filter_map(|span| std::str::from_utf8(&line[span.clone()]).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens<'l>(line: &'l [u8], max: usize) -> Vec<&'l str> {
        let spans = tokenize(line, DEFAULT_DELIMITERS, max);
        resolve(line, &spans)
    }

    #[test]
    fn test_basic_split() {
        assert_eq!(tokens(b"tick 100 5", 10), vec!["tick", "100", "5"]);
    }

    #[test]
    fn test_collapses_consecutive_delimiters() {
        assert_eq!(tokens(b"  a   b  ", 10), vec!["a", "b"]);
    }

    #[test]
    fn test_blank_line_yields_no_tokens() {
        assert!(tokens(b"", 10).is_empty());
        assert!(tokens(b"   ", 10).is_empty());
    }

    #[test]
    fn test_max_token_cap() {
        assert_eq!(tokens(b"a b c d", 2), vec!["a", "b"]);
    }

    #[test]
    fn test_custom_delimiters() {
        let line = b"a,b;c";
        let spans = tokenize(line, b",;", 10);
        assert_eq!(resolve(line, &spans), vec!["a", "b", "c"]);
    }
}
