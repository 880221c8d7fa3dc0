//! Quote-aware pattern search and splitting.

use std::fmt;

use regex::Regex;
use termfolio_types::error::{Result, TermError};

use crate::quote::QuoteScanner;

/// An operator or delimiter to look for outside quoted spans.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    /// Matches at a position only when the match starts exactly there and
    /// is non-empty.
    Regex(Regex),
}

impl Pattern {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    pub fn regex(source: &str) -> Result<Self> {
        Regex::new(source)
            .map(Self::Regex)
            .map_err(|e| TermError::Command(format!("invalid pattern '{source}': {e}")))
    }

    /// Byte length of the match starting at `index`, if any.
    pub fn match_at(&self, input: &str, index: usize) -> Option<usize> {
        match self {
            Self::Literal(text) => {
                (!text.is_empty() && input[index..].starts_with(text.as_str())).then_some(text.len())
            },
            Self::Regex(re) => re
                .find_at(input, index)
                .filter(|m| m.start() == index && !m.is_empty())
                .map(|m| m.len()),
        }
    }
}

impl From<&str> for Pattern {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// One occurrence found by [`find_patterns_outside_quotes`].
#[derive(Debug, Clone, Copy)]
pub struct PatternMatch<'p> {
    /// The pattern that matched.
    pub pattern: &'p Pattern,
    /// Byte offset of the match.
    pub index: usize,
    /// Byte length of the match.
    pub length: usize,
}

impl PatternMatch<'_> {
    pub fn end(&self) -> usize {
        self.index + self.length
    }
}

/// Find every unquoted occurrence of any of `patterns`.
///
/// Patterns are tried in list order at each position and the first one that
/// matches wins. The scan resumes after the match, so results never overlap.
pub fn find_patterns_outside_quotes<'p>(
    input: &str,
    patterns: &'p [Pattern],
) -> Vec<PatternMatch<'p>> {
    let mut found = Vec::new();
    let mut resume = 0;
    for (index, _, state) in QuoteScanner::new(input) {
        if index < resume || state.in_quotes() {
            continue;
        }
        let hit = patterns
            .iter()
            .find_map(|p| p.match_at(input, index).map(|length| (p, length)));
        if let Some((pattern, length)) = hit {
            found.push(PatternMatch {
                pattern,
                index,
                length,
            });
            resume = index + length;
        }
    }
    found
}

/// Split `input` wherever `delimiter` occurs outside quotes.
///
/// Segments are trimmed and empty ones are dropped, so `cmd1 || cmd2` split on
/// `|` gives `["cmd1", "cmd2"]`. With `include_delimiter`, each matched
/// delimiter is emitted as its own segment between its neighbours.
pub fn split_respecting_quotes(
    input: &str,
    delimiter: &Pattern,
    include_delimiter: bool,
) -> Vec<String> {
    let mut segments = Vec::new();
    let mut push = |segment: &str| {
        let segment = segment.trim();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
    };

    let mut start = 0;
    for m in find_patterns_outside_quotes(input, std::slice::from_ref(delimiter)) {
        push(&input[start..m.index]);
        if include_delimiter {
            push(&input[m.index..m.end()]);
        }
        start = m.end();
    }
    push(&input[start..]);
    segments
}
