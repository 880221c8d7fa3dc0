//! Quote-state scanning.
//!
//! Every splitter in the interpreter needs to know whether a character sits
//! inside a `"..."` or `'...'` span. [`QuoteScanner`] walks a string once and
//! reports, for each character, the quote state *after* that character has
//! been consumed.
//!
//! A quote character opens a span when none is open and closes the span only
//! if it matches the opener, so single-quoted spans may contain literal
//! double quotes and vice versa. A quote preceded by a backslash never
//! toggles state. Only the single preceding character is examined.

use std::str::CharIndices;

/// Quote state at one position of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteState {
    quote: Option<char>,
}

impl QuoteState {
    pub fn in_quotes(self) -> bool {
        self.quote.is_some()
    }

    /// The character that opened the current span.
    pub fn quote_char(self) -> Option<char> {
        self.quote
    }

    /// State after consuming `ch`, whose predecessor was `prev`.
    pub fn advance(self, prev: Option<char>, ch: char) -> Self {
        if !is_quote(ch) || prev == Some('\\') {
            return self;
        }
        match self.quote {
            None => Self { quote: Some(ch) },
            Some(open) if open == ch => Self { quote: None },
            Some(_) => self,
        }
    }
}

pub fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

/// Iterator over `(byte_index, char, state_after_char)`.
pub struct QuoteScanner<'a> {
    chars: CharIndices<'a>,
    prev: Option<char>,
    state: QuoteState,
}

impl<'a> QuoteScanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices(),
            prev: None,
            state: QuoteState::default(),
        }
    }

    /// State after everything consumed so far.
    pub fn state(&self) -> QuoteState {
        self.state
    }
}

impl Iterator for QuoteScanner<'_> {
    type Item = (usize, char, QuoteState);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, ch) = self.chars.next()?;
        self.state = self.state.advance(self.prev, ch);
        self.prev = Some(ch);
        Some((index, ch, self.state))
    }
}

/// Call `visit(char, byte_index, state_after)` for every character of `input`.
pub fn scan(input: &str, mut visit: impl FnMut(char, usize, QuoteState)) {
    for (index, ch, state) in QuoteScanner::new(input) {
        visit(ch, index, state);
    }
}

/// Whether `input` ends inside an open quoted span.
pub fn has_unmatched_quotes(input: &str) -> bool {
    let mut scanner = QuoteScanner::new(input);
    scanner.by_ref().for_each(drop);
    scanner.state().in_quotes()
}

/// Strip one layer of matching surrounding quotes and unescape that quote
/// character inside. Anything else passes through unchanged.
pub fn remove_quotes(s: &str) -> String {
    let mut chars = s.chars();
    let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
        return s.to_string();
    };
    if first != last || !is_quote(first) {
        return s.to_string();
    }
    let inner = &s[first.len_utf8()..s.len() - last.len_utf8()];
    let escaped = format!("\\{first}");
    inner.replace(&escaped, &first.to_string())
}

/// Put a backslash before every `quote_char`.
///
/// Not quote-state aware: an already escaped quote gains a second backslash.
pub fn escape_quotes(s: &str, quote_char: char) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch == quote_char {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
