//! Argument parsing: one input line to a [`ParsedCommand`].
//!
//! Tokens are split on unquoted whitespace. Quote delimiters are dropped and
//! everything between them is kept verbatim, so `echo "a | b && c"` yields a
//! single argument containing the operators.
//!
//! After the command name, tokens are classified in this order:
//!
//! 1. `--key=value` is an option (the value may itself contain `=`).
//! 2. `--name` is a long flag.
//! 3. `-abc` expands to the short flags `a`, `b`, `c`, unless the character
//!    after the dash is a digit: `-5` is a positional argument so negative
//!    numbers survive.
//! 4. Anything else is positional.
//!
//! Parsing never fails. Input that breaks a limit degrades to a command named
//! `error` whose single argument explains why.

use std::collections::HashMap;

use termfolio_types::config::ParserLimits;
use termfolio_types::error::{Result, TermError};

use crate::quote::{QuoteScanner, is_quote};

/// Command name used for the degraded result of invalid input.
pub const ERROR_COMMAND: &str = "error";

/// Value of an entry in [`ParsedCommand::options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Set by a bare flag (`-v`, `--verbose`).
    Flag,
    /// Set by `--key=value`.
    Value(String),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Flag => None,
            Self::Value(v) => Some(v),
        }
    }
}

/// Result of parsing one input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lowercased command name.
    pub command: String,
    /// Positional arguments, in order.
    pub args: Vec<String>,
    /// Boolean switches, in order; short flags are expanded per character.
    pub flags: Vec<String>,
    /// Flags (as [`OptionValue::Flag`]) and `--key=value` options.
    pub options: HashMap<String, OptionValue>,
    /// The original input.
    pub raw: String,
}

impl ParsedCommand {
    fn error(raw: String, reason: impl Into<String>) -> Self {
        Self {
            command: ERROR_COMMAND.to_string(),
            args: vec![reason.into()],
            raw,
            ..Self::default()
        }
    }

    /// Whether the line held no command at all.
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }

    /// Reason text when this is the degraded result of invalid input.
    pub fn error_reason(&self) -> Option<&str> {
        if self.command == ERROR_COMMAND {
            self.args.first().map(String::as_str)
        } else {
            None
        }
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.options.get(name) == Some(&OptionValue::Flag)
    }

    /// Whether any of `names` is present as a flag or option.
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.options.contains_key(*n))
    }

    /// Value of a `--key=value` option.
    pub fn option_value(&self, name: &str) -> Option<&str> {
        self.options.get(name).and_then(OptionValue::as_str)
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Fail unless at least `count` positional arguments were given.
    pub fn require_args(&self, count: usize) -> Result<()> {
        if self.args.len() < count {
            return Err(TermError::Command(format!(
                "Missing required arguments: expected at least {count}, got {}",
                self.args.len()
            )));
        }
        Ok(())
    }

    /// Fail unless every option in `names` was given.
    pub fn require_options(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.options.contains_key(*n))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TermError::Command(format!(
                "Missing required options: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Tokenizer and classifier with configurable limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentParser {
    limits: ParserLimits,
}

impl ArgumentParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ParserLimits {
        self.limits
    }

    /// Parse one input line. Never fails.
    pub fn parse(&self, input: &str) -> ParsedCommand {
        let limits = self.limits;
        if input.chars().count() > limits.max_input_length {
            let raw: String = input.chars().take(limits.max_input_length).collect();
            log::warn!("input rejected: longer than {}", limits.max_input_length);
            return ParsedCommand::error(
                raw,
                format!(
                    "Input too long (max {} characters)",
                    limits.max_input_length
                ),
            );
        }

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ParsedCommand {
                raw: input.to_string(),
                ..ParsedCommand::default()
            };
        }

        let tokens: Vec<String> = tokenize(trimmed)
            .into_iter()
            .filter(|t| {
                let len = t.chars().count();
                if len > limits.max_token_length {
                    log::warn!(
                        "dropping token of {len} characters (max {})",
                        limits.max_token_length
                    );
                    false
                } else {
                    true
                }
            })
            .collect();

        let mut parsed = ParsedCommand {
            raw: input.to_string(),
            ..ParsedCommand::default()
        };
        let mut tokens = tokens.into_iter();
        let Some(name) = tokens.next() else {
            return parsed;
        };
        parsed.command = name.to_lowercase();

        for token in tokens {
            if let Some(long) = token.strip_prefix("--") {
                if let Some((key, value)) = long.split_once('=') {
                    if key.is_empty() {
                        return ParsedCommand::error(parsed.raw, "Invalid option: empty key");
                    }
                    if key.chars().count() > limits.max_option_key_length {
                        return ParsedCommand::error(
                            parsed.raw,
                            format!(
                                "Option key too long (max {} characters)",
                                limits.max_option_key_length
                            ),
                        );
                    }
                    parsed
                        .options
                        .insert(key.to_string(), OptionValue::Value(value.to_string()));
                } else if long.is_empty() {
                    parsed.args.push(token);
                } else {
                    parsed.flags.push(long.to_string());
                    parsed.options.insert(long.to_string(), OptionValue::Flag);
                }
            } else if is_short_flag_group(&token) {
                for ch in token.chars().skip(1) {
                    let flag = ch.to_string();
                    parsed.flags.push(flag.clone());
                    parsed.options.insert(flag, OptionValue::Flag);
                }
            } else {
                parsed.args.push(token);
            }
        }

        if parsed.args.len() > limits.max_args {
            log::warn!("input rejected: {} arguments", parsed.args.len());
            return ParsedCommand::error(
                parsed.raw,
                format!("Too many arguments (max {})", limits.max_args),
            );
        }
        if parsed.options.len() > limits.max_options {
            log::warn!("input rejected: {} options", parsed.options.len());
            return ParsedCommand::error(
                parsed.raw,
                format!("Too many options (max {})", limits.max_options),
            );
        }
        parsed
    }
}

/// Parse with the default limits.
pub fn parse_command_input(input: &str) -> ParsedCommand {
    ArgumentParser::default().parse(input)
}

/// `-abc` style group. `-5` and `-` alone are not flag groups.
fn is_short_flag_group(token: &str) -> bool {
    let mut chars = token.chars();
    if chars.next() != Some('-') {
        return false;
    }
    match chars.next() {
        None => false,
        Some(second) => !second.is_ascii_digit(),
    }
}

/// Split on unquoted whitespace, dropping quote delimiters.
///
/// A backslash directly before a quote character is removed and the quote is
/// kept literally. An empty quoted span (`""`) produces an empty token.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut before = QuoteScanner::new(input).state();
    let mut scanner = QuoteScanner::new(input).peekable();

    while let Some((_, ch, after)) = scanner.next() {
        let toggled = before != after;
        before = after;
        if toggled {
            started = true;
            continue;
        }
        if ch.is_whitespace() && !after.in_quotes() {
            if started {
                tokens.push(std::mem::take(&mut current));
                started = false;
            }
            continue;
        }
        if ch == '\\' && scanner.peek().is_some_and(|&(_, next, _)| is_quote(next)) {
            started = true;
            continue;
        }
        current.push(ch);
        started = true;
    }

    if started {
        tokens.push(current);
    }
    tokens
}
