//! Command chaining with `&&`, `||`, and `;`.
//!
//! Operators bind left to right with no precedence. The operator stored on a
//! segment decides whether the *next* segment runs.

use std::fmt;
use std::sync::LazyLock;

use termfolio_types::output::OutputLine;

use crate::command::{CommandOutput, ExitStatus};
use crate::dispatch::Executor;
use crate::patterns::{Pattern, find_patterns_outside_quotes};
use crate::pipe::{execute_piped_commands, has_pipe, split_by_pipe};
use crate::quote::QuoteScanner;

/// A chain operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOperator {
    /// `&&`: run the next segment only after a success.
    And,
    /// `||`: run the next segment only after a failure.
    Or,
    /// `;`: always run the next segment.
    Then,
}

impl ChainOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Then => ";",
        }
    }

    /// Whether the following segment runs given the last outcome.
    fn allows_next(self, last_success: bool) -> bool {
        match self {
            Self::And => last_success,
            Self::Or => !last_success,
            Self::Then => true,
        }
    }
}

impl fmt::Display for ChainOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One segment of a chain and the operator that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCommand {
    pub command: String,
    /// `None` for the final segment.
    pub operator: Option<ChainOperator>,
}

static CHAIN_PATTERNS: LazyLock<Vec<Pattern>> =
    LazyLock::new(|| vec!["&&".into(), "||".into(), ";".into()]);

/// Whether `input` holds an unquoted chain operator.
pub fn has_chain(input: &str) -> bool {
    !find_patterns_outside_quotes(input, &CHAIN_PATTERNS).is_empty()
}

/// Split `input` into segments at unquoted chain operators.
///
/// Segments are trimmed and empty ones dropped, together with the operator
/// that ended them.
pub fn split_by_chain(input: &str) -> Vec<ChainCommand> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut flush = |current: &mut String, operator: Option<ChainOperator>| {
        let command = current.trim();
        if !command.is_empty() {
            segments.push(ChainCommand {
                command: command.to_string(),
                operator,
            });
        }
        current.clear();
    };

    let mut scanner = QuoteScanner::new(input).peekable();
    while let Some((_, ch, state)) = scanner.next() {
        if !state.in_quotes() {
            let next = scanner.peek().map(|&(_, c, _)| c);
            let operator = match (ch, next) {
                (';', _) => Some(ChainOperator::Then),
                ('&', Some('&')) => Some(ChainOperator::And),
                ('|', Some('|')) => Some(ChainOperator::Or),
                _ => None,
            };
            if let Some(operator) = operator {
                if operator != ChainOperator::Then {
                    scanner.next();
                }
                flush(&mut current, Some(operator));
                continue;
            }
        }
        current.push(ch);
    }
    flush(&mut current, None);
    segments
}

/// Run chain segments in order, honouring short-circuit rules.
///
/// Skipped segments produce no output. An unknown command or a command that
/// returns an error adds an error line, counts as a failure, and does not
/// stop the chain. A segment containing `|` runs as a pipeline. Each segment
/// that ran is reported to [`Executor::segment_finished`] before the next
/// one starts. The returned status is that of the last segment that ran.
pub fn execute_chained_commands(segments: &[ChainCommand], exec: &mut dyn Executor) -> CommandOutput {
    let mut lines = Vec::new();
    let mut last_success = true;

    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            let gate = segments[i - 1].operator.unwrap_or(ChainOperator::Then);
            if !gate.allows_next(last_success) {
                log::debug!("chain: skipping '{}'", segment.command);
                continue;
            }
        }
        let output = run_segment(&segment.command, exec);
        exec.segment_finished(&output);
        last_success = output.is_success();
        lines.extend(output.lines);
    }

    let mut output = CommandOutput::new(lines);
    if !last_success {
        output.status = ExitStatus::Failure;
    }
    output
}

fn run_segment(segment: &str, exec: &mut dyn Executor) -> CommandOutput {
    if has_pipe(segment) {
        return execute_piped_commands(&split_by_pipe(segment), exec);
    }
    let parsed = exec.parse(segment);
    if parsed.is_empty() {
        return CommandOutput::empty();
    }
    if let Some(reason) = parsed.error_reason() {
        return CommandOutput::error(reason);
    }
    if !exec.is_registered(&parsed.command) {
        return CommandOutput::error(format!("command not found: {}", parsed.command));
    }
    match exec.run(&parsed) {
        Ok(output) => output,
        Err(e) => {
            log::error!("chain: {} failed: {e}", parsed.command);
            CommandOutput::failure(vec![OutputLine::error(format!(
                "chain: error executing {}",
                parsed.command
            ))])
        },
    }
}
