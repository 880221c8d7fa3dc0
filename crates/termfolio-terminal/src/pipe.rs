//! Pipelines with `|`.
//!
//! Commands read their input from arguments, so a stage's output is rendered
//! to plain text and appended to the next stage's command line as one
//! double-quoted argument.

use termfolio_types::output::OutputLine;

use crate::command::CommandOutput;
use crate::dispatch::Executor;
use crate::patterns::{Pattern, find_patterns_outside_quotes, split_respecting_quotes};
use crate::quote::escape_quotes;

fn pipe_pattern() -> Pattern {
    Pattern::literal("|")
}

/// Whether `input` holds an unquoted `|`.
pub fn has_pipe(input: &str) -> bool {
    !find_patterns_outside_quotes(input, &[pipe_pattern()]).is_empty()
}

/// Split `input` into trimmed, non-empty stages at unquoted `|`.
pub fn split_by_pipe(input: &str) -> Vec<String> {
    split_respecting_quotes(input, &pipe_pattern(), false)
}

/// Plain text of `lines`, newline-joined, with styling dropped.
pub fn output_to_text(lines: &[OutputLine]) -> String {
    lines
        .iter()
        .map(OutputLine::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Run `segments` as a pipeline and return the last stage's output.
///
/// An unregistered command anywhere aborts the whole pipeline with a single
/// error line. A failing stage does not stop the pipeline; only the last
/// stage's status is reported.
pub fn execute_piped_commands(segments: &[String], exec: &mut dyn Executor) -> CommandOutput {
    let mut carried: Option<String> = None;
    let last = segments.len().saturating_sub(1);

    for (i, segment) in segments.iter().enumerate() {
        let line = match carried.as_deref() {
            Some(text) if !text.is_empty() => {
                format!("{segment} \"{}\"", escape_quotes(text, '"'))
            },
            _ => segment.clone(),
        };
        let parsed = exec.parse(&line);
        if let Some(reason) = parsed.error_reason() {
            return CommandOutput::error(reason);
        }
        if !exec.is_registered(&parsed.command) {
            log::debug!("pipe: aborting at unknown command '{}'", parsed.command);
            return CommandOutput::error(format!("pipe: {}: command not found", parsed.command));
        }
        let output = match exec.run(&parsed) {
            Ok(output) => output,
            Err(e) => {
                log::error!("pipe: {} failed: {e}", parsed.command);
                return CommandOutput::error(format!("pipe: error executing {}", parsed.command));
            },
        };
        if i == last {
            return output;
        }
        carried = Some(output_to_text(&output.lines));
    }
    CommandOutput::empty()
}
