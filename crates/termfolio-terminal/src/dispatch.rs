//! Routing an input line to chain, pipe, or direct execution.

use termfolio_types::error::Result;

use crate::args::ParsedCommand;
use crate::chain::{execute_chained_commands, has_chain, split_by_chain};
use crate::command::CommandOutput;
use crate::pipe::{execute_piped_commands, has_pipe, split_by_pipe};

/// What the chain and pipe handlers need from a session.
pub trait Executor {
    /// Parse one segment, applying any session-level rewriting first.
    fn parse(&self, segment: &str) -> ParsedCommand;

    fn is_registered(&self, name: &str) -> bool;

    /// Execute an already parsed command.
    fn run(&mut self, parsed: &ParsedCommand) -> Result<CommandOutput>;

    /// Called with each top-level segment's output once it is final, in
    /// execution order. Skipped chain segments are not reported.
    fn segment_finished(&mut self, _output: &CommandOutput) {}
}

/// Execute a full input line.
pub fn execute_line(line: &str, exec: &mut dyn Executor) -> CommandOutput {
    if has_chain(line) {
        let segments = split_by_chain(line);
        log::debug!("chain of {} segments", segments.len());
        execute_chained_commands(&segments, exec)
    } else if has_pipe(line) {
        let segments = split_by_pipe(line);
        log::debug!("pipe of {} stages", segments.len());
        let output = execute_piped_commands(&segments, exec);
        exec.segment_finished(&output);
        output
    } else {
        log::debug!("direct dispatch");
        let output = execute_single(line, exec);
        exec.segment_finished(&output);
        output
    }
}

/// Parse and run one command with no operators.
pub fn execute_single(line: &str, exec: &mut dyn Executor) -> CommandOutput {
    let parsed = exec.parse(line);
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
            log::error!("{} failed: {e}", parsed.command);
            CommandOutput::error(format!("error executing {}: {e}", parsed.command))
        },
    }
}
