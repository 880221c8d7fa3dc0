//! Command interpreter for the termfolio terminal.
//!
//! An input line is parsed into a [`ParsedCommand`], routed through the
//! chain (`&&`, `||`, `;`) and pipe (`|`) handlers, and dispatched by name
//! through the [`CommandRegistry`]. Commands that animate paint live regions
//! of the [`Transcript`] from callbacks on a host-driven [`TimerQueue`].
//! A [`Session`] owns all of it.

pub mod animation;
pub mod args;
pub mod chain;
pub mod command;
mod commands;
pub mod completion;
pub mod dispatch;
pub mod patterns;
pub mod pipe;
pub mod quote;
pub mod registry;
pub mod session;
pub mod shell;
pub mod timer;
pub mod transcript;

/// Animated command runtime and the registry of live animations.
pub use animation::{Animation, AnimationHandle, AnimationRegistry, AnimationRuntime, CancellationToken};
/// Parsed invocation and the parser that produces it.
pub use args::{ArgumentParser, ParsedCommand, parse_command_input};
/// Chain operators and segments.
pub use chain::{ChainCommand, ChainOperator};
/// A single executable command and its building blocks.
pub use command::{Category, Command, CommandContext, CommandDef, CommandOutput, ExitStatus};
/// Register every built-in command into a registry.
pub use commands::register_builtins;
/// Fuzzy tab completion.
pub use completion::{fuzzy_score, get_completions};
/// Line dispatch entry point and the executor seam it runs against.
pub use dispatch::{Executor, execute_line};
/// Literal or regex delimiter for quote-aware splitting.
pub use patterns::Pattern;
/// Registry of available commands with dispatch.
pub use registry::CommandRegistry;
/// One interactive terminal.
pub use session::Session;
/// Per-session working directory, history, and aliases.
pub use shell::{DisplayMode, ShellState};
/// Virtual-time timer queue.
pub use timer::{TimerId, TimerQueue};
/// Output transcript with live regions.
pub use transcript::{Entry, Transcript};
