//! The command contract: trait, categories, output, and execution context.

use std::fmt;
use std::str::FromStr;

use termfolio_types::config::TerminalConfig;
use termfolio_types::error::{Result, TermError};
use termfolio_types::output::{OutputLine, text_lines};
use termfolio_vfs::Vfs;

use crate::animation::AnimationRuntime;
use crate::args::ParsedCommand;
use crate::registry::CommandRegistry;
use crate::shell::ShellState;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Fixed set of command groups, in `help` display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    System,
    Info,
    Effects,
    Services,
    Games,
    Devtools,
    Filesystem,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::System,
        Self::Info,
        Self::Effects,
        Self::Services,
        Self::Games,
        Self::Devtools,
        Self::Filesystem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Info => "info",
            Self::Effects => "effects",
            Self::Services => "services",
            Self::Games => "games",
            Self::Devtools => "devtools",
            Self::Filesystem => "filesystem",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TermError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| TermError::InvalidCommand(format!("unknown category: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Whether a command succeeded. Chains branch on this, never on styling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitStatus {
    #[default]
    Success,
    Failure,
}

impl ExitStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Lines produced by one command, plus its exit status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub lines: Vec<OutputLine>,
    pub status: ExitStatus,
}

impl CommandOutput {
    /// Successful output.
    pub fn new(lines: Vec<OutputLine>) -> Self {
        Self {
            lines,
            status: ExitStatus::Success,
        }
    }

    /// Successful output with no lines.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Successful output of one line.
    pub fn line(line: OutputLine) -> Self {
        Self::new(vec![line])
    }

    /// Successful output of plain text, one line per text line.
    pub fn text(text: &str) -> Self {
        Self::new(text_lines(text))
    }

    /// Failed output with the given lines.
    pub fn failure(lines: Vec<OutputLine>) -> Self {
        Self {
            lines,
            status: ExitStatus::Failure,
        }
    }

    /// Failed output of a single red line.
    pub fn error(message: impl Into<String>) -> Self {
        Self::failure(vec![OutputLine::error(message)])
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn push(&mut self, line: OutputLine) {
        self.lines.push(line);
    }
}

// ---------------------------------------------------------------------------
// Command trait
// ---------------------------------------------------------------------------

/// Everything a command body may touch during one invocation.
pub struct CommandContext<'a> {
    /// The invocation being executed.
    pub parsed: &'a ParsedCommand,
    pub vfs: &'a mut dyn Vfs,
    /// Working directory, history, aliases, and host signals.
    pub shell: &'a mut ShellState,
    /// Read-only view of the command table (for `help`).
    pub registry: &'a CommandRegistry,
    /// Timers, transcript, and animation lifecycle.
    pub runtime: &'a AnimationRuntime,
    pub config: &'a TerminalConfig,
}

/// A single executable command.
///
/// Expected user errors (missing arguments, bad paths) are returned as
/// failed [`CommandOutput`]s. An `Err` is reserved for unexpected failures,
/// which the dispatcher turns into a generic error line.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-a\] \[-l\] \[path\]").
    fn usage(&self) -> &str;

    fn category(&self) -> Category;

    /// Alternative names. The registry lowercases and deduplicates them.
    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }

    /// Hidden commands are left out of listings but still run.
    fn hidden(&self) -> bool {
        false
    }

    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput>;
}

// ---------------------------------------------------------------------------
// CommandDef
// ---------------------------------------------------------------------------

/// Boxed command body for [`CommandDef`].
pub type Handler = Box<dyn Fn(&mut CommandContext<'_>) -> Result<CommandOutput>>;

/// A command assembled from parts rather than written as its own type.
pub struct CommandDef {
    name: String,
    description: String,
    usage: String,
    category: Category,
    aliases: Vec<String>,
    hidden: bool,
    handler: Handler,
}

impl CommandDef {
    pub fn builder(name: impl Into<String>) -> CommandDefBuilder {
        CommandDefBuilder {
            name: name.into(),
            ..CommandDefBuilder::default()
        }
    }
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("aliases", &self.aliases)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

impl Command for CommandDef {
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn usage(&self) -> &str {
        &self.usage
    }
    fn category(&self) -> Category {
        self.category
    }
    fn aliases(&self) -> Vec<String> {
        self.aliases.clone()
    }
    fn hidden(&self) -> bool {
        self.hidden
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        (self.handler)(ctx)
    }
}

/// Validating builder for [`CommandDef`].
#[derive(Default)]
pub struct CommandDefBuilder {
    name: String,
    description: String,
    usage: Option<String>,
    category: Option<Category>,
    aliases: Vec<String>,
    hidden: bool,
    handler: Option<Handler>,
}

impl CommandDefBuilder {
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn usage(mut self, text: impl Into<String>) -> Self {
        self.usage = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn handler(
        mut self,
        f: impl Fn(&mut CommandContext<'_>) -> Result<CommandOutput> + 'static,
    ) -> Self {
        self.handler = Some(Box::new(f));
        self
    }

    /// Attach an already boxed handler.
    pub fn boxed_handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Check that name, description, category, and handler are all set.
    ///
    /// The name is lowercased. Aliases are lowercased and deduplicated, and
    /// an alias equal to the name is dropped.
    pub fn build(self) -> Result<CommandDef> {
        let name = self.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(TermError::InvalidCommand("command name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(TermError::InvalidCommand(format!(
                "{name}: description is required"
            )));
        }
        let Some(category) = self.category else {
            return Err(TermError::InvalidCommand(format!(
                "{name}: category is required"
            )));
        };
        let Some(handler) = self.handler else {
            return Err(TermError::InvalidCommand(format!(
                "{name}: handler is required"
            )));
        };
        let aliases = normalize_aliases(&name, self.aliases);
        Ok(CommandDef {
            usage: self.usage.unwrap_or_else(|| name.clone()),
            name,
            description: self.description,
            category,
            aliases,
            hidden: self.hidden,
            handler,
        })
    }
}

/// Lowercase, trim, and deduplicate aliases, dropping empties and `name`.
pub fn normalize_aliases(name: &str, aliases: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for alias in aliases {
        let alias = alias.trim().to_lowercase();
        if !alias.is_empty() && alias != name && !out.contains(&alias) {
            out.push(alias);
        }
    }
    out
}
