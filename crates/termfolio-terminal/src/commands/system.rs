//! System commands: help, clear, echo, history, alias, unalias, sudo.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart};

use crate::command::{Category, Command, CommandContext, CommandOutput};
use crate::registry::CommandRegistry;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Rc::new(HelpCmd))?
        .register(Rc::new(ClearCmd))?
        .register(Rc::new(EchoCmd))?
        .register(Rc::new(HistoryCmd))?
        .register(Rc::new(AliasCmd))?
        .register(Rc::new(UnaliasCmd))?
        .register(Rc::new(SudoCmd))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List available commands"
    }
    fn usage(&self) -> &str {
        "help [command]"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn aliases(&self) -> Vec<String> {
        vec!["?".into()]
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if let Some(name) = ctx.parsed.arg(0) {
            return Ok(describe(ctx.registry, name));
        }

        let mut out = CommandOutput::empty();
        for category in ctx.registry.get_categories() {
            let visible: Vec<_> = ctx
                .registry
                .get_by_category(category)
                .iter()
                .filter(|c| !c.hidden())
                .collect();
            if visible.is_empty() {
                continue;
            }
            out.push(OutputLine::colored(
                category.as_str().to_uppercase(),
                Color::Yellow,
            ));
            for cmd in visible {
                out.push(OutputLine::parts(vec![
                    TextPart::colored(format!("  {:<10}", cmd.name()), Color::Cyan),
                    TextPart::plain(cmd.description()),
                ]));
            }
            out.push(OutputLine::empty());
        }
        out.push(OutputLine::colored(
            "Chain with &&, || and ;. Pipe with |. Type 'help <command>' for details.",
            Color::Gray,
        ));
        Ok(out)
    }
}

fn describe(registry: &CommandRegistry, name: &str) -> CommandOutput {
    let Some(cmd) = registry.get(name) else {
        return CommandOutput::error(format!("help: no such command: {name}"));
    };
    let mut out = CommandOutput::new(vec![
        OutputLine::parts(vec![
            TextPart::colored(cmd.name(), Color::Cyan),
            TextPart::plain(format!(" - {}", cmd.description())),
        ]),
        OutputLine::text(format!("usage: {}", cmd.usage())),
        OutputLine::text(format!("category: {}", cmd.category())),
    ]);
    let aliases = cmd.aliases();
    if !aliases.is_empty() {
        out.push(OutputLine::text(format!("aliases: {}", aliases.join(", "))));
    }
    out
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

struct ClearCmd;
impl Command for ClearCmd {
    fn name(&self) -> &str {
        "clear"
    }
    fn description(&self) -> &str {
        "Clear the terminal"
    }
    fn usage(&self) -> &str {
        "clear"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn aliases(&self) -> Vec<String> {
        vec!["cls".into()]
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        ctx.shell.request_clear();
        Ok(CommandOutput::empty())
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print arguments"
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let text = ctx.parsed.args.join(" ");
        if text.is_empty() {
            return Ok(CommandOutput::line(OutputLine::empty()));
        }
        Ok(CommandOutput::text(&text))
    }
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

struct HistoryCmd;
impl Command for HistoryCmd {
    fn name(&self) -> &str {
        "history"
    }
    fn description(&self) -> &str {
        "Show or clear command history"
    }
    fn usage(&self) -> &str {
        "history [clear | -c]"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.arg(0) == Some("clear") || ctx.parsed.has_flag("c") {
            ctx.shell.clear_history();
            return Ok(CommandOutput::line(OutputLine::colored(
                "History cleared",
                Color::Green,
            )));
        }
        let lines = ctx
            .shell
            .history()
            .enumerate()
            .map(|(i, line)| {
                OutputLine::parts(vec![
                    TextPart::colored(format!("{:>4}  ", i + 1), Color::Gray),
                    TextPart::plain(line),
                ])
            })
            .collect();
        Ok(CommandOutput::new(lines))
    }
}

// ---------------------------------------------------------------------------
// alias / unalias
// ---------------------------------------------------------------------------

struct AliasCmd;
impl Command for AliasCmd {
    fn name(&self) -> &str {
        "alias"
    }
    fn description(&self) -> &str {
        "Define or list session aliases"
    }
    fn usage(&self) -> &str {
        "alias [name='command ...']"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.args.is_empty() {
            let lines: Vec<OutputLine> = ctx
                .shell
                .aliases()
                .map(|(name, expansion)| OutputLine::text(format!("alias {name}='{expansion}'")))
                .collect();
            if lines.is_empty() {
                return Ok(CommandOutput::line(OutputLine::colored(
                    "No aliases defined",
                    Color::Gray,
                )));
            }
            return Ok(CommandOutput::new(lines));
        }

        let mut out = CommandOutput::empty();
        for arg in &ctx.parsed.args {
            match arg.split_once('=') {
                Some((name, expansion)) => {
                    let name = name.trim();
                    if name.is_empty() || name.contains(char::is_whitespace) {
                        return Ok(CommandOutput::error(format!("alias: invalid name: '{name}'")));
                    }
                    if expansion.trim().is_empty() {
                        return Ok(CommandOutput::error(format!("alias: empty expansion for '{name}'")));
                    }
                    ctx.shell.set_alias(name, expansion);
                },
                None => match ctx.shell.alias(arg) {
                    Some(expansion) => out.push(OutputLine::text(format!("alias {arg}='{expansion}'"))),
                    None => return Ok(CommandOutput::error(format!("alias: {arg}: not found"))),
                },
            }
        }
        Ok(out)
    }
}

struct UnaliasCmd;
impl Command for UnaliasCmd {
    fn name(&self) -> &str {
        "unalias"
    }
    fn description(&self) -> &str {
        "Remove a session alias"
    }
    fn usage(&self) -> &str {
        "unalias <name>"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if ctx.parsed.require_args(1).is_err() {
            return Ok(CommandOutput::error(format!("usage: {}", self.usage())));
        }
        let mut out = CommandOutput::empty();
        for name in &ctx.parsed.args {
            if !ctx.shell.unset_alias(name) {
                out = CommandOutput::error(format!("unalias: {name}: not found"));
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// sudo
// ---------------------------------------------------------------------------

struct SudoCmd;
impl Command for SudoCmd {
    fn name(&self) -> &str {
        "sudo"
    }
    fn description(&self) -> &str {
        "Run a command as root"
    }
    fn usage(&self) -> &str {
        "sudo <command>"
    }
    fn category(&self) -> Category {
        Category::System
    }
    fn hidden(&self) -> bool {
        true
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::error(format!(
            "{} is not in the sudoers file. This incident will be reported.",
            ctx.config.prompt.user
        )))
    }
}
