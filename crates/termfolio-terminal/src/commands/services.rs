//! Service status.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart};
use termfolio_vfs::display_path;

use crate::command::{Category, Command, CommandContext, CommandOutput};
use crate::registry::CommandRegistry;
use crate::shell::DisplayMode;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Rc::new(StatusCmd))?;
    Ok(())
}

struct StatusCmd;
impl Command for StatusCmd {
    fn name(&self) -> &str {
        "status"
    }
    fn description(&self) -> &str {
        "Show session status"
    }
    fn usage(&self) -> &str {
        "status"
    }
    fn category(&self) -> Category {
        Category::Services
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        let uptime_s = ctx.runtime.timers().now() / 1000;
        let animations = ctx.runtime.registry().len();
        let display = match ctx.shell.display_mode() {
            DisplayMode::Normal => "normal",
            DisplayMode::Crt => "crt",
        };
        let rows = [
            ("uptime", format!("{}m {}s", uptime_s / 60, uptime_s % 60)),
            ("commands", ctx.registry.len().to_string()),
            ("animations", animations.to_string()),
            ("history", ctx.shell.history_len().to_string()),
            ("cwd", display_path(&ctx.shell.cwd, &ctx.shell.home)),
            ("display", display.to_string()),
            (
                "takeover",
                ctx.shell.takeover().unwrap_or("none").to_string(),
            ),
        ];

        let mut out = CommandOutput::line(OutputLine::parts(vec![
            TextPart::colored("*", Color::Green),
            TextPart::plain(" terminal online"),
        ]));
        for (label, value) in rows {
            out.push(OutputLine::parts(vec![
                TextPart::colored(format!("  {label:<12}"), Color::Gray),
                TextPart::plain(value),
            ]));
        }
        Ok(out)
    }
}
