//! Games. The game itself runs in the host; the command only claims the
//! screen.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine};

use crate::command::{Category, Command, CommandContext, CommandOutput};
use crate::registry::CommandRegistry;

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    reg.register(Rc::new(SnakeCmd))?;
    Ok(())
}

struct SnakeCmd;
impl Command for SnakeCmd {
    fn name(&self) -> &str {
        "snake"
    }
    fn description(&self) -> &str {
        "Play snake"
    }
    fn usage(&self) -> &str {
        "snake"
    }
    fn category(&self) -> Category {
        Category::Games
    }
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
        if let Some(active) = ctx.shell.takeover() {
            return Ok(CommandOutput::error(format!("snake: {active} is already running")));
        }
        ctx.shell.set_takeover(Some(self.name().to_string()));
        Ok(CommandOutput::new(vec![
            OutputLine::colored("Starting snake...", Color::Green),
            OutputLine::colored("Arrow keys to move, q to quit.", Color::Gray),
        ]))
    }
}
