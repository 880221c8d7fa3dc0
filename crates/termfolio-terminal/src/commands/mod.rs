//! Built-in commands for the termfolio terminal.

mod devtools;
mod effects;
mod filesystem;
mod games;
mod info;
mod services;
mod system;

use termfolio_types::error::Result;

use crate::registry::CommandRegistry;

/// Register every built-in command, group by group.
///
/// Fails on the first invalid definition or alias collision.
pub fn register_builtins(reg: &mut CommandRegistry) -> Result<()> {
    system::register(reg)?;
    info::register(reg)?;
    effects::register(reg)?;
    services::register(reg)?;
    games::register(reg)?;
    devtools::register(reg)?;
    filesystem::register(reg)?;
    log::info!("registered {} built-in commands", reg.len());
    Ok(())
}
