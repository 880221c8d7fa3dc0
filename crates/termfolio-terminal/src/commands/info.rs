//! Info commands: whoami, about.

use std::rc::Rc;

use termfolio_types::error::Result;
use termfolio_types::output::{Color, OutputLine, TextPart, text_lines};
use termfolio_vfs::join;

use crate::command::{Category, CommandContext, CommandDef, CommandOutput};
use crate::registry::CommandRegistry;

const LINKS: [(&str, &str); 2] = [
    ("github", "https://github.com/example"),
    ("email", "mailto:hello@example.com"),
];

pub(super) fn register(reg: &mut CommandRegistry) -> Result<()> {
    let whoami = CommandDef::builder("whoami")
        .description("Print the current user")
        .category(Category::Info)
        .handler(|ctx| Ok(CommandOutput::text(&ctx.config.prompt.user)))
        .build()?;
    let about = CommandDef::builder("about")
        .description("Who is behind this terminal")
        .usage("about")
        .category(Category::Info)
        .alias("bio")
        .handler(about_page)
        .build()?;
    reg.register(Rc::new(whoami))?.register(Rc::new(about))?;
    Ok(())
}

fn about_page(ctx: &mut CommandContext<'_>) -> Result<CommandOutput> {
    let mut out = CommandOutput::line(OutputLine::parts(vec![
        TextPart::colored(&ctx.config.prompt.user, Color::Green),
        TextPart::plain("@"),
        TextPart::colored(&ctx.config.prompt.host, Color::Cyan),
    ]));
    out.push(OutputLine::empty());

    let path = join(&ctx.shell.home, "about.txt");
    match ctx.vfs.read(&path) {
        Ok(bytes) => out.lines.extend(text_lines(&String::from_utf8_lossy(&bytes))),
        Err(e) => {
            log::debug!("about: {e}");
            out.push(OutputLine::colored("(about.txt has gone missing)", Color::Gray));
        },
    }

    out.push(OutputLine::empty());
    for (label, url) in LINKS {
        out.push(
            OutputLine::parts(vec![
                TextPart::colored(format!("{label:<8}"), Color::Yellow),
                TextPart::colored(url, Color::Blue),
            ])
            .with_url(url)
            .with_class("link"),
        );
    }
    Ok(out)
}
